//! Pure view functions for the dashboard.
//!
//! Functions here take `&DashboardState`, draw to a ratatui `Frame` and never
//! mutate anything.

use enum_map::{EnumMap, enum_map};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use reviewstream_core::chart::ChartData;
use reviewstream_core::event::{Genre, SCORE_MAX};

use crate::pie;
use crate::state::{DashboardState, StreamStatus};

/// Header: two text lines plus borders.
const HEADER_HEIGHT: u16 = 4;

const FOOTER_HEIGHT: u16 = 1;

const BAR_GAP: u16 = 1;
const MIN_BAR_WIDTH: u16 = 3;
const MAX_BAR_WIDTH: u16 = 12;

/// Width of one legend row: swatch, label, count, percent.
const LEGEND_WIDTH: u16 = 26;

/// Grid size used to sample the pie disk.
const PIE_RESOLUTION: usize = 96;

fn palette() -> EnumMap<Genre, Color> {
    enum_map! {
        Genre::Horror => Color::Red,
        Genre::Action => Color::Yellow,
        Genre::Rpg => Color::Magenta,
        Genre::Roguelike => Color::LightRed,
        Genre::Platformer => Color::Green,
        Genre::Sports => Color::LightGreen,
        Genre::Strategy => Color::Blue,
        Genre::Fps => Color::Cyan,
        Genre::Mmo => Color::LightMagenta,
        Genre::Mobile => Color::LightYellow,
        Genre::Shooter => Color::LightBlue,
    }
}

/// Renders the whole dashboard to the frame.
pub fn render(state: &DashboardState, frame: &mut Frame) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(frame.area());

    render_header(state, frame, header);

    if state.chart.is_empty() {
        let waiting = Paragraph::new(format!("Waiting for reviews on {} ...", state.source))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(waiting, body);
    } else {
        let colors = palette();
        let [bars, pie] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(body);
        render_bars(&state.chart, &colors, frame, bars);
        render_pie(&state.chart, &colors, frame, pie);
    }

    render_footer(state, frame, footer);
}

fn render_header(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let status_style = match state.status {
        StreamStatus::Live => Style::default().fg(Color::Green),
        StreamStatus::Closed => Style::default().fg(Color::Yellow),
        StreamStatus::Interrupted => Style::default().fg(Color::Red),
    };
    let dim = Style::default().fg(Color::DarkGray);
    let chart = &state.chart;

    let lines = vec![
        Line::from(vec![
            Span::styled("channel ", dim),
            Span::raw(state.source.clone()),
            Span::styled("  status ", dim),
            Span::styled(state.status.label(), status_style),
        ]),
        Line::from(vec![
            Span::styled("messages ", dim),
            Span::raw(chart.total.to_string()),
            Span::styled("  genres ", dim),
            Span::raw(chart.bars.len().to_string()),
            Span::styled("  dropped ", dim),
            Span::raw(chart.dropped.to_string()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " reviewstream ",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_bars(chart: &ChartData, colors: &EnumMap<Genre, Color>, frame: &mut Frame, area: Rect) {
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .map(|bar| {
            let color = colors[bar.genre];
            Bar::default()
                .value(bar.average.round() as u64)
                .text_value(format!("{:.1}", bar.average))
                .label(Line::from(bar.genre.label()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let widget = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Average score by genre "),
        )
        .bar_width(bar_width(area.width.saturating_sub(2), bars.len()))
        .bar_gap(BAR_GAP)
        .max(u64::from(SCORE_MAX))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(widget, area);
}

/// Spreads `count` bars over `available` columns.
fn bar_width(available: u16, count: usize) -> u16 {
    if count == 0 {
        return MAX_BAR_WIDTH;
    }
    let count = count as u16;
    let per_bar = available.saturating_sub(BAR_GAP * (count - 1)) / count;
    per_bar.clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

fn render_pie(chart: &ChartData, colors: &EnumMap<Genre, Color>, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Share of reviews ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [canvas_area, legend_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(LEGEND_WIDTH)]).areas(inner);

    let clouds = pie::slice_points(&chart.slices, PIE_RESOLUTION);
    let (x_bounds, y_bounds) = pie::canvas_bounds(canvas_area.width, canvas_area.height);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for (slice, points) in chart.slices.iter().zip(&clouds) {
                ctx.draw(&Points {
                    coords: points,
                    color: colors[slice.genre],
                });
            }
        });
    frame.render_widget(canvas, canvas_area);

    let legend: Vec<Line> = chart
        .slices
        .iter()
        .map(|slice| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(colors[slice.genre])),
                Span::raw(format!(
                    "{:<10} {:>5} {:>5.1}%",
                    slice.genre.label(),
                    slice.count,
                    slice.share * 100.0
                )),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(legend), legend_area);
}

fn render_footer(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let hint = match state.status {
        StreamStatus::Live => "q/Esc quit",
        StreamStatus::Closed | StreamStatus::Interrupted => "no more messages, q/Esc quit",
    };
    let footer = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)));
    frame.render_widget(footer, area);
}
