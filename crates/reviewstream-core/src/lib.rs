//! Core reviewstream library (events, aggregation, channels, config).

pub mod channel;
pub mod chart;
pub mod config;
pub mod consumer;
pub mod event;
pub mod generator;
pub mod interrupt;
pub mod logging;
pub mod producer;
pub mod stats;
