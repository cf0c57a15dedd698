pub mod chart;
pub mod config;
pub mod error;
pub mod output;
pub mod predictor;
pub mod protocol;
pub mod scoring;
pub mod telemetry;
