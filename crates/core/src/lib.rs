pub mod input;
pub mod metrics;
pub mod report;
