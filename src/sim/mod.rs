//! Simulation driver - the daily turn loop

pub mod day;

pub use day::{run_day, DayReport};
