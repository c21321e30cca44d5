pub mod config;
pub mod error;
pub mod notify;
pub mod types;

pub use error::{CoreError, Result};
