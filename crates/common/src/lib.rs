pub mod config;
pub mod error;
pub mod execution;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use execution::Execution;
pub use types::*;
