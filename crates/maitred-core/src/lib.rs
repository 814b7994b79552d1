pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::MaitredConfig;
pub use error::{MaitredError, Result};
pub use events::StreamEvent;
pub use types::*;
