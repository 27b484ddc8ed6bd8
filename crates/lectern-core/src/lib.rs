pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::LecternConfig;
pub use error::{LecternError, Result};
pub use events::SessionEvent;
pub use types::*;
