//! HTTP backend for the to-do list: create, list and partially update tasks
//! held in a keyed record store.

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod normalize;
pub mod router;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{ApiError, ConfigError};
pub use router::app;
