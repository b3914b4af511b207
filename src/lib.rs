mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod sync;
mod utils;


pub use api::{gateway, Call, Gateway, Mode, Operation, TestGateway, DEMO_USER, TEST_MODE_ENV};
pub use config::{Config, DEFAULT_API_URL};
pub use error::{Error, ErrorType, Result};
pub use sync::{Feedback, LoadOrdering, LoadOutcome, Notify, Snapshot, TransactionSync};
