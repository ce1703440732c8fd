//! Diary HTTP API
//!
//! The binary wires `setup::initialize_app` to `setup::server::start_server`; the library
//! is exposed so integration tests can build the router around an in-memory store.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{DiaryImage, DiaryService};
pub use state::AppState;
