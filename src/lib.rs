pub mod adapters;
pub mod application;
pub mod domain;
pub mod services;

pub use adapters::{router::create_router, state::AppState};
pub use application::{error::ApplicationError, services::FileManager};
