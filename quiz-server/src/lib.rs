pub mod activity;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod pages;
pub mod server;
pub mod session;

pub use activity::ActivityLog;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use message::{SubmitForm, SubmitResponse};
pub use server::{AppState, ServerHandle, create_app, start_server};
pub use session::{SESSION_COOKIE, SessionManager};
