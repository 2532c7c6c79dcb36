pub mod auth;
pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
