//! Axum HTTP adapter: exposes the run/script/stats API over the engine and
//! repository ports (§6).

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod input_source;
pub mod routes;
pub mod state;

pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
