//! HTTP request handlers for the Axum web server.
//!
//! Each submodule handles one API area and delegates to the shared
//! [`crate::state::AppState`].

pub mod artifacts;
pub mod export;
pub mod runs;
pub mod scripts;
pub mod stats;
