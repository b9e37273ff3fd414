//! Centralized error handling module
//!
//! Library code returns the structured [`AppError`]; the binary wraps it in
//! `anyhow` at the command handler boundary.

pub mod types;

pub use types::{AppError, AppResult};
