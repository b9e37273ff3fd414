//! Umeng Push Library
//!
//! Builds, signs and sends push messages to the Umeng push service, and
//! queries, cancels and uploads device lists for push tasks.

pub mod config;
pub mod errors;
pub mod push;
pub mod shared;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigManager};
pub use errors::{AppError, AppResult};
pub use push::{AnyPushRequest, CastType, MessageKind, Platform, PushRequest};
pub use shared::clients::{UmengClient, UmengClientConfig};
