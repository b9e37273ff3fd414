//! Clients for the Umeng push service
//!
//! ## Architecture
//!
//! - **UmengClient**: blocking HTTP client owning the credentials and endpoints
//! - **sign**: the MD5 request signature shared by every call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use umeng_push::push::{MessageKind, Platform};
//! use umeng_push::shared::clients::{UmengClient, UmengClientConfig};
//!
//! # fn main() -> umeng_push::errors::AppResult<()> {
//! let client = UmengClient::new(UmengClientConfig::new("appkey", "master-secret"))?;
//!
//! let response = client
//!     .unicast(MessageKind::Notification)
//!     .device_token("device-token")
//!     .body("ticker", "Hello")
//!     .body("title", "Hello")
//!     .body("text", "World")
//!     .push(Platform::Android)?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

pub mod sign;
pub mod umeng;

pub use umeng::{UmengClient, UmengClientConfig};
