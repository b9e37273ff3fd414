//! Push message construction
//!
//! - **cast**: cast types, message kinds, platforms and cast markers
//! - **request**: the fluent [`PushRequest`] builder and its run-time wrapper
//! - **payload**: platform-specific payload and policy sections

pub mod cast;
pub mod payload;
pub mod request;

pub use cast::{
    Broadcast, Cast, CastType, Customizedcast, Filecast, Groupcast, Listcast, MessageKind,
    Platform, Unicast,
};
pub use request::{AnyPushRequest, PushRequest, CUSTOM_BODY_KEY, MAX_ALIASES, MAX_LISTCAST_TOKENS};
