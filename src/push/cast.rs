//! Cast types, message kinds and target platforms
//!
//! The service addresses devices in six ways. [`CastType`] is the run-time
//! form; the unit structs implementing [`Cast`] are the compile-time form
//! used to restrict cast-specific setters on [`PushRequest`](super::PushRequest).

use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Delivery targeting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    Unicast,
    Listcast,
    Filecast,
    Broadcast,
    Groupcast,
    Customizedcast,
}

impl CastType {
    pub const ALL: [CastType; 6] = [
        CastType::Unicast,
        CastType::Listcast,
        CastType::Filecast,
        CastType::Broadcast,
        CastType::Groupcast,
        CastType::Customizedcast,
    ];

    /// Value of the `type` field on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CastType::Unicast => "unicast",
            CastType::Listcast => "listcast",
            CastType::Filecast => "filecast",
            CastType::Broadcast => "broadcast",
            CastType::Groupcast => "groupcast",
            CastType::Customizedcast => "customizedcast",
        }
    }

    /// Map a numeric cast code (0 = unicast .. 5 = customizedcast).
    ///
    /// Unknown codes fall back to [`CastType::Broadcast`].
    pub fn from_code(code: u8) -> CastType {
        match code {
            0 => CastType::Unicast,
            1 => CastType::Listcast,
            2 => CastType::Filecast,
            3 => CastType::Broadcast,
            4 => CastType::Groupcast,
            5 => CastType::Customizedcast,
            other => {
                tracing::warn!("Unknown cast type code {}, falling back to broadcast", other);
                CastType::Broadcast
            }
        }
    }

    /// Map a cast name (case-insensitive). Unknown names fall back to
    /// [`CastType::Broadcast`].
    pub fn from_name(name: &str) -> CastType {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|cast| cast.as_str() == normalized)
            .unwrap_or_else(|| {
                tracing::warn!("Unknown cast type '{}', falling back to broadcast", name);
                CastType::Broadcast
            })
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the payload is a system notification or a custom data message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageKind {
    #[default]
    Notification,
    Message,
}

impl MessageKind {
    /// Value of `payload.display_type` for Android
    pub fn display_type(&self) -> &'static str {
        match self {
            MessageKind::Notification => "notification",
            MessageKind::Message => "message",
        }
    }
}

impl FromStr for MessageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notification" => Ok(MessageKind::Notification),
            "message" => Ok(MessageKind::Message),
            other => Err(AppError::invalid_argument(
                "kind",
                format!("expected 'notification' or 'message', got '{other}'"),
            )),
        }
    }
}

/// Target device platform, decides the payload layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(AppError::invalid_argument(
                "platform",
                format!("expected 'android' or 'ios', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => f.write_str("android"),
            Platform::Ios => f.write_str("ios"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Compile-time cast marker
pub trait Cast: sealed::Sealed {
    const CAST_TYPE: CastType;
}

macro_rules! cast_marker {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl sealed::Sealed for $name {}

            impl Cast for $name {
                const CAST_TYPE: CastType = CastType::$name;
            }
        )+
    };
}

cast_marker! {
    /// One device, addressed by device token
    Unicast,
    /// Up to 500 devices, addressed by device tokens
    Listcast,
    /// Devices listed in an uploaded file
    Filecast,
    /// Every device of the application
    Broadcast,
    /// Devices matching a group filter
    Groupcast,
    /// Devices addressed by developer-defined alias
    Customizedcast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_falls_back_to_broadcast() {
        assert_eq!(CastType::from_code(0), CastType::Unicast);
        assert_eq!(CastType::from_code(5), CastType::Customizedcast);
        assert_eq!(CastType::from_code(42), CastType::Broadcast);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CastType::from_name("ListCast"), CastType::Listcast);
        assert_eq!(CastType::from_name(" filecast "), CastType::Filecast);
        assert_eq!(CastType::from_name("multicast"), CastType::Broadcast);
    }

    #[test]
    fn test_marker_types() {
        assert_eq!(Unicast::CAST_TYPE.as_str(), "unicast");
        assert_eq!(Customizedcast::CAST_TYPE, CastType::Customizedcast);
    }

    #[test]
    fn test_parse_kind_and_platform() {
        assert_eq!("Message".parse::<MessageKind>().unwrap(), MessageKind::Message);
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert!("windows".parse::<Platform>().is_err());
    }
}
