use serde::{Deserialize, Serialize};

pub const DEFAULT_SEND_URL: &str = "http://msg.umeng.com/api/send";
pub const DEFAULT_STATUS_URL: &str = "http://msg.umeng.com/api/status";
pub const DEFAULT_CANCEL_URL: &str = "http://msg.umeng.com/api/cancel";
pub const DEFAULT_UPLOAD_URL: &str = "http://msg.umeng.com/upload";

/// Main configuration structure for the umeng-push tool
///
/// Holds the application credentials, the service endpoints and the logging
/// settings of the command line front end.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub umeng: UmengConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application credentials and transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UmengConfig {
    pub appkey: String,
    pub app_master_secret: String,
    #[serde(default)]
    pub production_mode: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for UmengConfig {
    fn default() -> Self {
        Self {
            appkey: String::new(),
            app_master_secret: String::new(),
            production_mode: false,
            timeout_secs: Some(30),
        }
    }
}

/// Service endpoints, one per terminal operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub send: String,
    pub status: String,
    pub cancel: String,
    pub upload: String,
}

impl EndpointConfig {
    /// All endpoints rooted at another base URL, keeping the service paths
    pub fn with_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            send: format!("{base}/api/send"),
            status: format!("{base}/api/status"),
            cancel: format!("{base}/api/cancel"),
            upload: format!("{base}/upload"),
        }
    }

    /// Named endpoints, for validation and display
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("send", self.send.as_str()),
            ("status", self.status.as_str()),
            ("cancel", self.cancel.as_str()),
            ("upload", self.upload.as_str()),
        ]
        .into_iter()
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            send: DEFAULT_SEND_URL.to_string(),
            status: DEFAULT_STATUS_URL.to_string(),
            cancel: DEFAULT_CANCEL_URL.to_string(),
            upload: DEFAULT_UPLOAD_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: Option<String>, // None = console only
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
        }
    }
}
