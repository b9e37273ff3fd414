use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use super::sign::{sign, signed_url};
use crate::errors::{AppError, AppResult};
use crate::push::{
    AnyPushRequest, Broadcast, Cast, CastType, Customizedcast, Filecast, Groupcast, Listcast,
    MessageKind, PushRequest, Unicast,
};
use crate::shared::config::{Config, EndpointConfig};

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const SIGNED_METHOD: &str = "POST";

/// Configuration for the Umeng client
#[derive(Debug, Clone)]
pub struct UmengClientConfig {
    pub appkey: String,
    pub app_master_secret: String,
    pub endpoints: EndpointConfig,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for UmengClientConfig {
    fn default() -> Self {
        Self {
            appkey: String::new(),
            app_master_secret: String::new(),
            endpoints: EndpointConfig::default(),
            timeout_secs: Some(30),
            user_agent: Some("umeng-push/0.1.0".to_string()),
        }
    }
}

impl UmengClientConfig {
    pub fn new(appkey: impl Into<String>, app_master_secret: impl Into<String>) -> Self {
        Self {
            appkey: appkey.into(),
            app_master_secret: app_master_secret.into(),
            ..Default::default()
        }
    }
}

impl From<&Config> for UmengClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            appkey: config.umeng.appkey.clone(),
            app_master_secret: config.umeng.app_master_secret.clone(),
            endpoints: config.endpoints.clone(),
            timeout_secs: config.umeng.timeout_secs,
            ..Default::default()
        }
    }
}

/// Blocking client for the Umeng push service
///
/// Owns the application key, master secret and endpoint set. Cloning is
/// cheap; every [`PushRequest`] carries its own clone. Each call opens a new
/// connection and is never retried.
#[derive(Debug, Clone)]
pub struct UmengClient {
    client: Client,
    config: UmengClientConfig,
}

impl UmengClient {
    /// Create a new client, validating every endpoint URL
    pub fn new(config: UmengClientConfig) -> AppResult<Self> {
        for (name, url) in config.endpoints.iter() {
            Url::parse(url).map_err(|e| AppError::InvalidEndpoint {
                name: name.to_string(),
                url: url.to_string(),
                source: Some(Box::new(e)),
            })?;
        }

        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(30));

        let mut client_builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0);

        if let Some(user_agent) = &config.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }

        let client = client_builder.build().map_err(|e| AppError::HttpClient {
            message: "Failed to create blocking HTTP client".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(Self { client, config })
    }

    pub fn appkey(&self) -> &str {
        &self.config.appkey
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.config.endpoints
    }

    /// Signature of a POST of `body` to `url` with this client's secret
    pub fn sign(&self, url: &str, body: &str) -> String {
        sign(SIGNED_METHOD, url, body, &self.config.app_master_secret)
    }

    /// Start a request for any cast marker
    pub fn cast<C: Cast>(&self, kind: MessageKind) -> PushRequest<C> {
        PushRequest::new(self.clone(), kind)
    }

    pub fn unicast(&self, kind: MessageKind) -> PushRequest<Unicast> {
        self.cast(kind)
    }

    pub fn listcast(&self, kind: MessageKind) -> PushRequest<Listcast> {
        self.cast(kind)
    }

    pub fn filecast(&self, kind: MessageKind) -> PushRequest<Filecast> {
        self.cast(kind)
    }

    pub fn broadcast(&self, kind: MessageKind) -> PushRequest<Broadcast> {
        self.cast(kind)
    }

    pub fn groupcast(&self, kind: MessageKind) -> PushRequest<Groupcast> {
        self.cast(kind)
    }

    pub fn customizedcast(&self, kind: MessageKind) -> PushRequest<Customizedcast> {
        self.cast(kind)
    }

    /// Start a request whose cast type is only known at run time
    pub fn request(&self, cast_type: CastType, kind: MessageKind) -> AnyPushRequest {
        match cast_type {
            CastType::Unicast => AnyPushRequest::Unicast(self.unicast(kind)),
            CastType::Listcast => AnyPushRequest::Listcast(self.listcast(kind)),
            CastType::Filecast => AnyPushRequest::Filecast(self.filecast(kind)),
            CastType::Broadcast => AnyPushRequest::Broadcast(self.broadcast(kind)),
            CastType::Groupcast => AnyPushRequest::Groupcast(self.groupcast(kind)),
            CastType::Customizedcast => AnyPushRequest::Customizedcast(self.customizedcast(kind)),
        }
    }

    /// Query the state of a push task
    pub fn status(&self, task_id: &str) -> AppResult<String> {
        let url = self.config.endpoints.status.clone();
        self.post_field(&url, "task_id", task_id)
    }

    /// Cancel a scheduled push task
    pub fn cancel(&self, task_id: &str) -> AppResult<String> {
        let url = self.config.endpoints.cancel.clone();
        self.post_field(&url, "task_id", task_id)
    }

    /// Upload a newline-separated device token list for filecast
    pub fn upload(&self, content: &str) -> AppResult<String> {
        let url = self.config.endpoints.upload.clone();
        self.post_field(&url, "content", content)
    }

    /// Build the `{appkey, key, timestamp}` message of an auxiliary call
    pub fn field_message(&self, key: &str, value: &str, timestamp: i64) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("appkey".to_string(), Value::String(self.config.appkey.clone()));
        message.insert(key.to_string(), Value::String(value.to_string()));
        message.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
        message
    }

    fn post_field(&self, url: &str, key: &str, value: &str) -> AppResult<String> {
        let message = self.field_message(key, value, chrono::Utc::now().timestamp());
        let body = serde_json::to_string(&message)
            .map_err(|e| AppError::serialization_with_source(format!("{key} request"), e))?;

        self.post_signed(url, body)
    }

    /// Sign `body` for `url` and POST it, returning the raw response text
    pub(crate) fn post_signed(&self, url: &str, body: String) -> AppResult<String> {
        let signature = self.sign(url, &body);
        let request_url = signed_url(url, &signature);

        tracing::debug!("Signature for {}: {}", url, signature);
        tracing::debug!("Request body: {}", body);

        let response = self
            .client
            .post(&request_url)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .body(body)
            .send()
            .map_err(|e| AppError::http_request(SIGNED_METHOD, url, e))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| AppError::response_body(url, e))?;

        if status.is_success() {
            tracing::info!("POST {} -> {}", url, status);
        } else {
            tracing::warn!("POST {} -> {}: {}", url, status, text);
        }

        Ok(text)
    }
}
