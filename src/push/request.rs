//! Push request builder
//!
//! A [`PushRequest`] accumulates the fields of one push message and is
//! consumed by [`PushRequest::push`]. Cast-specific setters only exist on the
//! matching cast marker, so a unicast request has no `alias` and a broadcast
//! request has no `device_tokens`. [`AnyPushRequest`] covers callers that pick
//! the cast type at run time.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::cast::{
    Broadcast, Cast, CastType, Customizedcast, Filecast, Groupcast, Listcast, MessageKind,
    Platform, Unicast,
};
use super::payload::{build_payload, build_policy};
use crate::errors::{AppError, AppResult};
use crate::shared::clients::umeng::UmengClient;

/// Maximum number of device tokens in one listcast
pub const MAX_LISTCAST_TOKENS: usize = 500;
/// Maximum number of aliases in one customizedcast
pub const MAX_ALIASES: usize = 50;
/// The only body key accepted for custom messages
pub const CUSTOM_BODY_KEY: &str = "custom";

const DEVICE_TOKENS_FIELD: &str = "device_tokens";
// The service accepts this spelling for untruncated listcast token lists.
const LISTCAST_TOKENS_FIELD: &str = "devicd_tokens";

/// One push message under construction
///
/// Setters take and return the request by value. Calls that do not apply to
/// the message kind are ignored; see [`PushRequest::body`].
#[derive(Debug)]
pub struct PushRequest<C: Cast> {
    client: UmengClient,
    kind: MessageKind,
    policy: Option<Map<String, Value>>,
    extra: Option<BTreeMap<String, String>>,
    apns: Option<Map<String, Value>>,
    body: Option<Map<String, Value>>,
    message: Map<String, Value>,
    // First value that failed to convert to JSON, reported by the terminal call
    conversion_error: Option<String>,
    _cast: PhantomData<C>,
}

impl<C: Cast> PushRequest<C> {
    /// Create a request; `appkey` and `type` are set immediately
    pub fn new(client: UmengClient, kind: MessageKind) -> Self {
        let mut message = Map::new();
        message.insert("appkey".to_string(), Value::String(client.appkey().to_string()));
        message.insert("type".to_string(), Value::String(C::CAST_TYPE.as_str().to_string()));

        Self {
            client,
            kind,
            policy: None,
            extra: None,
            apns: None,
            body: None,
            message,
            conversion_error: None,
            _cast: PhantomData,
        }
    }

    pub fn cast_type(&self) -> CastType {
        C::CAST_TYPE
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn client(&self) -> &UmengClient {
        &self.client
    }

    /// Top-level fields set so far, without payload, policy or timestamp
    pub fn fields(&self) -> &Map<String, Value> {
        &self.message
    }

    /// Reserved; the filter is accepted but never sent
    pub fn filter(self, filter: impl Into<String>) -> Self {
        debug!("Ignoring filter '{}': filters are not sent", filter.into());
        self
    }

    /// Add a key/value pair to the extra section
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a field to the notification body.
    ///
    /// Applies only to notifications, or to the `custom` key of a message;
    /// any other call is ignored.
    pub fn body<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        if self.kind == MessageKind::Message && key != CUSTOM_BODY_KEY {
            debug!("Ignoring body key '{}' on a custom message", key);
            return self;
        }

        if let Some(value) = self.to_json("body", &key, value) {
            self.body.get_or_insert_with(Map::new).insert(key, value);
        }
        self
    }

    /// Add a field to the APNs `aps` section
    pub fn apns<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        if let Some(value) = self.to_json("apns", &key, value) {
            self.apns.get_or_insert_with(Map::new).insert(key, value);
        }
        self
    }

    /// Add a delivery policy field (expiry, throttling, `out_biz_no`, ...)
    pub fn policy<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        if let Some(value) = self.to_json("policy", &key, value) {
            self.policy.get_or_insert_with(Map::new).insert(key, value);
        }
        self
    }

    pub fn mode(self, production: bool) -> Self {
        self.set_field("production_mode", if production { "true" } else { "false" })
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.set_field("description", description)
    }

    pub fn thirdparty_id(self, id: impl Into<String>) -> Self {
        self.set_field("thirdparty_id", id)
    }

    /// Finalize the outgoing message for `platform` at `timestamp` (Unix
    /// seconds) without sending it.
    pub fn build_message(&self, platform: Platform, timestamp: i64) -> AppResult<Map<String, Value>> {
        if let Some(context) = &self.conversion_error {
            return Err(AppError::JsonSerialization {
                context: context.clone(),
                source: None,
            });
        }

        let mut message = self.message.clone();
        message.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
        message.insert(
            "payload".to_string(),
            build_payload(
                platform,
                self.kind,
                self.body.as_ref(),
                self.apns.as_ref(),
                self.extra.as_ref(),
            ),
        );
        message.insert("policy".to_string(), build_policy(platform, self.policy.as_ref()));

        Ok(message)
    }

    /// Send the message and return the raw response text
    pub fn push(self, platform: Platform) -> AppResult<String> {
        let message = self.build_message(platform, chrono::Utc::now().timestamp())?;
        let body = serde_json::to_string(&message)
            .map_err(|e| AppError::serialization_with_source("push message", e))?;

        let url = self.client.endpoints().send.clone();
        tracing::info!("Sending {} push to {}", C::CAST_TYPE, platform);
        self.client.post_signed(&url, body)
    }

    fn set_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.message.insert(key.to_string(), Value::String(value.into()));
        self
    }

    fn to_json<V: Serialize>(&mut self, section: &str, key: &str, value: V) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Value for {} key '{}' is not representable as JSON: {}", section, key, e);
                self.conversion_error
                    .get_or_insert_with(|| format!("{section} key '{key}': {e}"));
                None
            }
        }
    }
}

impl PushRequest<Unicast> {
    /// Set the target device; only the first comma-separated token is kept
    pub fn device_token(self, token: &str) -> Self {
        let first = token.split(',').next().unwrap_or_default();
        self.set_field(DEVICE_TOKENS_FIELD, first)
    }
}

impl PushRequest<Listcast> {
    /// Set the target devices, keeping at most 500 comma-separated tokens
    pub fn device_tokens(self, tokens: &str) -> Self {
        match truncate_list(tokens, MAX_LISTCAST_TOKENS) {
            Some(truncated) => {
                warn!(
                    "Device tokens exceed {}; only the first {} will be used",
                    MAX_LISTCAST_TOKENS, MAX_LISTCAST_TOKENS
                );
                self.set_field(DEVICE_TOKENS_FIELD, truncated)
            }
            None => self.set_field(LISTCAST_TOKENS_FIELD, tokens),
        }
    }
}

impl PushRequest<Filecast> {
    /// Target the devices listed in a previously uploaded file
    pub fn file_id(self, id: impl Into<String>) -> Self {
        self.set_field("file_id", id)
    }
}

impl PushRequest<Customizedcast> {
    /// Target devices by alias, keeping at most 50 comma-separated aliases
    pub fn alias(self, alias_type: impl Into<String>, alias: &str) -> Self {
        let request = self.set_field("alias_type", alias_type);
        match truncate_list(alias, MAX_ALIASES) {
            Some(truncated) => {
                warn!("Aliases exceed {}; only the first {} will be used", MAX_ALIASES, MAX_ALIASES);
                request.set_field("alias", truncated)
            }
            None => request.set_field("alias", alias),
        }
    }
}

/// First `limit` entries of a comma-separated list, or `None` when the list
/// already fits.
fn truncate_list(list: &str, limit: usize) -> Option<String> {
    let entries: Vec<&str> = list.split(',').collect();
    if entries.len() <= limit {
        return None;
    }
    Some(entries[..limit].join(","))
}

/// A push request whose cast type is chosen at run time
///
/// Cast-specific setters that do not apply to the wrapped cast are ignored.
#[derive(Debug)]
pub enum AnyPushRequest {
    Unicast(PushRequest<Unicast>),
    Listcast(PushRequest<Listcast>),
    Filecast(PushRequest<Filecast>),
    Broadcast(PushRequest<Broadcast>),
    Groupcast(PushRequest<Groupcast>),
    Customizedcast(PushRequest<Customizedcast>),
}

macro_rules! with_inner {
    ($value:expr, $request:ident => $body:expr) => {
        match $value {
            AnyPushRequest::Unicast($request) => $body,
            AnyPushRequest::Listcast($request) => $body,
            AnyPushRequest::Filecast($request) => $body,
            AnyPushRequest::Broadcast($request) => $body,
            AnyPushRequest::Groupcast($request) => $body,
            AnyPushRequest::Customizedcast($request) => $body,
        }
    };
}

macro_rules! map_inner {
    ($value:expr, $request:ident => $body:expr) => {
        match $value {
            AnyPushRequest::Unicast($request) => AnyPushRequest::Unicast($body),
            AnyPushRequest::Listcast($request) => AnyPushRequest::Listcast($body),
            AnyPushRequest::Filecast($request) => AnyPushRequest::Filecast($body),
            AnyPushRequest::Broadcast($request) => AnyPushRequest::Broadcast($body),
            AnyPushRequest::Groupcast($request) => AnyPushRequest::Groupcast($body),
            AnyPushRequest::Customizedcast($request) => AnyPushRequest::Customizedcast($body),
        }
    };
}

impl AnyPushRequest {
    pub fn cast_type(&self) -> CastType {
        with_inner!(self, request => request.cast_type())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        with_inner!(self, request => request.fields())
    }

    /// Device tokens for unicast (first token) or listcast (up to 500)
    pub fn device_tokens(self, tokens: &str) -> Self {
        match self {
            AnyPushRequest::Unicast(request) => AnyPushRequest::Unicast(request.device_token(tokens)),
            AnyPushRequest::Listcast(request) => AnyPushRequest::Listcast(request.device_tokens(tokens)),
            other => {
                debug!("Ignoring device tokens for {} push", other.cast_type());
                other
            }
        }
    }

    pub fn alias(self, alias_type: impl Into<String>, alias: &str) -> Self {
        match self {
            AnyPushRequest::Customizedcast(request) => {
                AnyPushRequest::Customizedcast(request.alias(alias_type, alias))
            }
            other => {
                debug!("Ignoring alias for {} push", other.cast_type());
                other
            }
        }
    }

    pub fn file_id(self, id: impl Into<String>) -> Self {
        match self {
            AnyPushRequest::Filecast(request) => AnyPushRequest::Filecast(request.file_id(id)),
            other => {
                debug!("Ignoring file id for {} push", other.cast_type());
                other
            }
        }
    }

    pub fn filter(self, filter: impl Into<String>) -> Self {
        map_inner!(self, request => request.filter(filter))
    }

    pub fn extra(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        map_inner!(self, request => request.extra(key, value))
    }

    pub fn body<V: Serialize>(self, key: impl Into<String>, value: V) -> Self {
        map_inner!(self, request => request.body(key, value))
    }

    pub fn apns<V: Serialize>(self, key: impl Into<String>, value: V) -> Self {
        map_inner!(self, request => request.apns(key, value))
    }

    pub fn policy<V: Serialize>(self, key: impl Into<String>, value: V) -> Self {
        map_inner!(self, request => request.policy(key, value))
    }

    pub fn mode(self, production: bool) -> Self {
        map_inner!(self, request => request.mode(production))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        map_inner!(self, request => request.description(description))
    }

    pub fn thirdparty_id(self, id: impl Into<String>) -> Self {
        map_inner!(self, request => request.thirdparty_id(id))
    }

    pub fn build_message(&self, platform: Platform, timestamp: i64) -> AppResult<Map<String, Value>> {
        with_inner!(self, request => request.build_message(platform, timestamp))
    }

    pub fn push(self, platform: Platform) -> AppResult<String> {
        with_inner!(self, request => request.push(platform))
    }
}
