//! Payload and policy sections of the outgoing message
//!
//! Both functions are pure so the wire layout can be checked without a
//! network round trip.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::cast::{MessageKind, Platform};

/// Policy key the service rejects on iOS
pub const OUT_BIZ_NO: &str = "out_biz_no";

/// Build the `payload` object for the given platform.
///
/// Android carries `display_type` and `body` (and `extra` for non-empty
/// custom messages). iOS carries `aps` with every extra key flattened next
/// to it. Unset maps are encoded as `null`.
pub fn build_payload(
    platform: Platform,
    kind: MessageKind,
    body: Option<&Map<String, Value>>,
    apns: Option<&Map<String, Value>>,
    extra: Option<&BTreeMap<String, String>>,
) -> Value {
    let mut payload = Map::new();

    match platform {
        Platform::Android => {
            payload.insert("display_type".to_string(), json!(kind.display_type()));
            payload.insert("body".to_string(), optional_object(body));

            if kind == MessageKind::Message {
                if let Some(extra) = extra.filter(|extra| !extra.is_empty()) {
                    payload.insert("extra".to_string(), json!(extra));
                }
            }
        }
        Platform::Ios => {
            payload.insert("aps".to_string(), optional_object(apns));

            for (key, value) in extra.into_iter().flatten() {
                payload.insert(key.clone(), Value::String(value.clone()));
            }
        }
    }

    Value::Object(payload)
}

/// Build the `policy` object; always an object, possibly empty.
pub fn build_policy(platform: Platform, policy: Option<&Map<String, Value>>) -> Value {
    let policy = policy
        .into_iter()
        .flatten()
        .filter(|(key, _)| !(platform == Platform::Ios && key.as_str() == OUT_BIZ_NO))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Map<String, Value>>();

    Value::Object(policy)
}

fn optional_object(map: Option<&Map<String, Value>>) -> Value {
    map.map(|map| Value::Object(map.clone()))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("ticker".to_string(), json!("hi"));
        body
    }

    fn extra() -> BTreeMap<String, String> {
        BTreeMap::from([("order".to_string(), "42".to_string())])
    }

    #[test]
    fn test_android_notification_payload() {
        let body = body();
        let extra = extra();
        let payload = build_payload(
            Platform::Android,
            MessageKind::Notification,
            Some(&body),
            None,
            Some(&extra),
        );

        assert_eq!(
            payload,
            json!({"display_type": "notification", "body": {"ticker": "hi"}})
        );
    }

    #[test]
    fn test_android_message_payload_carries_extra() {
        let extra = extra();
        let payload = build_payload(Platform::Android, MessageKind::Message, None, None, Some(&extra));

        assert_eq!(payload["display_type"], "message");
        assert_eq!(payload["body"], Value::Null);
        assert_eq!(payload["extra"], json!({"order": "42"}));
    }

    #[test]
    fn test_android_message_payload_skips_empty_extra() {
        let extra = BTreeMap::new();
        let payload = build_payload(Platform::Android, MessageKind::Message, None, None, Some(&extra));
        assert!(payload.get("extra").is_none());
    }

    #[test]
    fn test_ios_payload_flattens_extra() {
        let mut apns = Map::new();
        apns.insert("alert".to_string(), json!("hello"));
        let extra = extra();

        let payload = build_payload(
            Platform::Ios,
            MessageKind::Message,
            None,
            Some(&apns),
            Some(&extra),
        );

        assert_eq!(payload, json!({"aps": {"alert": "hello"}, "order": "42"}));
    }

    #[test]
    fn test_policy_excludes_out_biz_no_on_ios() {
        let mut policy = Map::new();
        policy.insert("expire_time".to_string(), json!("2026-10-18 10:00:00"));
        policy.insert(OUT_BIZ_NO.to_string(), json!("biz-1"));

        let ios = build_policy(Platform::Ios, Some(&policy));
        assert!(ios.get(OUT_BIZ_NO).is_none());
        assert_eq!(ios["expire_time"], "2026-10-18 10:00:00");

        let android = build_policy(Platform::Android, Some(&policy));
        assert_eq!(android[OUT_BIZ_NO], "biz-1");
    }

    #[test]
    fn test_unset_policy_is_empty_object() {
        assert_eq!(build_policy(Platform::Android, None), json!({}));
    }
}
