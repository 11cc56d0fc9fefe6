//! Response normaliser: locates the output slot in a backend envelope and
//! classifies its value as a [`ContentPayload`].

use serde_json::{Map, Value};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::types::ContentPayload;

/// Key every element of a structured answer must carry.
const PRODUCT_KEY: &str = "Product";

/// Extract the content payload from a decoded envelope.
///
/// The output slot is looked up at `envelope[outputs_field][output_slot]`,
/// falling back to a top-level `output_slot` key.
///
/// # Errors
///
/// Returns [`BackendError::Application`] if the envelope carries an error
/// signal (`error`, `errors` or `detail`) even though the transport
/// succeeded.
pub fn extract_content(
    envelope: &Value,
    config: &BackendConfig,
) -> Result<ContentPayload, BackendError> {
    if let Some(message) = application_error(envelope) {
        return Err(BackendError::Application(message));
    }

    let slot = envelope
        .get(&config.outputs_field)
        .and_then(|outputs| outputs.get(&config.output_slot))
        .or_else(|| envelope.get(&config.output_slot));

    let payload = match slot {
        None | Some(Value::Null) => ContentPayload::Missing,
        Some(Value::String(text)) => ContentPayload::RawString(text.clone()),
        Some(Value::Array(items)) => match as_product_objects(items) {
            Some(objects) => ContentPayload::StructuredArray(objects),
            None => ContentPayload::OtherObject(Value::Array(items.clone())),
        },
        Some(other) => ContentPayload::OtherObject(other.clone()),
    };

    tracing::debug!(kind = payload.kind(), "content payload classified");
    Ok(payload)
}

/// Duck-type check: every element is an object with a `Product` key.
fn as_product_objects(items: &[Value]) -> Option<Vec<Map<String, Value>>> {
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) if map.contains_key(PRODUCT_KEY) => Some(map.clone()),
            _ => None,
        })
        .collect()
}

/// Return a human-readable message if the envelope signals its own error.
fn application_error(envelope: &Value) -> Option<String> {
    match envelope.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {}
        Some(Value::String(message)) if message.trim().is_empty() => {}
        Some(Value::String(message)) => return Some(message.trim().to_owned()),
        Some(value) => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| value.to_string());
            return Some(message);
        }
    }

    if let Some(Value::Array(errors)) = envelope.get("errors") {
        if let Some(first) = errors.first() {
            let message = first
                .as_str()
                .map(str::to_owned)
                .or_else(|| {
                    first
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| first.to_string());
            return Some(message);
        }
    }

    envelope
        .get("detail")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> BackendConfig {
        BackendConfig::default()
    }

    #[test]
    fn missing_outputs_is_missing() {
        let payload = extract_content(&json!({"run_id": "abc"}), &config()).expect("ok");
        assert_eq!(payload, ContentPayload::Missing);
    }

    #[test]
    fn null_slot_is_missing() {
        let envelope = json!({"outputs": {"out-0": null}});
        let payload = extract_content(&envelope, &config()).expect("ok");
        assert_eq!(payload, ContentPayload::Missing);
    }

    #[test]
    fn string_slot_is_raw_string() {
        let envelope = json!({"outputs": {"out-0": "Here are results: []"}});
        let payload = extract_content(&envelope, &config()).expect("ok");
        assert_eq!(
            payload,
            ContentPayload::RawString("Here are results: []".into())
        );
    }

    #[test]
    fn product_array_is_structured() {
        let envelope = json!({"outputs": {"out-0": [
            {"Product": "iPhone 14", "Price": "$999"},
            {"Product": "iPhone 14 Pro"}
        ]}});
        let payload = extract_content(&envelope, &config()).expect("ok");
        match payload {
            ContentPayload::StructuredArray(items) => assert_eq!(items.len(), 2),
            other => panic!("expected structured array, got {other:?}"),
        }
    }

    #[test]
    fn array_without_product_key_is_other() {
        let envelope = json!({"outputs": {"out-0": [{"name": "x"}]}});
        let payload = extract_content(&envelope, &config()).expect("ok");
        assert_eq!(payload.kind(), "other_object");
    }

    #[test]
    fn empty_array_is_other() {
        let envelope = json!({"outputs": {"out-0": []}});
        let payload = extract_content(&envelope, &config()).expect("ok");
        assert_eq!(payload.kind(), "other_object");
    }

    #[test]
    fn object_slot_is_other() {
        let envelope = json!({"outputs": {"out-0": {"items": []}}});
        let payload = extract_content(&envelope, &config()).expect("ok");
        assert_eq!(payload, ContentPayload::OtherObject(json!({"items": []})));
    }

    #[test]
    fn top_level_slot_is_accepted() {
        let envelope = json!({"out-0": "text"});
        let payload = extract_content(&envelope, &config()).expect("ok");
        assert_eq!(payload, ContentPayload::RawString("text".into()));
    }

    #[test]
    fn custom_slot_names_are_honoured() {
        let cfg = BackendConfig {
            outputs_field: "data".into(),
            output_slot: "answer".into(),
            ..Default::default()
        };
        let envelope = json!({"data": {"answer": "hello"}});
        let payload = extract_content(&envelope, &cfg).expect("ok");
        assert_eq!(payload, ContentPayload::RawString("hello".into()));
    }

    #[test]
    fn error_string_is_application_error() {
        let err = extract_content(&json!({"error": "quota exhausted"}), &config()).unwrap_err();
        assert!(matches!(err, BackendError::Application(ref m) if m == "quota exhausted"));
    }

    #[test]
    fn error_object_message_is_used() {
        let envelope = json!({"error": {"message": "flow not found", "code": 404}});
        let err = extract_content(&envelope, &config()).unwrap_err();
        assert!(err.to_string().contains("flow not found"));
    }

    #[test]
    fn errors_array_is_application_error() {
        let envelope = json!({"errors": [{"message": "bad input"}], "outputs": {"out-0": "x"}});
        let err = extract_content(&envelope, &config()).unwrap_err();
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn detail_is_application_error() {
        let err = extract_content(&json!({"detail": "Not authenticated"}), &config()).unwrap_err();
        assert_eq!(err.code(), "BACKEND_APPLICATION_ERROR");
    }

    #[test]
    fn null_or_false_error_is_ignored() {
        let envelope = json!({"error": null, "errors": [], "outputs": {"out-0": "x"}});
        assert!(extract_content(&envelope, &config()).is_ok());
        let envelope = json!({"error": false, "outputs": {"out-0": "x"}});
        assert!(extract_content(&envelope, &config()).is_ok());
    }

    #[test]
    fn blank_error_or_detail_is_ignored() {
        let envelope = json!({"error": "", "outputs": {"out-0": "x"}});
        assert_eq!(
            extract_content(&envelope, &config()).expect("ok"),
            ContentPayload::RawString("x".into())
        );
        let envelope = json!({"error": "  ", "detail": "", "outputs": {"out-0": "x"}});
        assert!(extract_content(&envelope, &config()).is_ok());
    }
}
