//! Product extractor: an ordered chain of strategies, first match wins.
//!
//! # Strategies
//!
//! 1. **Direct**: a structured array is mapped record by record.
//! 2. **Tight**: from each `[{` opening in the text, leftmost first, one
//!    complete JSON array is parsed strictly. Nested arrays stay intact.
//! 3. **Loose**: the widest `[ ... ]` span, sanitised, then parsed.
//!
//! Opaque objects are serialised to JSON text and go through strategies 2
//! and 3 like free text. A parse failure inside a strategy demotes to the
//! next one. When every strategy declines, the caller gets a "no products
//! found" placeholder instead of an error.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::placeholder;
use crate::sanitize::sanitize;
use crate::types::{ContentPayload, ProductRecord, Query, ResultSet, NOT_AVAILABLE, NO_LINK};

/// Maximum number of records returned for one query.
pub const MAX_RECORDS: usize = 50;

/// Opening of an array of objects.
static ARRAY_OF_OBJECTS_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\{").expect("valid regex"));

/// Widest bracket-delimited span.
static LOOSE_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

/// A single extraction attempt.
pub type Strategy = fn(&ContentPayload) -> Option<Vec<ProductRecord>>;

/// The strategy chain in evaluation order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct", direct_pass_through as Strategy),
    ("tight", tight_array_match as Strategy),
    ("loose", loose_array_match as Strategy),
];

/// Run the strategy chain over `payload`.
///
/// Always returns a non-empty [`ResultSet`]: when nothing can be extracted
/// the set holds a single "no products found" placeholder for `query`.
pub fn extract(payload: &ContentPayload, query: &Query) -> ResultSet {
    try_extract(payload).unwrap_or_else(|| {
        tracing::warn!(kind = payload.kind(), "no products located in content payload");
        placeholder::no_results(query)
    })
}

/// Run the strategy chain without the placeholder fallback.
pub fn try_extract(payload: &ContentPayload) -> Option<ResultSet> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let mut records = strategy(payload)?;
        records.truncate(MAX_RECORDS);
        tracing::debug!(strategy = name, count = records.len(), "extraction strategy matched");
        ResultSet::new(records)
    })
}

/// Strategy 1: map a structured array directly.
pub fn direct_pass_through(payload: &ContentPayload) -> Option<Vec<ProductRecord>> {
    let ContentPayload::StructuredArray(items) = payload else {
        return None;
    };
    non_empty(items.iter().filter_map(record_from_object).collect())
}

/// Strategy 2: leftmost `[{` opening that parses as a complete array.
///
/// The parser consumes exactly one JSON value from the opening, so the
/// array ends at its matching bracket and trailing prose is ignored.
pub fn tight_array_match(payload: &ContentPayload) -> Option<Vec<ProductRecord>> {
    let text = payload_text(payload)?;
    ARRAY_OF_OBJECTS_START.find_iter(&text).find_map(|opening| {
        let mut stream =
            serde_json::Deserializer::from_str(&text[opening.start()..]).into_iter::<Vec<Value>>();
        match stream.next()? {
            Ok(values) => records_from_values(&values),
            Err(e) => {
                tracing::trace!(error = %e, start = opening.start(), "tight candidate rejected");
                None
            }
        }
    })
}

/// Strategy 3: widest array span, sanitised, then parsed.
pub fn loose_array_match(payload: &ContentPayload) -> Option<Vec<ProductRecord>> {
    let text = payload_text(payload)?;
    let span = LOOSE_ARRAY.find(&text)?;
    let cleaned = sanitize(span.as_str());
    match serde_json::from_str::<Vec<Value>>(&cleaned) {
        Ok(values) => records_from_values(&values),
        Err(e) => {
            tracing::trace!(error = %e, "loose candidate rejected");
            None
        }
    }
}

/// Text the regex strategies search: raw strings as-is, opaque objects as JSON.
fn payload_text(payload: &ContentPayload) -> Option<std::borrow::Cow<'_, str>> {
    match payload {
        ContentPayload::RawString(text) => Some(std::borrow::Cow::Borrowed(text.as_str())),
        ContentPayload::OtherObject(value) => serde_json::to_string(value)
            .ok()
            .map(std::borrow::Cow::Owned),
        ContentPayload::Missing | ContentPayload::StructuredArray(_) => None,
    }
}

fn records_from_values(values: &[Value]) -> Option<Vec<ProductRecord>> {
    non_empty(
        values
            .iter()
            .filter_map(Value::as_object)
            .filter_map(record_from_object)
            .collect(),
    )
}

fn non_empty(records: Vec<ProductRecord>) -> Option<Vec<ProductRecord>> {
    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

/// Map one JSON object to a record, filling absent fields.
///
/// Returns `None` when the object has no usable product name.
pub fn record_from_object(object: &Map<String, Value>) -> Option<ProductRecord> {
    let product = field(object, "Product", &[])?;
    let price = field(object, "Price", &[]).unwrap_or_else(|| NOT_AVAILABLE.to_owned());
    let store = field(object, "Store", &[]).unwrap_or_else(|| NOT_AVAILABLE.to_owned());
    let url = field(object, "URL", &["link"]).unwrap_or_else(|| NO_LINK.to_owned());
    Some(ProductRecord {
        product,
        price,
        store,
        url,
    })
}

/// Look up `key` exactly, then case-insensitively along with `aliases`.
///
/// An exact key holding no usable text does not hide a differently cased
/// sibling.
fn field(object: &Map<String, Value>, key: &str, aliases: &[&str]) -> Option<String> {
    object.get(key).and_then(value_text).or_else(|| {
        object
            .iter()
            .filter(|(k, _)| {
                k.eq_ignore_ascii_case(key)
                    || aliases.iter().any(|alias| k.eq_ignore_ascii_case(alias))
            })
            .find_map(|(_, v)| value_text(v))
    })
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
