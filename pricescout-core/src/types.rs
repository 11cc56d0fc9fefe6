//! Core types: the validated query, the content payload variants and the
//! product records returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder text used for absent record fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel URL meaning "no link".
pub const NO_LINK: &str = "#";

/// A non-empty, trimmed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trim `raw` and wrap it, or return `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// The trimmed query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The canonical output unit.
///
/// All four fields are always present. Absent data is carried as
/// [`NOT_AVAILABLE`] (or [`NO_LINK`] for `url`), never by omission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product name.
    #[serde(rename = "Product")]
    pub product: String,
    /// Price as free text (currency symbols are kept).
    #[serde(rename = "Price")]
    pub price: String,
    /// Store or vendor name.
    #[serde(rename = "Store")]
    pub store: String,
    /// Link to the offer, or `"#"`.
    #[serde(rename = "URL")]
    pub url: String,
}

impl ProductRecord {
    /// Build a record from its four fields.
    pub fn new(
        product: impl Into<String>,
        price: impl Into<String>,
        store: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            price: price.into(),
            store: store.into(),
            url: url.into(),
        }
    }
}

/// An ordered sequence of product records that is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<ProductRecord>", try_from = "Vec<ProductRecord>")]
pub struct ResultSet(Vec<ProductRecord>);

impl ResultSet {
    /// Wrap `records`, returning `None` if the vector is empty.
    pub fn new(records: Vec<ProductRecord>) -> Option<Self> {
        if records.is_empty() {
            None
        } else {
            Some(Self(records))
        }
    }

    /// A result set holding exactly one record.
    pub fn single(record: ProductRecord) -> Self {
        Self(vec![record])
    }

    /// Borrow the records.
    pub fn records(&self) -> &[ProductRecord] {
        &self.0
    }

    /// Number of records (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Take ownership of the records.
    pub fn into_vec(self) -> Vec<ProductRecord> {
        self.0
    }
}

impl From<ResultSet> for Vec<ProductRecord> {
    fn from(set: ResultSet) -> Self {
        set.0
    }
}

impl TryFrom<Vec<ProductRecord>> for ResultSet {
    type Error = &'static str;

    fn try_from(records: Vec<ProductRecord>) -> Result<Self, Self::Error> {
        Self::new(records).ok_or("result set must contain at least one record")
    }
}

/// The value found in the backend envelope's output slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    /// The output slot is absent or null.
    Missing,
    /// An array whose every element is an object with a `Product` key.
    StructuredArray(Vec<Map<String, Value>>),
    /// Free text, possibly with JSON embedded in it.
    RawString(String),
    /// Anything else; treated as opaque.
    OtherObject(Value),
}

impl ContentPayload {
    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::StructuredArray(_) => "structured_array",
            Self::RawString(_) => "raw_string",
            Self::OtherObject(_) => "other_object",
        }
    }
}
