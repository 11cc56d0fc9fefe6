//! Placeholder records: failures and empty results carried through the
//! same schema as real products.

use crate::error::BackendError;
use crate::types::{ProductRecord, Query, ResultSet, NOT_AVAILABLE, NO_LINK};

/// Guidance shown when the caller sent a blank query.
pub const EMPTY_QUERY_TEXT: &str = "Please enter a search query";

fn record(product: String, store: impl Into<String>) -> ResultSet {
    ResultSet::single(ProductRecord::new(product, NOT_AVAILABLE, store, NO_LINK))
}

/// Guidance record for a blank query.
pub fn empty_query() -> ResultSet {
    record(EMPTY_QUERY_TEXT.to_owned(), NOT_AVAILABLE)
}

/// No products could be located in the backend's answer.
pub fn no_results(query: &Query) -> ResultSet {
    record(
        format!("No products found for: {query}"),
        "Try a more specific product name or check the spelling.",
    )
}

/// Map a backend failure to the placeholder the caller sees.
pub fn for_backend_error(query: &Query, error: &BackendError) -> ResultSet {
    match error {
        BackendError::Timeout(_) => record(
            format!("Search timed out for: {query}"),
            "The product service took too long to respond. Please try again.",
        ),
        BackendError::Transport(_) | BackendError::HttpStatus { .. } | BackendError::Config(_) => {
            record(
                format!("Search error for: {query}"),
                "Unable to reach the product service. Please try again later.",
            )
        }
        BackendError::MalformedEnvelope(_) => record(
            format!("Search error for: {query}"),
            "The product service returned an unexpected response.",
        ),
        BackendError::Application(message) => record(
            format!("Search error for: {query}"),
            format!("The product service reported an error: {message}"),
        ),
    }
}
