//! Parameter types for the search tool
//!
//! Hosts are free to send anything, so every field arrives as raw JSON and
//! is checked one by one before a [`SearchRequest`] is built.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::search::types::{clamp_count, DEFAULT_COUNT, MAX_QUERY_CHARS};
use crate::search::{Freshness, SearchRequest};

#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    #[schemars(with = "String", description = "The search query")]
    pub query: Option<Value>,

    #[schemars(
        with = "Option<Freshness>",
        description = "Filter results by freshness (noLimit, day, week, month, oneYear)"
    )]
    pub freshness: Option<Value>,

    #[schemars(
        with = "Option<u32>",
        description = "Number of results to return (1-50, default: 10)"
    )]
    pub count: Option<Value>,

    #[schemars(
        with = "Option<bool>",
        description = "Whether to generate a summary based on search results"
    )]
    pub summary: Option<Value>,

    /// Older hosts send the summary flag under this name
    #[schemars(skip)]
    pub answer: Option<Value>,
}

impl SearchParams {
    /// Validate the raw arguments, producing either a request or a message
    /// for an error-flagged tool result
    pub fn into_request(self) -> Result<SearchRequest, String> {
        let query = match self.query {
            Some(Value::String(q)) if !q.is_empty() => q,
            _ => return Err("query parameter is required and must be a non-empty string".to_string()),
        };

        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(format!(
                "query is too long (maximum {} characters)",
                MAX_QUERY_CHARS
            ));
        }

        let freshness = match self.freshness {
            None | Some(Value::Null) => Freshness::NoLimit,
            Some(Value::String(f)) if f.is_empty() => Freshness::NoLimit,
            Some(Value::String(f)) => f.parse::<Freshness>().map_err(|_| {
                format!(
                    "invalid freshness value: {:?}, must be one of: noLimit, day, week, month, oneYear",
                    f
                )
            })?,
            Some(other) => {
                return Err(format!(
                    "invalid freshness value: {}, must be one of: noLimit, day, week, month, oneYear",
                    other
                ))
            }
        };

        // Non-numeric counts fall back to the default
        let count = match self.count.as_ref().and_then(Value::as_f64) {
            Some(c) => clamp_count(c as i64),
            None => DEFAULT_COUNT,
        };

        let summary = self
            .summary
            .as_ref()
            .and_then(Value::as_bool)
            .or_else(|| self.answer.as_ref().and_then(Value::as_bool))
            .unwrap_or(false);

        Ok(SearchRequest::new(query)
            .freshness(freshness.as_str())
            .count(count as i64)
            .summary(summary))
    }
}
