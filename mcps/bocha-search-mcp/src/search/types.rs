//! Request and response types for the Bocha web search API
//!
//! The provider speaks the nested `data.webPages.value[]` shape. Wire types
//! stay private to this module; callers only see [`SearchResponse`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::SearchError;

/// Longest query (in characters) sent to the provider
pub const MAX_QUERY_CHARS: usize = 1000;
/// Smallest number of results that can be requested
pub const MIN_COUNT: u32 = 1;
/// Largest number of results that can be requested
pub const MAX_COUNT: u32 = 50;
/// Number of results requested when the caller does not say
pub const DEFAULT_COUNT: u32 = 10;

/// Time window used to filter search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Freshness {
    #[default]
    NoLimit,
    Day,
    Week,
    Month,
    OneYear,
}

impl Freshness {
    pub const ALL: [Freshness; 5] = [
        Freshness::NoLimit,
        Freshness::Day,
        Freshness::Week,
        Freshness::Month,
        Freshness::OneYear,
    ];

    /// The wire name of this freshness value
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::NoLimit => "noLimit",
            Freshness::Day => "day",
            Freshness::Week => "week",
            Freshness::Month => "month",
            Freshness::OneYear => "oneYear",
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Freshness {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Freshness::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                SearchError::InvalidArgument(format!(
                    "invalid freshness value: {:?}, must be one of: noLimit, day, week, month, oneYear",
                    s
                ))
            })
    }
}

/// Clamp a requested result count into `[MIN_COUNT, MAX_COUNT]`
pub fn clamp_count(count: i64) -> u32 {
    count.clamp(MIN_COUNT as i64, MAX_COUNT as i64) as u32
}

/// Cut a query down to at most `MAX_QUERY_CHARS` characters
pub fn truncate_query(query: &str) -> &str {
    match query.char_indices().nth(MAX_QUERY_CHARS) {
        Some((idx, _)) => &query[..idx],
        None => query,
    }
}

/// Unvalidated search arguments as handed to a [`SearchService`](super::SearchService)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Wire name of the freshness window; empty means no limit
    pub freshness: String,
    pub count: i64,
    pub summary: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            freshness: String::new(),
            count: DEFAULT_COUNT as i64,
            summary: false,
        }
    }

    pub fn freshness(mut self, freshness: impl Into<String>) -> Self {
        self.freshness = freshness.into();
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }
}

/// A validated query, ready to be put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub freshness: Freshness,
    pub count: u32,
    pub summary: bool,
}

impl TryFrom<SearchRequest> for SearchQuery {
    type Error = SearchError;

    fn try_from(request: SearchRequest) -> Result<Self, Self::Error> {
        if request.query.is_empty() {
            return Err(SearchError::InvalidArgument(
                "search query cannot be empty".to_string(),
            ));
        }

        let freshness = if request.freshness.is_empty() {
            Freshness::NoLimit
        } else {
            request.freshness.parse()?
        };

        Ok(Self {
            query: truncate_query(&request.query).to_string(),
            freshness,
            count: clamp_count(request.count),
            summary: request.summary,
        })
    }
}

/// A single web page hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub date_published: Option<String>,
    pub site_name: Option<String>,
    pub site_icon: Option<String>,
    pub thumbnail: Option<String>,
}

/// A single image hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    pub content_url: String,
    pub thumbnail_url: String,
    pub host_page_url: String,
    pub width: u32,
    pub height: u32,
}

/// Parsed provider response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub images: Vec<ImageResult>,
    pub summary: Option<String>,
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub query: &'a str,
    pub freshness: Freshness,
    pub count: u32,
    pub summary: bool,
    pub stream: bool,
}

impl<'a> From<&'a SearchQuery> for WireRequest<'a> {
    fn from(query: &'a SearchQuery) -> Self {
        Self {
            query: &query.query,
            freshness: query.freshness,
            count: query.count,
            summary: query.summary,
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    data: Option<WireData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireData {
    #[serde(default)]
    web_pages: Option<WirePages>,
    #[serde(default)]
    images: Option<WireImages>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePages {
    #[serde(default)]
    value: Option<Vec<WirePage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    site_name: Option<String>,
    #[serde(default)]
    site_icon: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    date_published: Option<String>,
    #[serde(default)]
    date_last_crawled: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireImages {
    #[serde(default)]
    value: Option<Vec<WireImage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireImage {
    #[serde(default)]
    content_url: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    host_page_url: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<WirePage> for SearchResult {
    fn from(page: WirePage) -> Self {
        // The generated summary is richer than the snippet when the provider sends one
        let description = non_empty(page.summary)
            .or(non_empty(page.snippet))
            .or(non_empty(page.description))
            .unwrap_or_default();

        Self {
            title: non_empty(page.name)
                .or(non_empty(page.title))
                .unwrap_or_default(),
            url: page.url.unwrap_or_default(),
            description,
            date_published: non_empty(page.date_published).or(non_empty(page.date_last_crawled)),
            site_name: non_empty(page.site_name),
            site_icon: non_empty(page.site_icon),
            thumbnail: non_empty(page.thumbnail_url),
        }
    }
}

impl From<WireImage> for ImageResult {
    fn from(image: WireImage) -> Self {
        Self {
            content_url: image.content_url.unwrap_or_default(),
            thumbnail_url: image.thumbnail_url.unwrap_or_default(),
            host_page_url: image.host_page_url.unwrap_or_default(),
            width: image.width.unwrap_or_default(),
            height: image.height.unwrap_or_default(),
        }
    }
}

impl WireResponse {
    /// Convert into a [`SearchResponse`], failing when the result list is absent
    pub(crate) fn into_response(self) -> Result<SearchResponse, SearchError> {
        let data = self.data.ok_or(SearchError::EmptyResponse)?;
        let pages = data
            .web_pages
            .and_then(|p| p.value)
            .ok_or(SearchError::EmptyResponse)?;

        let images = data
            .images
            .and_then(|i| i.value)
            .unwrap_or_default()
            .into_iter()
            .map(ImageResult::from)
            .collect();

        Ok(SearchResponse {
            results: pages.into_iter().map(SearchResult::from).collect(),
            images,
            summary: non_empty(data.summary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_count_bounds() {
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(-7), 1);
        assert_eq!(clamp_count(1), 1);
        assert_eq!(clamp_count(10), 10);
        assert_eq!(clamp_count(50), 50);
        assert_eq!(clamp_count(51), 50);
        assert_eq!(clamp_count(i64::MAX), 50);
    }

    #[test]
    fn test_truncate_query_keeps_prefix() {
        let long = "q".repeat(1500);
        let truncated = truncate_query(&long);
        assert_eq!(truncated.chars().count(), MAX_QUERY_CHARS);
        assert!(long.starts_with(truncated));

        assert_eq!(truncate_query("short"), "short");
    }

    #[test]
    fn test_truncate_query_counts_characters_not_bytes() {
        let long = "é".repeat(1200);
        let truncated = truncate_query(&long);
        assert_eq!(truncated.chars().count(), MAX_QUERY_CHARS);
        assert_eq!(truncated.len(), MAX_QUERY_CHARS * 2);
    }

    #[test]
    fn test_freshness_parse() {
        for f in Freshness::ALL {
            assert_eq!(f.as_str().parse::<Freshness>().unwrap(), f);
        }
        let err = "yesterday".parse::<Freshness>().unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_freshness_serializes_camel_case() {
        assert_eq!(serde_json::to_value(Freshness::OneYear).unwrap(), json!("oneYear"));
        assert_eq!(serde_json::to_value(Freshness::NoLimit).unwrap(), json!("noLimit"));
    }

    #[test]
    fn test_query_validation() {
        let err = SearchQuery::try_from(SearchRequest::new("")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));

        let query = SearchQuery::try_from(SearchRequest::new("rust").count(0)).unwrap();
        assert_eq!(query.freshness, Freshness::NoLimit);
        assert_eq!(query.count, 1);

        let query =
            SearchQuery::try_from(SearchRequest::new("rust").freshness("week").count(99)).unwrap();
        assert_eq!(query.freshness, Freshness::Week);
        assert_eq!(query.count, 50);

        let err =
            SearchQuery::try_from(SearchRequest::new("rust").freshness("decade")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_wire_request_disables_streaming() {
        let query = SearchQuery::try_from(SearchRequest::new("rust").summary(true)).unwrap();
        let body = serde_json::to_value(WireRequest::from(&query)).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "rust",
                "freshness": "noLimit",
                "count": 10,
                "summary": true,
                "stream": false
            })
        );
    }

    #[test]
    fn test_wire_response_conversion() {
        let wire: WireResponse = serde_json::from_value(json!({
            "code": 200,
            "data": {
                "summary": "Overall answer",
                "webPages": {
                    "value": [{
                        "name": "Rust",
                        "url": "https://www.rust-lang.org",
                        "snippet": "A language",
                        "siteName": "rust-lang.org",
                        "siteIcon": null,
                        "dateLastCrawled": "2024-07-22T00:00:00Z"
                    }]
                },
                "images": {
                    "value": [{
                        "contentUrl": "https://img/x.png",
                        "thumbnailUrl": "https://img/x_t.png",
                        "hostPageUrl": "https://host",
                        "width": 640,
                        "height": 480
                    }]
                }
            }
        }))
        .unwrap();

        let response = wire.into_response().unwrap();
        assert_eq!(response.summary.as_deref(), Some("Overall answer"));
        assert_eq!(response.results.len(), 1);
        let first = &response.results[0];
        assert_eq!(first.title, "Rust");
        assert_eq!(first.description, "A language");
        assert_eq!(first.site_icon, None);
        assert_eq!(first.date_published.as_deref(), Some("2024-07-22T00:00:00Z"));
        assert_eq!(response.images[0].width, 640);
    }

    #[test]
    fn test_wire_response_prefers_page_summary() {
        let wire: WireResponse = serde_json::from_value(json!({
            "data": {"webPages": {"value": [{
                "name": "A", "url": "https://a", "snippet": "short", "summary": "long form"
            }]}}
        }))
        .unwrap();
        let response = wire.into_response().unwrap();
        assert_eq!(response.results[0].description, "long form");
    }

    #[test]
    fn test_wire_page_with_name_and_title_decodes() {
        let wire: WireResponse = serde_json::from_value(json!({
            "data": {"webPages": {"value": [
                {
                    "name": "From name", "title": "From title", "url": "https://a",
                    "snippet": "From snippet", "description": "From description",
                    "thumbnailUrl": "https://a/t.jpg"
                },
                {"title": "Only title", "url": "https://b", "description": "Only description"}
            ]}}
        }))
        .unwrap();

        let response = wire.into_response().unwrap();
        assert_eq!(response.results[0].title, "From name");
        assert_eq!(response.results[0].description, "From snippet");
        assert_eq!(response.results[0].thumbnail.as_deref(), Some("https://a/t.jpg"));
        assert_eq!(response.results[1].title, "Only title");
        assert_eq!(response.results[1].description, "Only description");
    }

    #[test]
    fn test_empty_list_is_not_an_error() {
        let wire: WireResponse =
            serde_json::from_value(json!({"data": {"webPages": {"value": []}}})).unwrap();
        let response = wire.into_response().unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_missing_list_is_empty_response() {
        for body in [
            json!({}),
            json!({"data": {}}),
            json!({"data": {"webPages": {}}}),
            json!({"data": {"webPages": {"value": null}}}),
        ] {
            let wire: WireResponse = serde_json::from_value(body).unwrap();
            assert!(matches!(wire.into_response(), Err(SearchError::EmptyResponse)));
        }
    }
}
