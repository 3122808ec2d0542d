//! Text rendering of search responses

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

use crate::search::{Freshness, SearchQuery, SearchResponse};

/// Human-readable label for a freshness window
pub fn format_freshness(freshness: Freshness) -> &'static str {
    match freshness {
        Freshness::Day => "Past 24 hours",
        Freshness::Week => "Past week",
        Freshness::Month => "Past month",
        Freshness::OneYear => "Past year",
        Freshness::NoLimit => "No time limit",
    }
}

/// Reformat a provider date as e.g. `January 2, 2006`
///
/// Strings that do not parse are returned unchanged.
pub fn format_date(date: &str) -> String {
    const LONG_FORM: &str = "%B %-d, %Y";

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return dt.format(LONG_FORM).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%SZ") {
        return dt.format(LONG_FORM).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.format(LONG_FORM).to_string();
    }

    date.to_string()
}

/// Render a response as the text block returned to the host
pub fn render_response(query: &SearchQuery, response: &SearchResponse) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Search Query: \"{}\"", query.query);
    let _ = writeln!(out, "Freshness: {}", format_freshness(query.freshness));
    let _ = writeln!(out, "Results: {}", response.results.len());
    out.push('\n');

    if query.summary {
        if let Some(summary) = &response.summary {
            let _ = writeln!(out, "Summary:\n{}\n", summary);
        }
    }

    out.push_str("Search Results:\n");
    out.push_str("==============\n\n");

    for (i, result) in response.results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, result.title);
        let _ = writeln!(out, "   URL: {}", result.url);

        if let Some(site) = &result.site_name {
            let _ = writeln!(out, "   Site: {}", site);
        }
        if let Some(icon) = &result.site_icon {
            let _ = writeln!(out, "   Favicon: {}", icon);
        }
        if let Some(thumbnail) = &result.thumbnail {
            let _ = writeln!(out, "   Thumbnail: {}", thumbnail);
        }
        if let Some(date) = &result.date_published {
            let _ = writeln!(out, "   Published: {}", format_date(date));
        }
        if !result.description.is_empty() {
            let _ = writeln!(out, "   Description: {}", result.description);
        }

        out.push('\n');
    }

    if !response.images.is_empty() {
        out.push_str("Image Results:\n");
        out.push_str("==============\n\n");

        for (i, image) in response.images.iter().enumerate() {
            let _ = writeln!(out, "{}. Image", i + 1);
            let _ = writeln!(out, "   URL: {}", image.content_url);
            let _ = writeln!(out, "   Thumbnail: {}", image.thumbnail_url);
            let _ = writeln!(out, "   Host Page: {}", image.host_page_url);
            let _ = writeln!(out, "   Dimensions: {}x{}", image.width, image.height);
            out.push('\n');
        }
    }

    out
}
