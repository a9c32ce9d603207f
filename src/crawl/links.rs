//! Hyperlink extraction from directory-listing pages
//!
//! `scraper`'s parse tree is `!Send`, so extraction stays synchronous and the
//! tree never lives across an await point in the callers.

use std::sync::LazyLock;

use scraper::{Html, Selector};

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// One `<a href>` entry from a listing page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// The anchor text, whitespace-trimmed.
    pub text: String,
    /// The raw link target, usually relative on directory listings.
    pub href: String,
}

impl LinkEntry {
    /// Directory targets end with a slash on CDS-style listings.
    pub fn is_directory(&self) -> bool {
        self.href.ends_with('/')
    }

    /// The `../` self-reference back to the parent listing.
    pub fn is_parent(&self) -> bool {
        self.href == "../" || self.href == ".."
    }

    /// The final path segment of the target, e.g. the bare file name.
    pub fn base_name(&self) -> &str {
        self.href
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.href)
    }
}

/// Extract every hyperlink from an HTML page body, preserving document order.
///
/// Level selection relies on first-match-wins, so order matters here.
pub fn extract_links(body: &str) -> Vec<LinkEntry> {
    let document = Html::parse_document(body);
    document
        .select(&ANCHOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            Some(LinkEntry {
                text: anchor.text().collect::<String>().trim().to_string(),
                href: href.to_string(),
            })
        })
        .collect()
}

/// Resolve a listing link target against the page it came from.
///
/// Directory listings emit relative children, which append to the page URL;
/// absolute targets pass through untouched.
pub fn join_url(page_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if page_url.ends_with('/') {
        format!("{page_url}{href}")
    } else {
        format!("{page_url}/{href}")
    }
}
