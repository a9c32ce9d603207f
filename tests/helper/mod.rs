//! Fake mirror utilities for integration tests

use mockito::{Server, ServerGuard};

/// A CDS-style mirror backed by a mockito server.
///
/// Pages are registered as HTML directory listings; artifacts as raw file
/// bodies.
pub struct MirrorServer {
    server: ServerGuard,
}

impl MirrorServer {
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    /// The crawl root, `<server>/ws/`.
    pub fn root_url(&self) -> String {
        format!("{}/ws/", self.server.url())
    }

    /// Register a directory listing at `path` (server-relative, e.g.
    /// `/ws/17.0.0/`).
    pub async fn listing(&mut self, path: &str, links: &[&str]) {
        self.server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(listing_html(links))
            .create_async()
            .await;
    }

    /// Register a raw file body at `path`.
    pub async fn file(&mut self, path: &str, bytes: Vec<u8>) {
        self.server
            .mock("GET", path)
            .with_status(200)
            .with_body(bytes)
            .create_async()
            .await;
    }

    /// Register a complete branch from version directory down to the core
    /// listing holding `installer`.
    pub async fn branch(&mut self, version: &str, build: &str, installer: &str) {
        self.listing(&format!("/ws/{version}/"), &["../", &format!("{build}/")])
            .await;
        self.listing(&format!("/ws/{version}/{build}/"), &["../", "windows/"])
            .await;
        self.listing(
            &format!("/ws/{version}/{build}/windows/"),
            &["../", "core/"],
        )
        .await;
        self.listing(
            &format!("/ws/{version}/{build}/windows/core/"),
            &["../", installer, &format!("{installer}.sha256")],
        )
        .await;
    }
}

/// Minimal directory-listing markup, matching what CDS mirrors serve.
pub fn listing_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{href}\">{href}</a>\n"))
        .collect();
    format!("<html><body><h1>Index</h1><pre>\n{anchors}</pre></body></html>")
}
