use std::time::Duration;

use serde::Deserialize;

use crate::crawl::{ArtifactPredicate, CrawlConfig, LevelSelector};

// =============================================================================
// Mirror defaults
// =============================================================================

/// The public CDS mirror for VMware Workstation releases.
pub const DEFAULT_MIRROR_URL: &str = "https://softwareupdate.vmware.com/cds/vmw-desktop/ws/";

/// Token identifying the platform directory at the platform level.
pub const DEFAULT_PLATFORM_TOKEN: &str = "windows";

/// Token identifying the category directory at the category level.
pub const DEFAULT_CATEGORY_TOKEN: &str = "core";

/// Installer archives on the mirror carry this compound suffix.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".exe.tar";

// =============================================================================
// Crawl defaults
// =============================================================================

/// Branches traversed at once unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Overall crawl deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// How many of the newest installers the CLI shows by default.
pub const DEFAULT_LATEST_COUNT: usize = 6;

/// Crawl settings, loadable from a JSON settings file.
///
/// Every field is optional; missing fields take the mirror defaults above.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CrawlSettings {
    /// Root listing URL to crawl.
    pub mirror: String,
    /// Platform-level directory token.
    pub platform_token: String,
    /// Category-level directory token.
    pub category_token: String,
    /// Required artifact file-name suffix.
    pub artifact_suffix: String,
    /// Maximum concurrently traversed branches.
    pub concurrency: usize,
    /// Overall crawl deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            mirror: DEFAULT_MIRROR_URL.to_string(),
            platform_token: DEFAULT_PLATFORM_TOKEN.to_string(),
            category_token: DEFAULT_CATEGORY_TOKEN.to_string(),
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CrawlSettings {
    /// Build the runtime crawl configuration: the fixed level sequence
    /// (sub-release → platform → category) with these tokens.
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            root_url: self.mirror.clone(),
            levels: vec![
                LevelSelector::FirstSubdirectory,
                LevelSelector::TextContains(self.platform_token.clone()),
                LevelSelector::TextContains(self.category_token.clone()),
            ],
            artifact: ArtifactPredicate::Suffix(self.artifact_suffix.clone()),
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
