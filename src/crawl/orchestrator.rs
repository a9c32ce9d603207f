//! Concurrent fan-out across version branches
//!
//! One traversal per top-level version directory, bounded by the configured
//! concurrency. Each branch returns its own local artifact list; merging
//! happens here, sequentially, as branches settle, so no collection is ever
//! written from two branches at once.

use std::time::Duration;

use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::crawl::error::CrawlError;
use crate::crawl::fetcher::PageFetcher;
use crate::crawl::level::{ArtifactPredicate, LevelSelector};
use crate::crawl::links::{extract_links, join_url};
use crate::crawl::traversal::{BranchOutcome, traverse_branch};
use crate::version::{latest_n, sort_by_version};

/// Everything one crawl invocation needs.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Root listing whose sub-directories are the version branches.
    pub root_url: String,
    /// Selection rule for each level below a version directory, in descent
    /// order. The page below the last selector is the terminal level.
    pub levels: Vec<LevelSelector>,
    /// Which terminal-level links count as artifacts.
    pub artifact: ArtifactPredicate,
    /// Maximum branches traversed at once.
    pub concurrency: usize,
    /// Overall deadline; branches still outstanding when it elapses are
    /// abandoned.
    pub timeout: Duration,
}

/// The sorted artifact names produced by one crawl.
///
/// Immutable once produced; ascending version order (see [`crate::version`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    artifacts: Vec<String>,
}

impl CrawlResult {
    fn new(artifacts: Vec<String>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &[String] {
        &self.artifacts
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// The `n` newest artifacts, ascending. The whole list when `n` covers it.
    pub fn latest(&self, n: usize) -> Vec<String> {
        latest_n(&self.artifacts, n)
    }

    pub fn into_names(self) -> Vec<String> {
        self.artifacts
    }
}

/// Crawl the whole mirror tree and return every artifact in version order.
///
/// An absent root listing yields an empty result, matching the policy that
/// discovery failures are non-fatal. Per-branch failures degrade to a smaller
/// result. Only two conditions escalate: a transport fault, and a deadline
/// that elapsed before any branch settled.
pub async fn crawl<F>(fetcher: &F, config: &CrawlConfig) -> Result<CrawlResult, CrawlError>
where
    F: PageFetcher + ?Sized,
{
    let Some(body) = fetcher.fetch(&config.root_url).await? else {
        info!("Root listing {} absent; nothing to discover", config.root_url);
        return Ok(CrawlResult::default());
    };

    let branches: Vec<String> = extract_links(&body)
        .iter()
        .filter(|link| link.is_directory() && !link.is_parent())
        .map(|link| join_url(&config.root_url, &link.href))
        .collect();
    info!("Discovered {} version branch(es)", branches.len());

    let concurrency = config.concurrency.max(1);
    let mut outcomes = stream::iter(branches.into_iter().map(|branch_url| async move {
        traverse_branch(fetcher, &branch_url, &config.levels, &config.artifact).await
    }))
    .buffer_unordered(concurrency);

    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);

    let mut names: Vec<String> = Vec::new();
    let mut settled = 0usize;
    loop {
        tokio::select! {
            // Drain outcomes before honoring the deadline: a branch that
            // settled by the time the deadline fires is a completed branch.
            biased;

            outcome = outcomes.next() => match outcome {
                Some(Ok(BranchOutcome::Artifacts(found))) => {
                    settled += 1;
                    names.extend(found);
                }
                Some(Ok(BranchOutcome::Unavailable { depth, reason })) => {
                    settled += 1;
                    debug!("Branch skipped at depth {}: {:?}", depth, reason);
                }
                Some(Err(e)) => return Err(CrawlError::Transport(e)),
                None => break,
            },
            _ = &mut deadline => {
                if settled == 0 {
                    return Err(CrawlError::DeadlineElapsed);
                }
                warn!(
                    "Crawl deadline elapsed after {} settled branch(es); abandoning the rest",
                    settled
                );
                break;
            }
        }
    }

    sort_by_version(&mut names);
    info!("Crawl finished with {} artifact(s)", names.len());
    Ok(CrawlResult::new(names))
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::crawl::error::FetchError;

    /// In-memory mirror: URL -> page body. Unknown URLs are absent pages;
    /// URLs in `hang` never resolve; URLs in `delay` resolve after the
    /// given duration.
    #[derive(Default)]
    struct FakeMirror {
        pages: HashMap<String, String>,
        hang: HashSet<String>,
        delay: HashMap<String, Duration>,
    }

    impl FakeMirror {
        fn page(mut self, url: &str, links: &[&str]) -> Self {
            let body: String = links
                .iter()
                .map(|href| format!("<a href=\"{href}\">{href}</a>"))
                .collect();
            self.pages.insert(url.to_string(), body);
            self
        }

        fn hanging(mut self, url: &str) -> Self {
            self.hang.insert(url.to_string());
            self
        }

        fn delayed(mut self, url: &str, delay: Duration) -> Self {
            self.delay.insert(url.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakeMirror {
        async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
            if self.hang.contains(url) {
                futures::future::pending::<()>().await;
            }
            if let Some(delay) = self.delay.get(url) {
                tokio::time::sleep(*delay).await;
            }
            Ok(self.pages.get(url).cloned())
        }
    }

    const ROOT: &str = "https://m.test/ws/";

    fn config() -> CrawlConfig {
        CrawlConfig {
            root_url: ROOT.to_string(),
            levels: vec![
                LevelSelector::FirstSubdirectory,
                LevelSelector::TextContains("windows".to_string()),
                LevelSelector::TextContains("core".to_string()),
            ],
            artifact: ArtifactPredicate::Suffix(".exe.tar".to_string()),
            concurrency: 4,
            timeout: Duration::from_secs(30),
        }
    }

    /// A complete branch from version directory to core listing.
    fn full_branch(mirror: FakeMirror, version: &str, build: &str, installer: &str) -> FakeMirror {
        let v = format!("{ROOT}{version}/");
        let b = format!("{v}{build}/");
        let w = format!("{b}windows/");
        let c = format!("{w}core/");
        mirror
            .page(&v, &["../", &format!("{build}/")])
            .page(&b, &["../", "windows/"])
            .page(&w, &["../", "core/"])
            .page(&c, &["../", installer])
    }

    #[tokio::test]
    async fn crawl_returns_empty_result_when_root_absent() {
        let mirror = FakeMirror::default();

        let result = crawl(&mirror, &config()).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn crawl_aggregates_and_sorts_across_branches() {
        let mirror = FakeMirror::default().page(ROOT, &["../", "17.0.0/", "16.2.4/"]);
        let mirror = full_branch(
            mirror,
            "17.0.0",
            "20800274",
            "VMware-workstation-17.0.0-20800274.exe.tar",
        );
        let mirror = full_branch(
            mirror,
            "16.2.4",
            "22231967",
            "VMware-workstation-16.2.4-22231967.exe.tar",
        );

        let result = crawl(&mirror, &config()).await.unwrap();

        assert_eq!(
            result.artifacts(),
            &[
                "VMware-workstation-16.2.4-22231967.exe.tar".to_string(),
                "VMware-workstation-17.0.0-20800274.exe.tar".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn crawl_keeps_sole_surviving_branch_when_siblings_fail() {
        // Five branches; only 17.0.0 is complete. The others are absent or
        // stop matching at some level.
        let mirror = FakeMirror::default()
            .page(ROOT, &["../", "14.0.0/", "15.0.0/", "16.0.0/", "17.0.0/", "18.0.0/"])
            // 14.0.0: version page absent (not added at all).
            // 15.0.0: no sub-directory below the version page.
            .page(&format!("{ROOT}15.0.0/"), &["../", "README.txt"])
            // 16.0.0: no windows directory.
            .page(&format!("{ROOT}16.0.0/"), &["../", "18000000/"])
            .page(&format!("{ROOT}16.0.0/18000000/"), &["../", "linux/"])
            // 18.0.0: core listing absent.
            .page(&format!("{ROOT}18.0.0/"), &["../", "23000000/"])
            .page(&format!("{ROOT}18.0.0/23000000/"), &["../", "windows/"])
            .page(&format!("{ROOT}18.0.0/23000000/windows/"), &["../", "core/"]);
        let mirror = full_branch(
            mirror,
            "17.0.0",
            "20800274",
            "VMware-workstation-17.0.0-20800274.exe.tar",
        );

        let result = crawl(&mirror, &config()).await.unwrap();

        assert_eq!(
            result.artifacts(),
            &["VMware-workstation-17.0.0-20800274.exe.tar".to_string()]
        );
    }

    /// Fetcher that records the peak number of concurrently outstanding
    /// calls.
    struct CountingFetcher {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
            if url == ROOT {
                return Ok(Some(
                    "<a href=\"1/\">1/</a><a href=\"2/\">2/</a><a href=\"3/\">3/</a>\
                     <a href=\"4/\">4/</a><a href=\"5/\">5/</a>"
                        .to_string(),
                ));
            }
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(format!("<a href=\"artifact-{now}.exe.tar\">a</a>")))
        }
    }

    #[tokio::test]
    async fn crawl_respects_concurrency_bound() {
        let fetcher = CountingFetcher {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        // No intermediate levels: each branch is a single terminal fetch, so
        // outstanding fetches equal outstanding branches.
        let config = CrawlConfig {
            levels: vec![],
            concurrency: 2,
            ..config()
        };

        let result = crawl(&fetcher, &config).await.unwrap();

        assert_eq!(result.len(), 5);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn crawl_abandons_outstanding_branches_at_deadline() {
        let mirror = FakeMirror::default()
            .page(ROOT, &["../", "17.0.0/", "99.0.0/"])
            .hanging(&format!("{ROOT}99.0.0/"));
        let mirror = full_branch(
            mirror,
            "17.0.0",
            "20800274",
            "VMware-workstation-17.0.0-20800274.exe.tar",
        );
        let config = CrawlConfig {
            timeout: Duration::from_secs(5),
            ..config()
        };

        let result = crawl(&mirror, &config).await.unwrap();

        assert_eq!(
            result.artifacts(),
            &["VMware-workstation-17.0.0-20800274.exe.tar".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn crawl_keeps_branch_that_settles_exactly_at_deadline() {
        // The branch's only fetch and the deadline become ready at the same
        // instant; the settled outcome must win over the deadline.
        let branch = format!("{ROOT}17.0.0/");
        let mirror = FakeMirror::default()
            .page(ROOT, &["../", "17.0.0/"])
            .page(&branch, &["../", "VMware-workstation-17.0.0-20800274.exe.tar"])
            .delayed(&branch, Duration::from_secs(5));
        let config = CrawlConfig {
            levels: vec![],
            timeout: Duration::from_secs(5),
            ..config()
        };

        let result = crawl(&mirror, &config).await.unwrap();

        assert_eq!(
            result.artifacts(),
            &["VMware-workstation-17.0.0-20800274.exe.tar".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn crawl_errors_when_deadline_leaves_nothing_settled() {
        let mirror = FakeMirror::default()
            .page(ROOT, &["../", "17.0.0/"])
            .hanging(&format!("{ROOT}17.0.0/"));
        let config = CrawlConfig {
            timeout: Duration::from_secs(5),
            ..config()
        };

        let result = crawl(&mirror, &config).await;

        assert!(matches!(result, Err(CrawlError::DeadlineElapsed)));
    }

    #[tokio::test]
    async fn crawl_with_no_branches_is_empty_discovery() {
        let mirror = FakeMirror::default().page(ROOT, &["../", "README.txt"]);

        let result = crawl(&mirror, &config()).await.unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn latest_returns_tail_of_sorted_artifacts() {
        let result = CrawlResult::new(vec![
            "a-1.0.0".to_string(),
            "a-2.0.0".to_string(),
            "a-3.0.0".to_string(),
        ]);

        assert_eq!(result.latest(2), &["a-2.0.0".to_string(), "a-3.0.0".to_string()]);
        assert_eq!(result.latest(10).len(), 3);
    }

    #[test]
    fn latest_keeps_discovery_order_on_equal_keys() {
        // Identical version keys; the comparator's stable tie-break applies
        // through CrawlResult::latest too.
        let result = CrawlResult::new(vec![
            "pkg-1.0.0-beta".to_string(),
            "pkg-1.0.0-alpha".to_string(),
        ]);

        assert_eq!(
            result.latest(2),
            &["pkg-1.0.0-beta".to_string(), "pkg-1.0.0-alpha".to_string()]
        );
    }
}
