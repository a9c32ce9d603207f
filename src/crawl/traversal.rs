//! Fixed-depth descent through one version branch
//!
//! A branch walk is strictly sequential: each level's URL comes from the link
//! selected on the previous level, so there is nothing to parallelise inside
//! a branch. Failure at any level abandons the branch quietly; sibling
//! branches are the orchestrator's concern.

use tracing::debug;

use crate::crawl::error::FetchError;
use crate::crawl::fetcher::PageFetcher;
use crate::crawl::level::{ArtifactPredicate, LevelSelector};
use crate::crawl::links::{extract_links, join_url};

/// Why a branch produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The page at this level answered with a non-success status.
    PageAbsent,
    /// The page existed but no link satisfied the level's selection rule.
    NoMatchingLink,
}

/// The result of walking one branch to its terminal level.
///
/// `Unavailable` is the fail-soft outcome: a missing or atypically structured
/// branch contributes no artifacts and no error. Transport faults are the
/// only condition surfaced as `Err`, since they mean no branch can succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    /// Base names of every terminal-level link matching the predicate.
    Artifacts(Vec<String>),
    /// The branch could not be traversed to completion.
    Unavailable {
        /// How many levels below the branch root the walk got (0 = the
        /// branch root page itself).
        depth: usize,
        reason: UnavailableReason,
    },
}

/// Walk one branch from its version directory down to the terminal level.
///
/// `levels` is applied in order, each selecting the single sub-directory to
/// descend into; at the page below the last selector every link matching
/// `artifact` is collected as a base name.
pub async fn traverse_branch<F>(
    fetcher: &F,
    branch_url: &str,
    levels: &[LevelSelector],
    artifact: &ArtifactPredicate,
) -> Result<BranchOutcome, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let mut url = branch_url.to_string();

    for (depth, selector) in levels.iter().enumerate() {
        let Some(body) = fetcher.fetch(&url).await? else {
            debug!("Branch {} unavailable at depth {}: page absent", branch_url, depth);
            return Ok(BranchOutcome::Unavailable {
                depth,
                reason: UnavailableReason::PageAbsent,
            });
        };

        let links = extract_links(&body);
        let Some(selected) = selector.select(&links) else {
            debug!(
                "Branch {} unavailable at depth {}: no link for {}",
                branch_url,
                depth,
                selector.describe()
            );
            return Ok(BranchOutcome::Unavailable {
                depth,
                reason: UnavailableReason::NoMatchingLink,
            });
        };

        url = join_url(&url, &selected.href);
    }

    let terminal_depth = levels.len();
    let Some(body) = fetcher.fetch(&url).await? else {
        debug!(
            "Branch {} unavailable at terminal level: page absent",
            branch_url
        );
        return Ok(BranchOutcome::Unavailable {
            depth: terminal_depth,
            reason: UnavailableReason::PageAbsent,
        });
    };

    let artifacts: Vec<String> = extract_links(&body)
        .iter()
        .filter(|link| artifact.matches(&link.href))
        .map(|link| link.base_name().to_string())
        .collect();

    debug!("Branch {} yielded {} artifact(s)", branch_url, artifacts.len());
    Ok(BranchOutcome::Artifacts(artifacts))
}
