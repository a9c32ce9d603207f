//! Directory-listing crawl engine
//!
//! The mirror exposes no index API, only HTML directory listings, so
//! discovery is a fixed-depth walk of the listing tree: the root enumerates
//! version directories, and each version branch descends sub-release →
//! platform → category before collecting installer file names.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   one per branch   ┌──────────────┐
//! │ Orchestrator │───────────────────▶│  Traversal   │
//! │ (fan-out)    │◀───────────────────│ (fixed depth)│
//! └──────────────┘  BranchOutcome     └──────────────┘
//!        │                                   │
//!        ▼                                   ▼
//! ┌──────────────┐                    ┌──────────────┐
//! │ PageFetcher  │                    │ LevelSelector│
//! │ (HTTP)       │                    │ + links      │
//! └──────────────┘                    └──────────────┘
//! ```
//!
//! Branches run concurrently under a configurable bound and fail soft: a
//! missing page or an unmatched level empties that branch only. A transport
//! fault aborts the whole crawl, since no branch could succeed.
//!
//! # Modules
//!
//! - [`fetcher`]: page-fetching trait and the `reqwest` implementation
//! - [`links`]: hyperlink extraction and URL joining
//! - [`level`]: per-level selection rules and the artifact predicate
//! - [`traversal`]: the single-branch fixed-depth walk
//! - [`orchestrator`]: concurrent fan-out, deadline, aggregation
//! - [`error`]: fetch and crawl error types

pub mod error;
pub mod fetcher;
pub mod level;
pub mod links;
pub mod orchestrator;
pub mod traversal;

pub use error::{CrawlError, FetchError};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use level::{ArtifactPredicate, LevelSelector};
pub use links::LinkEntry;
pub use orchestrator::{CrawlConfig, CrawlResult, crawl};
pub use traversal::{BranchOutcome, UnavailableReason};
