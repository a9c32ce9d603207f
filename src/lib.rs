//! cds-scout: installer discovery on CDS-style software-update mirrors
//!
//! The mirror is a plain file server exposing HTML directory listings. This
//! crate crawls the listing tree concurrently, orders the discovered
//! installer names by their embedded version numbers, and can download and
//! unpack a chosen installer.
//!
//! The crawl engine in [`crawl`] is generic over root URL, level selectors
//! and artifact predicate; the VMware Workstation defaults live in
//! [`config`].

pub mod config;
pub mod crawl;
pub mod download;
pub mod version;
