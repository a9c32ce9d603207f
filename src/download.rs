//! Download and unpack a chosen installer
//!
//! The mirror wraps each Windows installer in a plain tar archive. This
//! module rebuilds the artifact's mirror path from its file name, streams the
//! archive to disk, and unpacks it to reach the inner `.exe`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use futures::StreamExt;
use regex::Regex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::crawl::links::join_url;

/// `VMware-workstation-<major.minor.patch>-<build>.exe.tar`
static INSTALLER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^VMware-workstation-(\d+\.\d+\.\d+)-(\d+)\.exe\.tar$").unwrap()
});

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Unrecognized installer name: {0}")]
    UnrecognizedName(String),

    #[error("No installer executable found in {0}")]
    MissingInstaller(PathBuf),
}

/// Rebuild the full mirror URL for a discovered installer name.
///
/// The crawl keeps base names only, but the name embeds the version and build
/// that form its directory path on the mirror.
pub fn installer_url(mirror: &str, name: &str) -> Result<String, DownloadError> {
    let captures = INSTALLER_NAME
        .captures(name)
        .ok_or_else(|| DownloadError::UnrecognizedName(name.to_string()))?;
    let version = &captures[1];
    let build = &captures[2];
    Ok(join_url(
        mirror,
        &format!("{version}/{build}/windows/core/{name}"),
    ))
}

/// Stream one artifact to `dest_dir`, returning the archive path.
///
/// Unlike the crawl fetcher, a non-success status here is an error: the
/// caller asked for this exact artifact, so there is nothing to degrade to.
pub async fn download_artifact(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let file_name = url.rsplit('/').next().unwrap_or(url);
    let dest = dest_dir.join(file_name);

    info!("Downloading {} -> {}", url, dest.display());
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let mut file = tokio::fs::File::create(&dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    debug!("Download complete: {}", dest.display());
    Ok(dest)
}

/// Unpack the installer tar and return the inner executable's path.
///
/// Blocking; run under `spawn_blocking` from async contexts.
pub fn unpack_installer(archive: &Path, dest_dir: &Path) -> Result<PathBuf, DownloadError> {
    let mut tar = tar::Archive::new(File::open(archive)?);
    tar.unpack(dest_dir)?;

    // The archive holds a single installer executable plus metadata files.
    let mut tar = tar::Archive::new(File::open(archive)?);
    for entry in tar.entries()? {
        let entry = entry?;
        let path = entry.path()?;
        if path.extension().is_some_and(|ext| ext == "exe") {
            let unpacked = dest_dir.join(&path);
            info!("Unpacked installer: {}", unpacked.display());
            return Ok(unpacked);
        }
    }

    Err(DownloadError::MissingInstaller(archive.to_path_buf()))
}
