//! Dataset Fetcher
//!
//! Downloads the geolocation database to local storage before the
//! service opens it. Works with any HTTP(S) source, including
//! pre-signed object storage URLs.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Dataset download errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Download timeout for the whole transfer.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Download `url` into `dest`, returning the number of bytes written.
///
/// The body is streamed into a sibling `.tmp` file that is renamed over
/// `dest` only after the transfer completes, so a failed download never
/// leaves a truncated database behind.
pub async fn fetch_dataset(url: &str, dest: &Path, timeout: Duration) -> Result<u64, FetchError> {
    let request_err = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(request_err)?;

    let mut response = client.get(url).send().await.map_err(request_err)?;
    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let tmp_path = temp_path(dest);
    let io_err = |source| FetchError::Io {
        path: tmp_path.clone(),
        source,
    };

    let mut file = tokio::fs::File::create(&tmp_path).await.map_err(io_err)?;
    let mut written: u64 = 0;

    let copied: Result<(), FetchError> = async {
        while let Some(chunk) = response.chunk().await.map_err(request_err)? {
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        Ok(())
    }
    .await;
    drop(file);

    if let Err(e) = copied {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&tmp_path, dest)
        .await
        .map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })?;

    tracing::info!(
        "downloaded dataset from {} to {} ({} bytes)",
        url,
        dest.display(),
        written
    );

    Ok(written)
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}
