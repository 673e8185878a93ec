//! Archive download over HTTP.

use url::Url;

use super::ArchiveError;

/// Fetches archive bytes.
///
/// `Ok(None)` means the server answered but had no archive for the URL.
#[allow(async_fn_in_trait)]
pub trait ArchiveDownloader: std::fmt::Debug + Send + Sync {
    async fn download(&self, url: &Url) -> Result<Option<Vec<u8>>, ArchiveError>;
}

/// Plain unauthenticated HTTP(S) downloads.
///
/// Clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: reqwest::Client,
    user_agent: String,
}

impl HttpDownloader {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new("whichlicense")
    }
}

impl ArchiveDownloader for HttpDownloader {
    async fn download(&self, url: &Url) -> Result<Option<Vec<u8>>, ArchiveError> {
        let download_error = |source| ArchiveError::Download {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(download_error)?;

        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "archive download failed");
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(download_error)?;
        tracing::trace!(%url, size = bytes.len(), "archive downloaded");

        Ok(Some(bytes.to_vec()))
    }
}
