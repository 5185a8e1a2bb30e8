//! Authenticated HTTP client for the Bungie.net platform.

use crate::error::{ErrorKind, Result};
use crate::models::{ApiEnvelope, ManifestDescriptor, PLATFORM_SUCCESS};
use exn::{OptionExt, ResultExt};
use reqwest::{Client, StatusCode, Url};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Default base URL for platform (JSON) endpoints.
pub const DEFAULT_API_BASE: &str = "https://www.bungie.net/Platform/";
/// Default base URL for static content downloads (reference database archives).
pub const DEFAULT_CDN_BASE: &str = "https://www.bungie.net/";

const MANIFEST_ENDPOINT: &str = "Destiny2/Manifest";

/// HTTP client for the vendor API.
///
/// Every platform request carries the `X-API-Key` header, plus a bearer
/// `Authorization` header when an access token is available. Token
/// acquisition and refresh are an external concern; this client only
/// consumes an already-valid token and exposes
/// [`manifest_status`](BungieApi::manifest_status) as the probe the token
/// subsystem uses to decide whether a refresh is due.
///
/// No method retries internally. Callers own the retry policy.
#[derive(Debug, Clone)]
pub struct BungieApi {
    http: Client,
    api_base: Url,
    cdn_base: Url,
    api_key: String,
    token: Option<String>,
}

impl BungieApi {
    /// Create a client against the given base URLs.
    ///
    /// `api_base` must end with a trailing slash for endpoint joining to
    /// behave; one is appended if missing.
    pub fn new(
        api_base: impl AsRef<str>,
        cdn_base: impl AsRef<str>,
        api_key: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            api_base: Self::parse_base(api_base.as_ref())?,
            cdn_base: Self::parse_base(cdn_base.as_ref())?,
            api_key: api_key.into(),
            token,
        })
    }

    /// Create a client against the production Bungie.net endpoints.
    pub fn production(api_key: impl Into<String>, token: Option<String>) -> Result<Self> {
        Self::new(DEFAULT_API_BASE, DEFAULT_CDN_BASE, api_key, token)
    }

    fn parse_base(base: &str) -> Result<Url> {
        let normalized = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
        Url::parse(&normalized).or_raise(|| ErrorKind::InvalidUrl(normalized.clone()))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base.join(path).or_raise(|| ErrorKind::InvalidUrl(path.to_string()))
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("X-API-Key", &self.api_key);
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Fetch the current manifest descriptor.
    #[instrument(skip(self))]
    pub async fn manifest(&self) -> Result<ManifestDescriptor> {
        let url = self.endpoint(MANIFEST_ENDPOINT)?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .or_raise(|| ErrorKind::Http(format!("GET {MANIFEST_ENDPOINT}")))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let envelope: ApiEnvelope<ManifestDescriptor> =
            response.json().await.or_raise(|| ErrorKind::InvalidBody)?;
        if envelope.error_code != PLATFORM_SUCCESS {
            exn::bail!(ErrorKind::Platform { code: envelope.error_code, status: envelope.error_status });
        }
        envelope.response.ok_or_raise(|| ErrorKind::InvalidBody)
    }

    /// Testing mode of the manifest fetch: perform the same authenticated
    /// GET but report only the status code, body ignored. A `200` means the
    /// current token (if any) is accepted.
    pub async fn manifest_status(&self) -> Result<StatusCode> {
        let url = self.endpoint(MANIFEST_ENDPOINT)?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .or_raise(|| ErrorKind::Http(format!("GET {MANIFEST_ENDPOINT}")))?;
        Ok(response.status())
    }

    /// Download a static content archive to `dest`, streaming the body to
    /// disk. The CDN does not require a bearer token; only the API key is
    /// attached.
    #[instrument(skip(self, dest))]
    pub async fn download(&self, remote_path: &str, dest: &Path) -> Result<()> {
        let url = self
            .cdn_base
            .join(remote_path)
            .or_raise(|| ErrorKind::InvalidUrl(remote_path.to_string()))?;
        let mut response = self
            .http
            .get(url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .or_raise(|| ErrorKind::Http(format!("GET {remote_path}")))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let mut file = tokio::fs::File::create(dest)
            .await
            .or_raise(|| ErrorKind::Io(dest.display().to_string()))?;
        let mut written: u64 = 0;
        while let Some(chunk) =
            response.chunk().await.or_raise(|| ErrorKind::Http(format!("GET {remote_path}")))?
        {
            written += chunk.len() as u64;
            file.write_all(&chunk).await.or_raise(|| ErrorKind::Io(dest.display().to_string()))?;
        }
        file.flush().await.or_raise(|| ErrorKind::Io(dest.display().to_string()))?;
        debug!(bytes = written, dest = %dest.display(), "archive downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_are_normalized() {
        let api = BungieApi::new("https://example.test/Platform", "https://example.test", "key", None).unwrap();
        assert_eq!(
            api.endpoint(MANIFEST_ENDPOINT).unwrap().as_str(),
            "https://example.test/Platform/Destiny2/Manifest"
        );
    }

    #[test]
    fn cdn_join_handles_absolute_remote_paths() {
        let api = BungieApi::new(DEFAULT_API_BASE, DEFAULT_CDN_BASE, "key", None).unwrap();
        let url = api.cdn_base.join("/common/destiny2_content/sqlite/en/world_sql_content_ab.content").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.bungie.net/common/destiny2_content/sqlite/en/world_sql_content_ab.content"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = BungieApi::new("not a url", DEFAULT_CDN_BASE, "key", None);
        assert!(matches!(*result.unwrap_err(), ErrorKind::InvalidUrl(_)));
    }
}
