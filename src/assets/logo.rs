use std::time::Duration;

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{
    assets::decode::{PreparedImage, decode_image},
    card::model::LogoRef,
    foundation::error::{CardError, CardResult},
};

/// Default upper bound for a remote logo fetch.
pub const DEFAULT_LOGO_TIMEOUT: Duration = Duration::from_secs(3);
/// Default cap on logo payload size.
pub const DEFAULT_LOGO_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Resolves a [`LogoRef`] into decoded pixels.
#[derive(Clone, Debug)]
pub struct LogoFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl LogoFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration, max_bytes: usize) -> CardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ogcard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build logo http client")?;
        Ok(Self { client, max_bytes })
    }

    /// Raw bytes behind `logo`.
    pub async fn fetch(&self, logo: &LogoRef) -> CardResult<Vec<u8>> {
        let url = match logo {
            LogoRef::Bytes(bytes) => return self.check_len(bytes.as_ref().clone()),
            LogoRef::Url(url) => url,
        };
        if url.starts_with("data:") {
            return self.check_len(decode_data_uri(url)?);
        }

        let mut resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| CardError::asset(format!("fetch logo '{url}': {e}")))?
            .error_for_status()
            .map_err(|e| CardError::asset(format!("fetch logo '{url}': {e}")))?;
        if resp
            .content_length()
            .is_some_and(|n| n > self.max_bytes as u64)
        {
            return Err(CardError::asset(format!(
                "logo '{url}' exceeds {} bytes",
                self.max_bytes
            )));
        }
        let mut body = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| CardError::asset(format!("read logo '{url}': {e}")))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(CardError::asset(format!(
                    "logo '{url}' exceeds {} bytes",
                    self.max_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Fetch and decode; any failure is logged and yields `None` so the card shows its placeholder.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, logo: Option<&LogoRef>) -> Option<PreparedImage> {
        let logo = logo?;
        let result = match self.fetch(logo).await {
            Ok(bytes) => decode_image(&bytes),
            Err(e) => Err(e),
        };
        match result {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(error = %e, "logo unavailable, using placeholder");
                None
            }
        }
    }

    fn check_len(&self, bytes: Vec<u8>) -> CardResult<Vec<u8>> {
        if bytes.len() > self.max_bytes {
            return Err(CardError::asset(format!(
                "logo exceeds {} bytes",
                self.max_bytes
            )));
        }
        Ok(bytes)
    }
}

impl Default for LogoFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_bytes: DEFAULT_LOGO_MAX_BYTES,
        }
    }
}

/// Decode a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> CardResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CardError::asset("not a data uri"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CardError::asset("data uri has no payload"))?;
    if !meta.ends_with(";base64") {
        return Err(CardError::asset("only base64 data uris are supported"));
    }
    // Form decoding turns '+' into ' '.
    let payload: String = payload
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            c if c.is_ascii_whitespace() => None,
            c => Some(c),
        })
        .collect();
    BASE64
        .decode(payload)
        .map_err(|e| CardError::asset(format!("invalid base64 logo: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/logo.rs"]
mod tests;
