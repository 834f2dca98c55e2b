//! Pinata IPFS pinning client
//!
//! Publishes the rendered artifacts and the metadata document, returning
//! `ipfs://<CID>` URIs. Both operations run under the publication retry
//! policy: transient failures back off and retry, anything else propagates
//! immediately.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::info;

use crate::config::PinataConfig;
use crate::retry::RetryPolicy;

use super::{ClientError, ContentStore};

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Content store backed by the Pinata pinning API.
pub struct PinataStore {
    http: reqwest::Client,
    config: PinataConfig,
    retry: RetryPolicy,
}

impl PinataStore {
    pub fn new(config: PinataConfig) -> Result<Self, ClientError> {
        Self::with_retry(config, RetryPolicy::publication())
    }

    pub fn with_retry(config: PinataConfig, retry: RetryPolicy) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(ClientError::from)?;
        Ok(Self { http, config, retry })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn pin_file_once(&self, bytes: Vec<u8>, name: &str) -> Result<String, ClientError> {
        let part = Part::bytes(bytes).file_name(name.to_string());
        let form = Form::new().part("file", part);

        let response: PinResponse = self
            .http
            .post(self.endpoint("pinFileToIPFS"))
            .header("pinata_api_key", self.config.api_key.as_str())
            .header("pinata_secret_api_key", self.config.secret_api_key.as_str())
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(format!("ipfs://{}", response.ipfs_hash))
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn upload_file(&self, path: &Path, name: &str) -> Result<String, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        info!(path = %path.display(), size = bytes.len(), name, "pinning file");

        // The multipart form is consumed per request, so each attempt
        // rebuilds it from the same bytes.
        let uri = self
            .retry
            .run(|| self.pin_file_once(bytes.clone(), name), ClientError::is_transient)
            .await?;
        info!(%uri, "file pinned");
        Ok(uri)
    }

    async fn upload_json(&self, doc: &serde_json::Value) -> Result<String, ClientError> {
        info!("pinning metadata document");
        let uri = self
            .retry
            .run(
                || async {
                    let response: PinResponse = self
                        .http
                        .post(self.endpoint("pinJSONToIPFS"))
                        .header("pinata_api_key", &self.config.api_key)
                        .header("pinata_secret_api_key", &self.config.secret_api_key)
                        .json(doc)
                        .send()
                        .await?
                        .error_for_status()?
                        .json()
                        .await?;
                    Ok(format!("ipfs://{}", response.ipfs_hash))
                },
                ClientError::is_transient,
            )
            .await?;
        info!(%uri, "metadata pinned");
        Ok(uri)
    }
}
