use crate::domain::model::AnchorSummary;
use crate::utils::error::{AtlasMnsError, Result};
use crate::utils::validation::validate_url;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ATLAS_BASE_URL: &str = "https://atlas.ripe.net";
pub const ANCHORS_PATH: &str = "/api/v2/anchors";

#[derive(Debug, Deserialize)]
struct AnchorPage {
    count: Option<u64>,
}

/// RIPE Atlas REST API 的最小用戶端，只用來確認服務可達
#[derive(Debug, Clone)]
pub struct AtlasClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AtlasClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        validate_url("atlas_base_url", base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("atlasmns/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    pub fn anchors_url(&self) -> String {
        format!("{}{}", self.base_url, ANCHORS_PATH)
    }

    /// 對 anchors 列表發出單一 GET；非 2xx 視為失敗
    pub async fn fetch_anchors(&self) -> Result<AnchorSummary> {
        let url = self.anchors_url();
        tracing::debug!("Making RIPE Atlas request to: {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Key {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("RIPE Atlas response status: {}", status);

        if !status.is_success() {
            return Err(AtlasMnsError::AtlasStatusError {
                status: status.as_u16(),
            });
        }

        // 回應內容不是必要的，解析失敗時只記錄
        let count = match response.json::<AnchorPage>().await {
            Ok(page) => page.count,
            Err(e) => {
                tracing::debug!("Unable to parse anchors response: {}", e);
                None
            }
        };

        Ok(AnchorSummary {
            status: status.as_u16(),
            count,
        })
    }
}
