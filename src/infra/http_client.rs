use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::error::CollectorError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const USER_AGENT: &str = concat!("spectra_sentiment/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(timeout: Duration) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult, CollectorError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CollectorError::Network(format!("request timed out: {e}"))
            } else {
                CollectorError::from(e)
            }
        })?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok(HttpGetResult {
            status,
            bytes,
            content_type,
        })
    }
}
