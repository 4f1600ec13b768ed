//! HTTP implementation of the vision collaborator.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use scanventory_recognition::{ImageData, ShelfObservation, VisionClient, VisionError};

/// Analysis of a large capture can take tens of seconds.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Talks to the vision service over HTTP.
///
/// The service takes the bare base64 payload (no data-URL prefix) and answers
/// with either free-form analysis text or a structured item list.
pub struct HttpVisionClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct VisionRequest<'a> {
    image: &'a str,
    mode: &'a str,
}

#[derive(Deserialize)]
struct DescribeResponse {
    analysis: String,
}

#[derive(Deserialize)]
struct ShelfResponse {
    items: Vec<ShelfObservation>,
}

impl HttpVisionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, path: &str, image: &ImageData, mode: &str) -> Result<reqwest::Response, VisionError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&VisionRequest {
                image: image.base64_payload(),
                mode,
            })
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(VisionError::RateLimited);
        }
        if !status.is_success() {
            return Err(VisionError::Transport(format!(
                "vision service returned {}: {}",
                status.as_u16(),
                resp.text().await.unwrap_or_default()
            )));
        }
        Ok(resp)
    }
}

fn map_transport(err: reqwest::Error) -> VisionError {
    if err.is_timeout() {
        VisionError::Timeout
    } else {
        VisionError::Transport(err.to_string())
    }
}

#[async_trait]
impl VisionClient for HttpVisionClient {
    async fn describe_item(&self, image: &ImageData) -> Result<String, VisionError> {
        let resp = self.post("/vision/describe", image, "single").await?;
        let body: DescribeResponse = resp
            .json()
            .await
            .map_err(|e| VisionError::Malformed(e.to_string()))?;
        Ok(body.analysis)
    }

    async fn scan_shelf(&self, image: &ImageData) -> Result<Vec<ShelfObservation>, VisionError> {
        let resp = self.post("/vision/scan-shelf", image, "shelf").await?;
        let body: ShelfResponse = resp
            .json()
            .await
            .map_err(|e| VisionError::Malformed(e.to_string()))?;
        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_strips_the_data_url_prefix() {
        let image = ImageData::new("data:image/jpeg;base64,AAAA");
        let json = serde_json::to_value(VisionRequest {
            image: image.base64_payload(),
            mode: "single",
        })
        .unwrap();
        assert_eq!(json["image"], "AAAA");
        assert_eq!(json["mode"], "single");
    }

    #[test]
    fn shelf_response_tolerates_sparse_observations() {
        let body = r#"{"items":[{"name":"Ketchup"},{"name":"Mustard","count":3.0}]}"#;
        let parsed: ShelfResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[1].count, Some(3.0));
        assert_eq!(parsed.items[0].confidence, None);
    }
}
