use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gwbind_core::{GatewayDocument, GatewayRef, GatewayTransport, ReplaceResponse, TransportError};
use serde_json::Value;
use url::Url;

use crate::auth::TokenSource;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2023-09-01";

/// Connection settings for [`ArmTransport`].
#[derive(Debug, Clone)]
pub struct ArmConfig {
    pub endpoint: String,
    pub api_version: String,
    pub timeout: Duration,
    /// Send `If-Match` with the fetched etag on replace.
    pub conditional_writes: bool,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
            conditional_writes: false,
        }
    }
}

/// Reads and replaces Application Gateways through ARM.
pub struct ArmTransport {
    http: reqwest::Client,
    endpoint: Url,
    api_version: String,
    conditional_writes: bool,
    tokens: Arc<dyn TokenSource>,
}

impl ArmTransport {
    /// Creates a transport.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Configuration` if the endpoint is not a valid
    /// base URL or the HTTP client cannot be built.
    pub fn new(config: ArmConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, TransportError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            TransportError::Configuration(format!("invalid endpoint '{}': {e}", config.endpoint))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(TransportError::Configuration(format!(
                "endpoint '{}' cannot be used as a base URL",
                config.endpoint
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_version: config.api_version,
            conditional_writes: config.conditional_writes,
            tokens,
        })
    }

    /// `{endpoint}{gateway id}?api-version={version}`.
    pub fn gateway_url(&self, gateway: &GatewayRef) -> Result<Url, TransportError> {
        let mut url = self
            .endpoint
            .join(&gateway.resource_id())
            .map_err(|e| TransportError::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn request(
        &self,
        method: reqwest::Method,
        url: &Url,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let token = self.tokens.token().await?;
        Ok(self
            .http
            .request(method, url.clone())
            .bearer_auth(token)
            .header("Accept", "application/json"))
    }
}

impl std::fmt::Debug for ArmTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_version", &self.api_version)
            .field("conditional_writes", &self.conditional_writes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GatewayTransport for ArmTransport {
    async fn fetch(&self, gateway: &GatewayRef) -> Result<GatewayDocument, TransportError> {
        let url = self.gateway_url(gateway)?;
        let resp = self
            .request(reqwest::Method::GET, &url)
            .await?
            .send()
            .await
            .map_err(|e| TransportError::request(url.as_str(), e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(gateway = %gateway, status = status.as_u16(), "Fetched application gateway");

        match status.as_u16() {
            200 => {}
            404 => return Err(TransportError::NotFound(gateway.to_string())),
            401 | 403 => {
                return Err(TransportError::Auth(format!(
                    "HTTP {status} fetching {gateway}: {body}"
                )));
            }
            code => {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status: code,
                    body,
                });
            }
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| TransportError::decode(format!("response is not JSON: {e}")))?;
        GatewayDocument::from_value(value)
    }

    async fn replace(
        &self,
        gateway: &GatewayRef,
        document: &GatewayDocument,
    ) -> Result<ReplaceResponse, TransportError> {
        let url = self.gateway_url(gateway)?;
        let mut req = self
            .request(reqwest::Method::PUT, &url)
            .await?
            .header("Content-Type", "application/json")
            .json(&document.to_value());
        if self.conditional_writes
            && let Some(etag) = document.etag()
        {
            req = req.header("If-Match", etag);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::request(url.as_str(), e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();

        let document = match status {
            200 => serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| GatewayDocument::from_value(value).ok()),
            _ => None,
        };
        if status == 200 {
            tracing::debug!(gateway = %gateway, status, "Replaced application gateway");
        } else {
            tracing::warn!(gateway = %gateway, status, "Application gateway replace rejected");
        }

        Ok(ReplaceResponse {
            status,
            body,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    fn transport(endpoint: &str) -> Result<ArmTransport, TransportError> {
        let config = ArmConfig {
            endpoint: endpoint.to_string(),
            ..ArmConfig::default()
        };
        ArmTransport::new(config, Arc::new(StaticToken::new("t")))
    }

    #[test]
    fn test_gateway_url() {
        let transport = transport("https://management.azure.com").unwrap();
        let url = transport
            .gateway_url(&GatewayRef::new("sub", "rg", "agw"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/applicationGateways/agw?api-version=2023-09-01"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = transport("not a url").unwrap_err();
        assert!(matches!(err, TransportError::Configuration(_)));
        assert!(transport("mailto:ops@example.com").is_err());
    }
}
