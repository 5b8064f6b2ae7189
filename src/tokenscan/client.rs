use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::TokenscanConfig;
use crate::error::ClientError;
use crate::tokenscan::models::LatestPayments;

/// System of record for on-chain token payments. Implemented by the HTTP
/// client in production and by scripted doubles in tests.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Returns every payment the provider observed with block number >= `from`,
    /// together with the provider's current chain head.
    async fn payments(&self, from: i64) -> Result<LatestPayments, ClientError>;

    /// Asks the provider to allocate a fresh receiving address.
    async fn claim_wallet(&self) -> Result<String, ClientError>;
}

/// Tokenscan HTTP API client. No retries or caching of its own; failures
/// are reported upward verbatim.
pub struct TokenscanClient {
    endpoint: String,
    identifier: String,
    secret: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ProviderError {
    error: String,
}

impl TokenscanClient {
    pub fn new(config: &TokenscanConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            identifier: config.auth_identifier.clone(),
            secret: config.auth_secret.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Maps a non-200 provider response onto the client error taxonomy.
    /// 401 is kept distinct so operators can tell a credential problem from
    /// a provider-side failure.
    fn error_from_response(status: StatusCode, body: &str) -> ClientError {
        let message = serde_json::from_str::<ProviderError>(body)
            .map(|data| data.error)
            .unwrap_or_else(|_| body.trim().to_string());

        if status == StatusCode::UNAUTHORIZED {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Provider {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl LedgerSource for TokenscanClient {
    async fn payments(&self, from: i64) -> Result<LatestPayments, ClientError> {
        let url = format!("{}/api/v0/tokens/payments", self.endpoint);

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.identifier, Some(&self.secret))
            .query(&[("from", from.to_string())])
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await?;
            return Err(Self::error_from_response(status, &body));
        }

        Ok(resp.json::<LatestPayments>().await?)
    }

    async fn claim_wallet(&self) -> Result<String, ClientError> {
        let url = format!("{}/api/v0/wallets/claim", self.endpoint);

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.identifier, Some(&self.secret))
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await?;
            return Err(Self::error_from_response(status, &body));
        }

        Ok(resp.json::<String>().await?)
    }
}
