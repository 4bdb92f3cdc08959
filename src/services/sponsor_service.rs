//! Forwarding client for the external transaction sponsorship service.
//!
//! The backend is a pure proxy here: it attaches the service credentials,
//! relays the payloads, and returns the service's answer. Transaction
//! construction and signing stay entirely outside this process.

use reqwest::Client;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    dto::sponsor::{
        SignSponsoredRequest, SignSponsoredResponse, SignUpstreamRequest, SignUpstreamResponse,
        SponsorTransactionRequest, SponsorTransactionResponse, SponsorUpstreamRequest,
        SponsorUpstreamResponse,
    },
    error::ServiceError,
};

/// Network used when the client does not name one.
const DEFAULT_NETWORK: &str = "testnet";
/// Header carrying the user's authentication token to the sponsorship service.
const ZKLOGIN_JWT_HEADER: &str = "zklogin-jwt";

/// Thin client proxying sponsorship calls to the external signing service.
pub struct SponsorClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SponsorClient {
    /// Build the client from the application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.sponsor_base_url().to_string(),
            api_key: config.sponsor_api_key().map(str::to_string),
        }
    }

    /// Request sponsorship for a prepared transaction block.
    pub async fn sponsor_transaction(
        &self,
        request: SponsorTransactionRequest,
    ) -> Result<SponsorTransactionResponse, ServiceError> {
        let api_key = self.require_key()?;
        let url = format!("{}/transaction-blocks/sponsor", self.base_url);
        let network = request.network.unwrap_or_else(|| DEFAULT_NETWORK.to_string());

        info!(%network, "forwarding sponsorship request");

        let response = self
            .http
            .post(&url)
            .header(ZKLOGIN_JWT_HEADER, &request.zklogin_jwt)
            .bearer_auth(api_key)
            .json(&SponsorUpstreamRequest {
                network,
                transaction_block_kind_bytes: request.transaction_block_kind_bytes,
            })
            .send()
            .await
            .map_err(|err| ServiceError::Upstream(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "sponsorship service rejected transaction");
            return Err(ServiceError::Upstream(format!(
                "sponsorship service returned {status}"
            )));
        }

        let upstream: SponsorUpstreamResponse = response
            .json()
            .await
            .map_err(|err| ServiceError::Upstream(err.to_string()))?;

        Ok(SponsorTransactionResponse {
            success: true,
            transaction_bytes: upstream.transaction_bytes,
            digest: upstream.digest,
        })
    }

    /// Submit the user signature for a previously sponsored transaction.
    pub async fn sign_sponsored_transaction(
        &self,
        digest: &str,
        request: SignSponsoredRequest,
    ) -> Result<SignSponsoredResponse, ServiceError> {
        let api_key = self.require_key()?;
        let url = format!("{}/transaction-blocks/sponsor/{digest}", self.base_url);

        info!(digest, "forwarding sponsored-transaction signature");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&SignUpstreamRequest {
                signature: request.signature,
            })
            .send()
            .await
            .map_err(|err| ServiceError::Upstream(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, digest, "sponsorship service rejected signature");
            return Err(ServiceError::Upstream(format!(
                "sponsorship service returned {status}"
            )));
        }

        let upstream: SignUpstreamResponse = response
            .json()
            .await
            .map_err(|err| ServiceError::Upstream(err.to_string()))?;

        Ok(SignSponsoredResponse {
            success: true,
            sponsored_transaction: upstream.sponsored_transaction,
        })
    }

    fn require_key(&self) -> Result<&str, ServiceError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ServiceError::Upstream("sponsorship API key is not configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_reported_without_calling_upstream() {
        let client = SponsorClient::new(&AppConfig::default());
        let err = client
            .sponsor_transaction(SponsorTransactionRequest {
                transaction_block_kind_bytes: "AAA=".into(),
                zklogin_jwt: "jwt".into(),
                network: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }
}
