//! Request/response shapes for the sponsorship proxy endpoints.
//!
//! The backend forwards these payloads to the external signing service and
//! never inspects or constructs transactions itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Payload accepted by `POST /api/sponsor-transaction`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SponsorTransactionRequest {
    /// Serialized transaction block to be sponsored.
    pub transaction_block_kind_bytes: String,
    /// Authentication token forwarded verbatim to the sponsorship service.
    pub zklogin_jwt: String,
    /// Target network; defaults to `testnet` when omitted.
    pub network: Option<String>,
}

/// Result returned once the sponsorship service accepts a transaction.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SponsorTransactionResponse {
    /// Always `true` on the success path; failures become error responses.
    pub success: bool,
    /// Sponsored transaction bytes returned by the service.
    pub transaction_bytes: String,
    /// Digest identifying the sponsored transaction.
    pub digest: String,
}

/// Payload accepted by `POST /api/sign-sponsored-transaction/{digest}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignSponsoredRequest {
    /// User signature over the sponsored transaction.
    pub signature: String,
}

/// Result returned once the sponsored transaction has been signed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignSponsoredResponse {
    /// Always `true` on the success path; failures become error responses.
    pub success: bool,
    /// Opaque signed-transaction record returned by the service.
    pub sponsored_transaction: Value,
}

/// Body forwarded to the sponsorship service's sponsor endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SponsorUpstreamRequest {
    pub network: String,
    pub transaction_block_kind_bytes: String,
}

/// Body forwarded to the sponsorship service's signing endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct SignUpstreamRequest {
    pub signature: String,
}

/// Fields read back from the sponsorship service's sponsor endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SponsorUpstreamResponse {
    pub transaction_bytes: String,
    pub digest: String,
}

/// Fields read back from the sponsorship service's signing endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignUpstreamResponse {
    pub sponsored_transaction: Value,
}
