use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::sponsor::{
        SignSponsoredRequest, SignSponsoredResponse, SponsorTransactionRequest,
        SponsorTransactionResponse,
    },
    error::AppError,
    state::SharedState,
};

/// Configure the sponsorship proxy routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/sponsor-transaction", post(sponsor_transaction))
        .route(
            "/api/sign-sponsored-transaction/{digest}",
            post(sign_sponsored_transaction),
        )
}

#[utoipa::path(
    post,
    path = "/api/sponsor-transaction",
    tag = "sponsor",
    request_body = SponsorTransactionRequest,
    responses(
        (status = 200, description = "Transaction sponsored", body = SponsorTransactionResponse),
        (status = 502, description = "Sponsorship service failed")
    )
)]
/// Forward a sponsorship request to the external signing service.
pub async fn sponsor_transaction(
    State(state): State<SharedState>,
    Json(payload): Json<SponsorTransactionRequest>,
) -> Result<Json<SponsorTransactionResponse>, AppError> {
    let response = state.sponsor().sponsor_transaction(payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/sign-sponsored-transaction/{digest}",
    tag = "sponsor",
    params(("digest" = String, Path, description = "Digest of the sponsored transaction")),
    request_body = SignSponsoredRequest,
    responses(
        (status = 200, description = "Signature accepted", body = SignSponsoredResponse),
        (status = 502, description = "Sponsorship service failed")
    )
)]
/// Forward a user signature for a sponsored transaction.
pub async fn sign_sponsored_transaction(
    State(state): State<SharedState>,
    Path(digest): Path<String>,
    Json(payload): Json<SignSponsoredRequest>,
) -> Result<Json<SignSponsoredResponse>, AppError> {
    let response = state
        .sponsor()
        .sign_sponsored_transaction(&digest, payload)
        .await?;
    Ok(Json(response))
}
