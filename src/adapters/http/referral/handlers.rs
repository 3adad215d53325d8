//! HTTP handlers for referral endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::{ConfirmReferralCommand, GetReferralDataQuery};
use crate::domain::referral::ReferralValidationResult;

use super::dto::{
    CodeExistsResponse, ConfirmReferralResponse, ReferralCodeResponse, ReferralOverviewResponse,
};

/// GET /api/referrals - The caller's code and referral dashboard
pub async fn get_overview(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<ReferralOverviewResponse> {
    let manager = state.code_manager();
    let data_handler = state.referral_data_handler();

    let (code, data) = futures::join!(
        manager.get_user_referral_code(&user.id),
        data_handler.handle(GetReferralDataQuery {
            user_id: user.id.clone(),
        }),
    );

    Json(ReferralOverviewResponse {
        referral_code: code.map(|c| {
            let link = manager.share_link(&c);
            ReferralCodeResponse::new(&c, link)
        }),
        data,
    })
}

/// POST /api/referrals/code - Return the caller's code, creating it if needed
pub async fn initialize_code(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ReferralCodeResponse>, ApiError> {
    let manager = state.code_manager();
    let code = manager
        .initialize_user_referral_code(&user.id, user.display_name_or_email())
        .await
        .ok_or_else(|| ApiError::unavailable("Referral code could not be created"))?;

    let link = manager.share_link(&code);
    Ok(Json(ReferralCodeResponse::new(&code, link)))
}

/// GET /api/referrals/validate/:code - Public code check used by the signup form
pub async fn validate_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<ReferralValidationResult> {
    Json(state.validator().validate_referral_code(&code).await)
}

/// GET /api/referrals/exists/:code
pub async fn code_exists(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<CodeExistsResponse> {
    let exists = state.validator().check_referral_code_exists(&code).await;
    Json(CodeExistsResponse { exists })
}

/// POST /api/referrals/confirm - The referred user confirms their own
/// signup, which activates their referral and credits the referrer
pub async fn confirm_referral(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ConfirmReferralResponse>, ApiError> {
    if !user.email_verified {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "EMAIL_NOT_VERIFIED",
            "Verify your email address to confirm your referral",
        ));
    }

    let result = state
        .confirm_referral_handler()
        .handle(ConfirmReferralCommand {
            referred_id: user.id,
        })
        .await?;

    Ok(Json(result.into()))
}
