//! HTTP Handlers
//!
//! One handler per gateway operation. Handlers validate shape through the
//! DTOs and value objects, invoke one or two use cases, and map the result
//! to a response; all error-to-status mapping lives in `AuthError`.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountUseCase, PasswordResetUseCase, RefreshAccessUseCase, RegisterInput, RegisterUseCase,
    SignInInput, SignInUseCase, SignOutUseCase, VerifyEmailUseCase,
};
use crate::domain::mailer::Mailer;
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AvailabilityRequest, EmailRequest, MessageResponse, ProfileResponse, RefreshResponse,
    ResetPasswordRequest, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    pub store: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /auth/sign_up
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let register = RegisterUseCase::new(state.store.clone(), state.config.clone());

    let user = register
        .execute(RegisterInput {
            user_name: req.username,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        })
        .await?;

    // Queue the verification mail for the fresh account
    let verification = VerifyEmailUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    verification.request(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user_id: user.user_id.to_string(),
        }),
    ))
}

/// POST /auth/sign_up_check
pub async fn sign_up_check<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<AvailabilityRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let register = RegisterUseCase::new(state.store.clone(), state.config.clone());
    register.check_availability(&req.username, &req.email).await?;

    Ok(Json(MessageResponse::new("Username and email are available")))
}

// ============================================================================
// Sign In / Refresh / Sign Out
// ============================================================================

/// POST /auth/sign_in
pub async fn sign_in<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            login: req.login,
            password: req.password,
        })
        .await?;

    let cookie = state
        .config
        .refresh_cookie
        .set(&output.refresh_token, state.config.refresh_max_age_secs());

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            user_id: output.user_id.to_string(),
            access_token: output.access_token,
        }),
    ))
}

/// GET /auth/refresh_token
pub async fn refresh_token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let token = refresh_cookie(&headers, &state.config).ok_or(AuthError::SessionInvalid)?;

    let use_case = RefreshAccessUseCase::new(state.store.clone(), state.config.clone());
    let output = use_case.execute(&token).await?;

    Ok(Json(RefreshResponse {
        access_token: output.access_token,
    }))
}

/// GET /auth/sign_out
pub async fn sign_out<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    if let Some(token) = refresh_cookie(&headers, &state.config) {
        // Clearing the cookie matters more than the row; a failed delete
        // still signs the client out.
        let use_case = SignOutUseCase::new(state.store.clone());
        let _ = use_case.execute(&token).await;
    }

    let cookie = state.config.refresh_cookie.clear();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// GET /auth/terminate_all_sessions
pub async fn terminate_all_sessions<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.store.clone());
    use_case.terminate_all(&current.user_id).await?;

    let cookie = state.config.refresh_cookie.clear();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Profile / Account
// ============================================================================

/// GET /auth/get_auth_user
pub async fn get_auth_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = AccountUseCase::new(state.store.clone(), state.store.clone());
    let user = use_case.profile(&current.user_id).await?;

    Ok(Json(ProfileResponse::from(&user)))
}

/// DELETE /auth/delete_account
pub async fn delete_account<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = AccountUseCase::new(state.store.clone(), state.store.clone());
    use_case.delete_account(&current.user_id).await?;

    let cookie = state.config.refresh_cookie.clear();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Email Verification
// ============================================================================

/// GET /auth/verify_user/{token}
pub async fn verify_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.redeem(&token).await?;

    Ok(Json(MessageResponse::new("Account verified")))
}

/// POST /auth/resend_verification_email
pub async fn resend_verification_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    use_case.resend(&req.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Verification email sent")),
    ))
}

// ============================================================================
// Password Reset
// ============================================================================

fn reset_use_case<R, M>(
    state: &AuthAppState<R, M>,
) -> PasswordResetUseCase<R, R, R, M>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    PasswordResetUseCase::new(
        state.store.clone(),
        state.store.clone(),
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    )
}

/// POST /auth/reset_password_request
pub async fn reset_password_request<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<EmailRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    reset_use_case(&state).request(&req.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Password reset email sent")),
    ))
}

/// POST /auth/reset_password_check/{token}
pub async fn reset_password_check<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    reset_use_case(&state).check(&token).await?;

    Ok(Json(MessageResponse::new("Token is valid")))
}

/// POST /auth/reset_password/{token}
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
{
    reset_use_case(&state)
        .redeem(&token, req.password, req.confirm_password)
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn refresh_cookie(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    platform::cookie::extract_cookie(headers, &config.refresh_cookie.name)
}
