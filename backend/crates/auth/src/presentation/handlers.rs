//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use axum::response::IntoResponse;
use kernel::actor::CurrentUser;
use platform::client::{ClientFingerprint, client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;
use platform::rate_limit::SlidingWindowLimiter;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, RequestOtpInput, RequestOtpUseCase, ResetPasswordInput,
    ResetPasswordUseCase, SetRoleUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase, VerifyOtpInput, VerifyOtpUseCase, check_session,
};
use crate::domain::notifier::OtpNotifier;
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    OtpRequest, OtpRequestResponse, OtpVerifyRequest, OtpVerifyResponse, ResetPasswordRequest,
    SessionStatusResponse, SetRoleRequest, SetRoleResponse, SignInRequest, SignInResponse,
    SignUpRequest, SignUpResponse, UserInfoResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, N> {
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    /// OTP issuance budget per identifier
    pub limiter: Arc<SlidingWindowLimiter>,
    pub config: Arc<AuthConfig>,
}

impl<R, N> Clone for AuthAppState<R, N> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            notifier: self.notifier.clone(),
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        }
    }
}

/// Caller fingerprint built from `User-Agent` and the client address
pub struct ClientContext(pub ClientFingerprint);

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(fingerprint_from_parts(&parts.headers, &parts.extensions)?))
    }
}

pub(crate) fn fingerprint_from_parts(
    headers: &HeaderMap,
    extensions: &axum::http::Extensions,
) -> AuthResult<ClientFingerprint> {
    Ok(extract_fingerprint(headers, client_ip(extensions))?)
}

// ============================================================================
// Sign Up / Sign In / Sign Out
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignUpInput {
            email: req.email,
            phone: req.phone,
            display_name: req.display_name,
            password: req.password,
            account_type: req.account_type,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            public_id: output.public_id,
        }),
    ))
}

/// POST /api/auth/signin
pub async fn sign_in<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ClientContext(fingerprint): ClientContext,
    Json(req): Json<SignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            SignInInput {
                identifier: req.identifier,
                password: req.password,
                remember_me: req.remember_me,
            },
            fingerprint,
        )
        .await?;

    let cookie = state
        .config
        .cookie()
        .set_cookie_header(&output.session_token, output.max_age_secs);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            public_id: output.public_id,
            role: output.role,
        }),
    ))
}

/// POST /api/auth/signout
pub async fn sign_out<R, N>(
    State(state): State<AuthAppState<R, N>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    if let Some(token) = extract_cookie(&headers, &state.config.session_cookie_name) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Forged or stale tokens still get the cookie cleared
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Sign-out with unusable session token");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.config.cookie().delete_cookie_header())],
    )
}

// ============================================================================
// Session
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<R, N>(
    State(state): State<AuthAppState<R, N>>,
    headers: HeaderMap,
    client: Result<ClientContext, AuthError>,
) -> Json<SessionStatusResponse>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.session_cookie_name);

    let (Some(token), Ok(ClientContext(fingerprint))) = (token, client) else {
        return Json(SessionStatusResponse::anonymous());
    };

    let use_case =
        CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    match use_case.execute(&token, &fingerprint.hash).await {
        Ok(info) => Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(info.public_id),
            role: Some(info.role),
            verified: Some(info.verified),
            expires_at_ms: Some(info.expires_at_ms),
        }),
        Err(_) => Json(SessionStatusResponse::anonymous()),
    }
}

/// GET /api/auth/me
pub async fn me<R, N>(
    State(state): State<AuthAppState<R, N>>,
    user: CurrentUser,
) -> AuthResult<Json<UserInfoResponse>>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let profile = check_session::me(state.repo.as_ref(), &user.public_id).await?;
    Ok(Json(profile.into()))
}

// ============================================================================
// OTP
// ============================================================================

/// POST /api/auth/otp/request
pub async fn request_otp<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<OtpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let use_case = RequestOtpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RequestOtpInput {
            identifier: req.identifier,
            purpose: req.purpose,
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(OtpRequestResponse {
            expires_in_secs: output.expires_in_secs,
            resend_after_secs: output.resend_after_secs,
        }),
    ))
}

/// POST /api/auth/otp/verify
pub async fn verify_otp<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ClientContext(fingerprint): ClientContext,
    Json(req): Json<OtpVerifyRequest>,
) -> AuthResult<axum::response::Response>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let use_case = VerifyOtpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            VerifyOtpInput {
                identifier: req.identifier,
                purpose: req.purpose,
                code: req.code,
                remember_me: req.remember_me,
            },
            fingerprint,
        )
        .await?;

    let body = Json(OtpVerifyResponse {
        public_id: output.public_id,
        role: output.role,
        email_verified: output.email_verified,
        phone_verified: output.phone_verified,
        signed_in: output.session.is_some(),
    });

    Ok(match output.session {
        Some((token, max_age_secs)) => {
            let cookie = state.config.cookie().set_cookie_header(&token, max_age_secs);
            ([(header::SET_COOKIE, cookie)], body).into_response()
        }
        None => body.into_response(),
    })
}

/// POST /api/auth/password/reset
pub async fn reset_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(state.repo.clone(), state.config.clone());

    use_case
        .execute(ResetPasswordInput {
            identifier: req.identifier,
            code: req.code,
            new_password: req.new_password,
        })
        .await?;

    // Every session was revoked, including this browser's
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.config.cookie().delete_cookie_header())],
    ))
}

// ============================================================================
// Administration
// ============================================================================

/// PUT /api/auth/users/{public_id}/role
pub async fn set_role<R, N>(
    State(state): State<AuthAppState<R, N>>,
    actor: CurrentUser,
    Path(public_id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> AuthResult<Json<SetRoleResponse>>
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    let use_case = SetRoleUseCase::new(state.repo.clone());
    let role = use_case.execute(&actor, &public_id, &req.role).await?;

    Ok(Json(SetRoleResponse { public_id, role }))
}
