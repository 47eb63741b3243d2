//! Authentication flows: signup, OTP login, logout.
//!
//! Thin orchestration over the API client and the session store. On login
//! the token pair is persisted and the caller gets back the account role
//! plus its landing route; navigation itself is the view layer's job.

use thiserror::Error;
use tracing::instrument;

use freshbasket_core::Role;

use crate::api::{ApiClient, ApiError, SignupRequest};
use crate::store::StoreError;

/// Errors that can occur during authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Credentials could not be persisted.
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
}

/// Login route preserving the interrupted path as a return target.
///
/// Computed for the view layer to navigate to when an authenticated flow
/// ends in an unrecoverable auth failure; the client itself never
/// navigates.
#[must_use]
pub fn login_route(return_to: &str) -> String {
    format!("/login/?next={}", urlencoding::encode(return_to))
}

/// Result of a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Role the server reported for this account.
    pub role: Role,
    /// Route the view layer should navigate to.
    pub landing_route: &'static str,
}

/// Signup / OTP login / logout orchestration.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    /// Create an auth service over the given API client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create an account. The new account still logs in via OTP.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the signup is rejected (e.g. duplicate
    /// email).
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(), AuthError> {
        self.api
            .signup(&SignupRequest {
                username,
                email,
                password,
                role,
            })
            .await?;
        Ok(())
    }

    /// Request a one-time password for the given email.
    ///
    /// Returns the OTP itself only on dev-mode deployments that echo it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the request is rejected.
    pub async fn request_otp(&self, email: &str) -> Result<Option<String>, AuthError> {
        let response = self.api.request_otp(email).await?;
        Ok(response.otp)
    }

    /// Verify an OTP, persist the issued token pair, and report the
    /// account's landing route.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the OTP is rejected, or
    /// `AuthError::Store` if the tokens cannot be persisted.
    #[instrument(skip(self, otp), fields(email = %email))]
    pub async fn login(&self, email: &str, otp: &str) -> Result<LoginOutcome, AuthError> {
        let response = self.api.login(email, otp).await?;

        self.api
            .session()
            .set_tokens(&response.tokens.access, &response.tokens.refresh)?;

        Ok(LoginOutcome {
            role: response.role,
            landing_route: response.role.landing_route(),
        })
    }

    /// Clear the persisted session. Purely local; there is no server-side
    /// logout endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the session cannot be cleared.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.api.session().clear()?;
        Ok(())
    }
}
