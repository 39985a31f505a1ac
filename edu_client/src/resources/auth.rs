use tracing::info;

use crate::api::{
    Acknowledgement, AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, TokenResponse,
};
use crate::client::{ApiClient, ClientResult};

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const LOGOUT: &str = "/auth/logout";
pub const REFRESH: &str = "/auth/refresh";
pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/auth/reset-password";

/// Authentication endpoints.
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// POST /auth/login
    ///
    /// On success the returned token becomes the session token.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<AuthResponse> {
        let response: AuthResponse = self.client.post(LOGIN, credentials).await?;
        self.client.session().set_token(&response.token)?;
        info!(user_id = %response.user.id, role = %response.user.role, "Logged in");
        Ok(response)
    }

    /// POST /auth/register
    pub async fn register(&self, user: &RegisterRequest) -> ClientResult<AuthResponse> {
        self.client.post(REGISTER, user).await
    }

    /// POST /auth/logout
    pub async fn logout(&self) -> ClientResult<Option<Acknowledgement>> {
        self.client.post_empty(LOGOUT).await
    }

    /// POST /auth/refresh
    pub async fn refresh_token(&self) -> ClientResult<TokenResponse> {
        self.client.post_empty(REFRESH).await
    }

    /// POST /auth/forgot-password
    pub async fn forgot_password(&self, email: &str) -> ClientResult<Acknowledgement> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.client.post(FORGOT_PASSWORD, &body).await
    }

    /// POST /auth/reset-password
    pub async fn reset_password(&self, token: &str, password: &str) -> ClientResult<Acknowledgement> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
        };
        self.client.post(RESET_PASSWORD, &body).await
    }
}
