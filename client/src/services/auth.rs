//! Session handling against the backend's account endpoints.
//!
//! Login and signup hand back tokens that are persisted through the
//! client's `TokenStore`; every way out of a session (logout, a rejected
//! status check) removes them again.

use async_trait::async_trait;
use shared::{AuthResponse, LoginCredentials, RegisterCredentials, User};
use tracing::{info, warn};

use crate::error::ClientResult;
use crate::services::api::ApiClient;
use crate::storage::{AuthGateway, StoredTokens};

impl ApiClient {
    fn remember_tokens(&self, response: &AuthResponse) {
        if response.access_token.is_none() {
            return;
        }
        let tokens = StoredTokens {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
        };
        if let Err(error) = self.tokens().save(&tokens) {
            warn!(error = %error, "failed to persist session tokens");
        }
    }

    fn forget_tokens(&self) {
        if let Err(error) = self.tokens().clear() {
            warn!(error = %error, "failed to remove session tokens");
        }
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<User> {
        let response: AuthResponse = self.post_json("/accounts/login/", Some(credentials), false).await?;
        self.remember_tokens(&response);
        info!(user_id = response.user.id, "logged in");
        Ok(response.user)
    }

    async fn register(&self, credentials: &RegisterCredentials) -> ClientResult<User> {
        let response: AuthResponse = self.post_json("/accounts/signup/", Some(credentials), false).await?;
        self.remember_tokens(&response);
        info!(user_id = response.user.id, "registered");
        Ok(response.user)
    }

    async fn logout(&self) -> ClientResult<()> {
        let result = self.post::<()>("/api/logout/", None, true).await;
        self.forget_tokens();
        result.map(|_| ())
    }

    async fn check_session_status(&self) -> ClientResult<Option<User>> {
        match self.get_json::<AuthResponse>("/api/user/").await {
            Ok(response) => Ok(Some(response.user)),
            Err(error) => {
                // Any failure ends the local session, a 401 included
                info!(%error, "no valid session");
                self.forget_tokens();
                Ok(None)
            }
        }
    }
}
