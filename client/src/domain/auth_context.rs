//! Authentication context passed explicitly to the parts of the client that
//! need to know who is signed in. It is populated once at startup from a
//! session status check and cleared on logout.

use shared::{LoginCredentials, RegisterCredentials, User};
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::storage::AuthGateway;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    user: Option<User>,
    loading: bool,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    /// A context that has not checked the session yet
    pub fn new() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Runs the startup session check. A failed check leaves the user signed out.
    pub async fn initialize(gateway: &dyn AuthGateway) -> Self {
        let user = match gateway.check_session_status().await {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "failed to check session status");
                None
            }
        };
        if let Some(user) = &user {
            info!(user_id = user.id, "restored session");
        }
        Self { user, loading: false }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// True until the startup status check has finished
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn login(&mut self, gateway: &dyn AuthGateway, credentials: &LoginCredentials) -> ClientResult<&User> {
        let user = gateway.login(credentials).await?;
        info!(user_id = user.id, "signed in");
        Ok(self.set_user(user))
    }

    /// Registers a new account; mismatched passwords are rejected before any request
    pub async fn register(
        &mut self,
        gateway: &dyn AuthGateway,
        credentials: &RegisterCredentials,
    ) -> ClientResult<&User> {
        if credentials.password1 != credentials.password2 {
            return Err(ClientError::Validation("Passwords do not match".to_string()));
        }
        if credentials.email.trim().is_empty() {
            return Err(ClientError::Validation("Email is required".to_string()));
        }
        let user = gateway.register(credentials).await?;
        info!(user_id = user.id, "registered account");
        Ok(self.set_user(user))
    }

    /// Signs out; the local user is cleared even if the server call fails
    pub async fn logout(&mut self, gateway: &dyn AuthGateway) -> ClientResult<()> {
        let result = gateway.logout().await;
        self.user = None;
        if let Err(error) = &result {
            warn!(%error, "logout request failed, cleared local session anyway");
        }
        result
    }

    pub fn update_user(&mut self, user: User) {
        self.set_user(user);
    }

    fn set_user(&mut self, user: User) -> &User {
        self.loading = false;
        self.user.insert(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGateway {
        session: ClientResult<Option<User>>,
        logout_result: ClientResult<()>,
        register_calls: AtomicUsize,
    }

    impl FakeGateway {
        fn new(session: ClientResult<Option<User>>) -> Self {
            Self {
                session,
                logout_result: Ok(()),
                register_calls: AtomicUsize::new(0),
            }
        }
    }

    fn user(email: &str) -> User {
        User {
            id: 1,
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            date_joined: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        }
    }

    #[async_trait]
    impl AuthGateway for FakeGateway {
        async fn login(&self, credentials: &LoginCredentials) -> ClientResult<User> {
            if credentials.password == "correct" {
                Ok(user(&credentials.email))
            } else {
                Err(ClientError::Auth("Login failed! Status: 400".to_string()))
            }
        }

        async fn register(&self, credentials: &RegisterCredentials) -> ClientResult<User> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            Ok(user(&credentials.email))
        }

        async fn logout(&self) -> ClientResult<()> {
            self.logout_result.clone()
        }

        async fn check_session_status(&self) -> ClientResult<Option<User>> {
            self.session.clone()
        }
    }

    #[test]
    fn test_new_context_is_loading_and_signed_out() {
        let context = AuthContext::new();
        assert!(context.is_loading());
        assert!(!context.is_logged_in());
    }

    #[tokio::test]
    async fn test_initialize_restores_session() {
        let gateway = FakeGateway::new(Ok(Some(user("sam@example.com"))));
        let context = AuthContext::initialize(&gateway).await;
        assert!(!context.is_loading());
        assert_eq!(context.user().map(|u| u.email.as_str()), Some("sam@example.com"));
    }

    #[tokio::test]
    async fn test_initialize_failure_leaves_signed_out() {
        let gateway = FakeGateway::new(Err(ClientError::Network("offline".to_string())));
        let context = AuthContext::initialize(&gateway).await;
        assert!(!context.is_loading());
        assert!(!context.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_and_failed_login() {
        let gateway = FakeGateway::new(Ok(None));
        let mut context = AuthContext::initialize(&gateway).await;

        let bad = LoginCredentials {
            email: "sam@example.com".to_string(),
            password: "wrong".to_string(),
        };
        assert!(context.login(&gateway, &bad).await.is_err());
        assert!(!context.is_logged_in());

        let good = LoginCredentials {
            password: "correct".to_string(),
            ..bad
        };
        context.login(&gateway, &good).await.unwrap();
        assert!(context.is_logged_in());
    }

    #[tokio::test]
    async fn test_register_checks_password_match_locally() {
        let gateway = FakeGateway::new(Ok(None));
        let mut context = AuthContext::new();
        let credentials = RegisterCredentials {
            email: "sam@example.com".to_string(),
            password1: "one".to_string(),
            password2: "two".to_string(),
            first_name: None,
            last_name: None,
        };

        let result = context.register(&gateway, &credentials).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(gateway.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_user_replaces_record() {
        let gateway = FakeGateway::new(Ok(Some(user("sam@example.com"))));
        let mut context = AuthContext::initialize(&gateway).await;

        let renamed = User {
            first_name: "Sam".to_string(),
            ..user("sam@example.com")
        };
        context.update_user(renamed);

        assert_eq!(context.user().map(User::display_name), Some("Sam"));
        assert!(!context.is_loading());
    }

    #[tokio::test]
    async fn test_logout_clears_user_even_when_request_fails() {
        let mut gateway = FakeGateway::new(Ok(Some(user("sam@example.com"))));
        gateway.logout_result = Err(ClientError::Network("offline".to_string()));
        let mut context = AuthContext::initialize(&gateway).await;
        assert!(context.is_logged_in());

        assert!(context.logout(&gateway).await.is_err());
        assert!(!context.is_logged_in());
    }
}
