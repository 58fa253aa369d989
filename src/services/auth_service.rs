use crate::config::AuthConfig;
use crate::domain::auth::{Claims, Password};
use crate::domain::store::UserStore;
use crate::domain::user::NewUser;
use crate::error::{AppError, Result};
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    registered_total: Counter<u64>,
    login_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("messagely-server");
        Self {
            registered_total: meter
                .u64_counter("messagely_users_registered_total")
                .with_description("Total number of successful registrations")
                .build(),
            login_total: meter
                .u64_counter("messagely_auth_login_total")
                .with_description("Total number of successful logins")
                .build(),
        }
    }
}

/// Fields a client supplies to register.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
    users: Arc<dyn UserStore>,
    metrics: Metrics,
}

impl AuthService {
    #[must_use]
    pub fn new(config: AuthConfig, users: Arc<dyn UserStore>) -> Self {
        Self { config, users, metrics: Metrics::new() }
    }

    /// Creates a user and returns an access token for them.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if the username or password is empty.
    /// Returns `AppError::Conflict` if the username is taken.
    #[tracing::instrument(skip(self, registration), fields(username = %registration.username), err(level = "warn"))]
    pub async fn register(&self, registration: Registration) -> Result<String> {
        if registration.username.trim().is_empty() {
            return Err(AppError::BadRequest("Username is required".into()));
        }
        if registration.password.is_empty() {
            return Err(AppError::BadRequest("Password is required".into()));
        }

        let password_hash = self.hash_password(registration.password).await?;
        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                phone: registration.phone,
            })
            .await?;

        self.metrics.registered_total.add(1, &[]);
        self.issue_token(&user.username)
    }

    /// Checks credentials, records the login time and returns an access token.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for an unknown user or wrong password.
    #[tracing::instrument(skip(self, password), err(level = "warn"))]
    pub async fn login(&self, username: &str, password: String) -> Result<String> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::warn!("Login failed: user not found");
            return Err(AppError::AuthError);
        };

        if !self.verify_password(password, user.password_hash).await? {
            tracing::warn!("Login failed: invalid password");
            return Err(AppError::AuthError);
        }

        self.users.touch_last_login(username).await?;
        self.metrics.login_total.add(1, &[]);
        self.issue_token(username)
    }

    /// Resolves a bearer token to the username it was issued for.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` if the token is invalid or expired.
    pub fn verify_token(&self, token: &str) -> Result<String> {
        Ok(Claims::decode(token, &self.config.jwt_secret)?.sub)
    }

    fn issue_token(&self, username: &str) -> Result<String> {
        Claims::new(username, self.config.token_ttl_secs).encode(&self.config.jwt_secret)
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Password::hash(&password)).await.map_err(|_| AppError::Internal)?
    }

    async fn verify_password(&self, password: String, password_hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Password::verify(&password, &password_hash))
            .await
            .map_err(|_| AppError::Internal)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    fn setup_service() -> (AuthService, MemoryStore) {
        let config = AuthConfig { jwt_secret: "test_secret".to_string(), token_ttl_secs: 3600 };
        let store = MemoryStore::new();
        (AuthService::new(config, Arc::new(store.clone())), store)
    }

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_string(),
            password: "password12345".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_token_for_username() {
        let (service, _) = setup_service();
        let token = service.register(registration("alice")).await.unwrap();

        assert_eq!(service.verify_token(&token).unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let (service, _) = setup_service();
        service.register(registration("alice")).await.unwrap();

        let result = service.register(registration("alice")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_requires_credentials() {
        let (service, _) = setup_service();

        let result = service.register(registration("  ")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = service.register(Registration { password: String::new(), ..registration("alice") }).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_login_updates_last_login() {
        let (service, store) = setup_service();
        service.register(registration("alice")).await.unwrap();

        let token = service.login("alice", "password12345".to_string()).await.unwrap();
        assert_eq!(service.verify_token(&token).unwrap(), "alice");

        let alice = store.find_by_username("alice").await.unwrap().unwrap();
        assert!(alice.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (service, _) = setup_service();
        service.register(registration("alice")).await.unwrap();

        let wrong_password = service.login("alice", "wrong".to_string()).await;
        assert!(matches!(wrong_password, Err(AppError::AuthError)));

        let unknown_user = service.login("nobody", "password12345".to_string()).await;
        assert!(matches!(unknown_user, Err(AppError::AuthError)));
    }

    #[test]
    fn test_verify_garbage_token() {
        let (service, _) = setup_service();
        assert!(matches!(service.verify_token("not-a-jwt"), Err(AppError::AuthError)));
    }
}
