use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::TokenCodec;
use auth::TokenService;
use chrono::Duration;
use chrono::Utc;
use identity_service::domain::user::accounts::AccountService;
use identity_service::domain::user::errors::AuthError;
use identity_service::domain::user::errors::MailerError;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::NewUser;
use identity_service::domain::user::models::Provider;
use identity_service::domain::user::models::Role;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::ports::Mailer;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::AuthenticationService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// In-memory store standing in for Postgres, so the HTTP stack is exercised
/// end to end without external services.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn seed(&self, user: NewUser) -> User {
        let mut users = self.users.lock().unwrap();
        let user = materialize(user, users.len() as i64 + 1);
        users.push(user.clone());
        user
    }
}

fn materialize(user: NewUser, id: i64) -> User {
    User {
        id: UserId(id),
        username: user.username,
        email: user.email,
        password_hash: user.password_hash,
        first_name: user.first_name,
        last_name: user.last_name,
        enabled: user.enabled,
        role: user.role,
        provider: user.provider,
        verification_token: user.verification_token,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.email.as_str() == email))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameTaken);
        }
        if users.iter().any(|u| u.email.as_str() == user.email.as_str()) {
            return Err(AuthError::EmailTaken);
        }
        let user = materialize(user, users.len() as i64 + 1);
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AuthError::UserNotFound)?;
        *slot = user.clone();
        Ok(user.clone())
    }
}

/// Mailer that records instead of sending, so tests can read back the
/// verification token a flow minted.
#[derive(Default)]
pub struct RecordingMailer {
    pub verification_tokens: Mutex<Vec<(String, String)>>,
    pub welcomes: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.verification_tokens
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        _username: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        self.verification_tokens
            .lock()
            .unwrap()
            .push((to.to_string(), token.to_string()));
        Ok(())
    }

    async fn send_welcome_email(&self, to: &str, _username: &str) -> Result<(), MailerError> {
        self.welcomes.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub token_service: Arc<TokenService>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let token_service = Arc::new(TokenService::new(
            TokenCodec::new(TEST_SECRET),
            Duration::hours(1),
            Duration::hours(24),
        ));

        let auth_service = Arc::new(AuthenticationService::new(
            Arc::clone(&repository),
            Arc::clone(&mailer),
            Arc::clone(&token_service),
        ));
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&repository),
            Arc::clone(&token_service),
        ));

        let state = AppState {
            auth_service,
            account_service,
            token_service: Arc::clone(&token_service),
            user_repository: Arc::clone(&repository) as Arc<dyn UserRepository>,
            cookie_secure: false,
        };

        let router = create_router(state);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            repository,
            mailer,
            token_service,
        }
    }

    /// Seeds an already-verified admin account and returns its access token.
    pub fn seed_admin(&self, email: &str) -> String {
        let hasher = auth::PasswordHasher::new();
        self.repository.seed(NewUser {
            username: "admin".to_string(),
            email: EmailAddress::new(email.to_string()).expect("valid test email"),
            password_hash: Some(hasher.hash("admin-password").expect("hashing")),
            first_name: "Ada".to_string(),
            last_name: "Root".to_string(),
            enabled: true,
            role: Role::Admin,
            provider: Provider::Local,
            verification_token: None,
        });
        self.token_service
            .issue_access_token(email, Role::Admin.as_str())
            .expect("token issuance")
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}
