use async_trait::async_trait;

use crate::user::errors::AuthError;
use crate::user::errors::MailerError;
use crate::user::models::AuthOutcome;
use crate::user::models::FederatedIdentity;
use crate::user::models::LoginCommand;
use crate::user::models::NewUser;
use crate::user::models::RegisterCommand;
use crate::user::models::RoleChange;
use crate::user::models::User;
use crate::user::models::UserId;

/// Persistence operations for the user record.
///
/// Uniqueness of username and email is enforced by the store; the
/// coordinator's existence pre-checks are advisory and the storage-level
/// constraints are the actual race-resolution mechanism for concurrent
/// registrations.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// Retrieve the user whose *stored pending verification token* equals
    /// `token`. This binds one-time consumption to a specific issuance.
    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, AuthError>;

    /// Persist a new user; the store assigns the id.
    ///
    /// # Errors
    /// * `UsernameTaken` / `EmailTaken` - unique constraint violated
    /// * `Database` - storage operation failed
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Persist changes to an existing user.
    async fn update(&self, user: &User) -> Result<User, AuthError>;
}

/// Outbound transactional email.
///
/// Fire-and-forget from the coordinator's perspective: callers catch and
/// log failures, never retry.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send_verification_email(
        &self,
        to: &str,
        username: &str,
        token: &str,
    ) -> Result<(), MailerError>;

    async fn send_welcome_email(&self, to: &str, username: &str) -> Result<(), MailerError>;
}

/// Port for the authentication state transitions over a user's lifecycle.
#[async_trait]
pub trait AuthenticationPort: Send + Sync + 'static {
    /// Register a new local account (created disabled, pending email
    /// verification).
    ///
    /// # Errors
    /// * `UsernameTaken` - username already exists
    /// * `EmailTaken` - email already registered
    async fn register(&self, command: RegisterCommand) -> Result<AuthOutcome, AuthError>;

    /// Authenticate a local account by username or email.
    ///
    /// # Errors
    /// * `UserNotFound` - no account matches the identifier
    /// * `IncorrectPassword` - credential verification failed
    /// * `EmailNotVerified` - account exists and the password is correct,
    ///   but email ownership has not been proven
    async fn login(&self, command: LoginCommand) -> Result<AuthOutcome, AuthError>;

    /// Consume a verification token, enabling the account it was issued
    /// for. Idempotent for an already-enabled account.
    async fn verify_email(&self, token: &str) -> Result<AuthOutcome, AuthError>;

    /// Mint a fresh verification token for a still-disabled account and
    /// resend the verification email.
    async fn resend_verification(&self, email: &str) -> Result<AuthOutcome, AuthError>;
}

/// Port for federated provisioning and account administration.
#[async_trait]
pub trait AccountPort: Send + Sync + 'static {
    /// Complete a federated login: find or create the local user for a
    /// provider-asserted identity, then issue an access token.
    async fn federated_login(&self, identity: FederatedIdentity) -> Result<AuthOutcome, AuthError>;

    /// Change a user's role, addressed by id or email (id wins).
    ///
    /// # Errors
    /// * `MissingRoleTarget` - neither identifying field provided
    /// * `UserNotFound` - target does not exist
    async fn change_role(&self, change: RoleChange) -> Result<User, AuthError>;
}
