use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenService;

use crate::user::errors::AuthError;
use crate::user::models::AuthOutcome;
use crate::user::models::EmailAddress;
use crate::user::models::LoginCommand;
use crate::user::models::NewUser;
use crate::user::models::Provider;
use crate::user::models::RegisterCommand;
use crate::user::models::Role;
use crate::user::models::User;
use crate::user::models::UserSummary;
use crate::user::ports::AuthenticationPort;
use crate::user::ports::Mailer;
use crate::user::ports::UserRepository;

/// Coordinates the register / login / verify-email / resend-verification
/// state transitions over the user record.
///
/// Stateless with respect to in-process memory; concurrency safety is
/// delegated to the store's unique constraints. The only tolerated partial
/// failure is outbound email: delivery problems are logged and swallowed,
/// never rolled back into the caller's result.
pub struct AuthenticationService<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    repository: Arc<R>,
    mailer: Arc<M>,
    token_service: Arc<TokenService>,
    password_hasher: PasswordHasher,
}

impl<R, M> AuthenticationService<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(repository: Arc<R>, mailer: Arc<M>, token_service: Arc<TokenService>) -> Self {
        Self {
            repository,
            mailer,
            token_service,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Classify the login identifier and look the account up accordingly.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AuthError> {
        if EmailAddress::is_email_shaped(identifier) {
            self.repository.find_by_email(identifier).await
        } else {
            self.repository.find_by_username(identifier).await
        }
    }
}

#[async_trait]
impl<R, M> AuthenticationPort for AuthenticationService<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthOutcome, AuthError> {
        // Both unique-constraint surfaces report distinct errors; the
        // storage constraint remains the authoritative race resolver.
        if self.repository.exists_by_username(&command.username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self
            .repository
            .exists_by_email(command.email.as_str())
            .await?
        {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.password_hasher.hash(&command.password)?;
        let verification_token = self
            .token_service
            .issue_verification_token(command.email.as_str())?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash: Some(password_hash),
                first_name: command.first_name,
                last_name: command.last_name,
                enabled: false,
                role: Role::default(),
                provider: Provider::Local,
                verification_token: Some(verification_token.clone()),
            })
            .await?;

        if let Err(e) = self
            .mailer
            .send_verification_email(user.email.as_str(), &user.username, &verification_token)
            .await
        {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                "Failed to send verification email"
            );
        }

        Ok(AuthOutcome {
            user: Some(UserSummary::from(&user)),
            token: None,
            role: None,
            message: "User registered successfully. Please verify your email.".to_string(),
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthOutcome, AuthError> {
        let user = self
            .find_by_identifier(&command.identifier)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Federated accounts carry no local credential.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::IncorrectPassword)?;

        if !self.password_hasher.verify(&command.password, hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        // Verification state is only revealed after password knowledge is
        // proven.
        if !user.enabled {
            return Err(AuthError::EmailNotVerified);
        }

        let token = self
            .token_service
            .issue_access_token(user.email.as_str(), user.role.as_str())?;

        Ok(AuthOutcome {
            user: Some(UserSummary::from(&user)),
            token: Some(token),
            role: Some(user.role),
            message: "Login successful".to_string(),
        })
    }

    async fn verify_email(&self, token: &str) -> Result<AuthOutcome, AuthError> {
        if !self.token_service.validate_verification_token(token) {
            return Err(AuthError::VerificationTokenInvalid);
        }

        let email = self
            .token_service
            .extract_subject(token)
            .map_err(|_| AuthError::EmailExtraction)?;

        // Lookup is by the stored pending token, not by email: this binds
        // consumption to a specific still-pending issuance, so a stale
        // token cannot be replayed after a newer one was issued.
        let mut user = self
            .repository
            .find_by_verification_token(token)
            .await?
            .ok_or(AuthError::UnknownVerificationToken)?;

        if user.email.as_str() != email {
            return Err(AuthError::TokenEmailMismatch);
        }

        if user.enabled {
            return Ok(AuthOutcome::message_only("Email already verified"));
        }

        user.enabled = true;
        user.verification_token = None;
        let user = self.repository.update(&user).await?;

        if let Err(e) = self
            .mailer
            .send_welcome_email(user.email.as_str(), &user.username)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send welcome email");
        }

        Ok(AuthOutcome {
            user: Some(UserSummary::from(&user)),
            token: None,
            role: None,
            message: "Email verified successfully".to_string(),
        })
    }

    async fn resend_verification(&self, email: &str) -> Result<AuthOutcome, AuthError> {
        let mut user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.enabled {
            return Err(AuthError::AlreadyVerified);
        }

        let token = self
            .token_service
            .issue_verification_token(user.email.as_str())?;
        user.verification_token = Some(token.clone());
        let user = self.repository.update(&user).await?;

        if let Err(e) = self
            .mailer
            .send_verification_email(user.email.as_str(), &user.username, &token)
            .await
        {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                "Failed to resend verification email"
            );
        }

        Ok(AuthOutcome::message_only("Verification email sent"))
    }
}
