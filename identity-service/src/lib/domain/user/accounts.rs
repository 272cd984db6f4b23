use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenService;
use chrono::Utc;

use crate::user::errors::AuthError;
use crate::user::models::AuthOutcome;
use crate::user::models::FederatedIdentity;
use crate::user::models::NewUser;
use crate::user::models::Provider;
use crate::user::models::Role;
use crate::user::models::RoleChange;
use crate::user::models::User;
use crate::user::models::UserSummary;
use crate::user::ports::AccountPort;
use crate::user::ports::UserRepository;

/// Account provisioning for identities asserted by an external provider,
/// plus administrative role changes.
///
/// Federated accounts are pre-verified (the provider vouched for the email)
/// and carry no local credential, so password login is permanently closed
/// for them.
pub struct AccountService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    token_service: Arc<TokenService>,
}

impl<R> AccountService<R>
where
    R: UserRepository,
{
    pub fn new(repository: Arc<R>, token_service: Arc<TokenService>) -> Self {
        Self {
            repository,
            token_service,
        }
    }

    /// Find-or-create keyed on the asserted email. The generated username
    /// is `first.last` lowercased with a short numeric suffix; it is a
    /// display handle, not a login credential, so a rare collision surfaces
    /// as a storage constraint error rather than silent reuse.
    async fn find_or_create(&self, identity: &FederatedIdentity) -> Result<User, AuthError> {
        if let Some(user) = self.repository.find_by_email(identity.email.as_str()).await? {
            return Ok(user);
        }

        let suffix = Utc::now().timestamp_millis() % 1000;
        let username = format!(
            "{}.{}{}",
            identity.first_name.to_lowercase(),
            identity.last_name.to_lowercase(),
            suffix
        );

        self.repository
            .create(NewUser {
                username,
                email: identity.email.clone(),
                password_hash: None,
                first_name: identity.first_name.clone(),
                last_name: identity.last_name.clone(),
                enabled: true,
                role: Role::default(),
                provider: Provider::Federated,
                verification_token: None,
            })
            .await
    }
}

#[async_trait]
impl<R> AccountPort for AccountService<R>
where
    R: UserRepository,
{
    async fn federated_login(&self, identity: FederatedIdentity) -> Result<AuthOutcome, AuthError> {
        let user = self.find_or_create(&identity).await?;

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

    async fn change_role(&self, change: RoleChange) -> Result<User, AuthError> {
        // Id takes precedence when both targets are supplied. An empty
        // email string is no target at all, not a lookup that misses.
        let mut user = if let Some(id) = change.user_id {
            self.repository.find_by_id(id).await?
        } else if let Some(email) = change.email.as_deref().filter(|e| !e.is_empty()) {
            self.repository.find_by_email(email).await?
        } else {
            return Err(AuthError::MissingRoleTarget);
        }
        .ok_or(AuthError::UserNotFound)?;

        user.role = change.role;
        self.repository.update(&user).await
    }
}
