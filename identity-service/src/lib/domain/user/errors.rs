use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct InvalidRoleError(pub String);

/// Error for Provider parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown provider: {0}")]
pub struct InvalidProviderError(pub String);

/// Error for outbound email delivery
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Invalid recipient or sender address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email message: {0}")]
    BuildFailed(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Top-level error for authentication and account operations.
///
/// Every coordinator operation surfaces exactly one of these per failed
/// call. Expected business outcomes (wrong password, unverified email) are
/// values here, never panics; the infrastructure variants at the bottom are
/// reserved for genuinely unexpected faults.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Conflicts (409)
    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Email is already verified")]
    AlreadyVerified,

    // Not found (404)
    #[error("User not found")]
    UserNotFound,

    // Unauthorized (401)
    #[error("Incorrect password")]
    IncorrectPassword,

    // Forbidden (403)
    #[error("Email address has not been verified")]
    EmailNotVerified,

    // Invalid token (400)
    #[error("Invalid or expired verification token")]
    VerificationTokenInvalid,

    #[error("Could not extract email from verification token")]
    EmailExtraction,

    #[error("No pending verification matches this token")]
    UnknownVerificationToken,

    #[error("Token subject does not match the account email")]
    TokenEmailMismatch,

    // Bad request (400)
    #[error("Either userId or email must be provided")]
    MissingRoleTarget,

    // Value object validation
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Infrastructure
    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error("Database error: {0}")]
    Database(String),
}
