//! Authentication primitives library
//!
//! Provides the credential building blocks for the identity service:
//! - Password hashing (Argon2id)
//! - Signed identity tokens: access tokens and single-use email-verification
//!   tokens, kept in cryptographically distinct namespaces via a signed
//!   `kind` claim
//!
//! Token issuance and validation are pure functions of (claims, signing key,
//! clock); nothing in this crate performs I/O or holds shared mutable state,
//! so everything here may be called concurrently without coordination.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Token Lifecycle
//! ```
//! use auth::{TokenCodec, TokenService};
//! use chrono::Duration;
//!
//! let service = TokenService::new(
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!"),
//!     Duration::hours(1),
//!     Duration::hours(24),
//! );
//!
//! let token = service.issue_access_token("alice@example.com", "USER").unwrap();
//! assert_eq!(service.extract_subject(&token).unwrap(), "alice@example.com");
//! assert!(service.validate_access_token(&token, "alice@example.com"));
//!
//! // A verification token is never accepted where an access token is expected.
//! let verification = service.issue_verification_token("alice@example.com").unwrap();
//! assert!(service.validate_verification_token(&verification));
//! assert!(!service.validate_access_token(&verification, "alice@example.com"));
//! ```

pub mod password;
pub mod token;

pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenClaims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TokenKind;
pub use token::TokenService;
