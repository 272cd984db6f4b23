use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Discriminates the two token namespaces carried by one signing key.
///
/// The kind lives inside the signed payload, so an attacker holding a
/// long-lived verification token cannot replay it as an access token
/// (or vice versa) without breaking the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Verification,
}

/// Signed claim set for identity tokens.
///
/// `kind` and `role` are optional on the wire: tokens minted before role
/// embedding carry neither, and verification tokens never carry a role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject: username or email depending on the token kind
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TokenKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TokenClaims {
    /// Create claims expiring `ttl` from now.
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind: None,
            role: None,
        }
    }

    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_sets_expiry_relative_to_issued_at() {
        let claims = TokenClaims::new("alice", Duration::hours(24));
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert!(claims.kind.is_none());
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_builder_sets_kind_and_role() {
        let claims = TokenClaims::new("alice", Duration::hours(1))
            .with_kind(TokenKind::Access)
            .with_role("ADMIN");

        assert_eq!(claims.kind, Some(TokenKind::Access));
        assert_eq!(claims.role.as_deref(), Some("ADMIN"));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let claims = TokenClaims::new("a@x.com", Duration::hours(1))
            .with_kind(TokenKind::Verification);

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"kind\":\"verification\""));
        assert!(!json.contains("role"));
    }
}
