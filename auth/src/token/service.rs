use chrono::Duration;

use super::claims::TokenClaims;
use super::claims::TokenKind;
use super::codec::TokenCodec;
use super::errors::TokenError;

/// Issues and validates the two token families of the identity service.
///
/// Access tokens are short-lived and carry the subject's role; verification
/// tokens are longer-lived, single-purpose proofs of email ownership. Both
/// are signed by the same [`TokenCodec`], and the embedded kind claim keeps
/// the namespaces apart: `validate_verification_token` accepts nothing but
/// an explicit verification kind, and `validate_access_token` rejects any
/// token tagged as verification.
///
/// Expiry is evaluated lazily at validation time by wall-clock comparison;
/// there is no active eviction and no revocation list. All operations are
/// pure functions of (payload, key, clock).
pub struct TokenService {
    codec: TokenCodec,
    access_ttl: Duration,
    verification_ttl: Duration,
}

impl TokenService {
    /// Create a token service over a codec and the two TTLs.
    ///
    /// The verification TTL is expected to be materially longer than the
    /// access TTL (typically 24h vs 1h); both come from configuration.
    pub fn new(codec: TokenCodec, access_ttl: Duration, verification_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            verification_ttl,
        }
    }

    /// Mint an access token for `subject` embedding the given role.
    pub fn issue_access_token(&self, subject: &str, role: &str) -> Result<String, TokenError> {
        let claims = TokenClaims::new(subject, self.access_ttl)
            .with_kind(TokenKind::Access)
            .with_role(role);

        self.codec.encode(&claims)
    }

    /// Mint a single-use email-verification token bound to `email`.
    pub fn issue_verification_token(&self, email: &str) -> Result<String, TokenError> {
        let claims =
            TokenClaims::new(email, self.verification_ttl).with_kind(TokenKind::Verification);

        self.codec.encode(&claims)
    }

    /// Extract the subject from a token.
    ///
    /// Fails if the signature is invalid, the token is expired, or the
    /// payload is structurally malformed.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.codec.decode(token)?.sub)
    }

    /// Extract the role claim from a token.
    ///
    /// Returns `None` for tokens minted before role embedding. Callers must
    /// treat that as "unknown, resolve elsewhere", never as an authorization
    /// decision.
    pub fn extract_role(&self, token: &str) -> Result<Option<String>, TokenError> {
        Ok(self.codec.decode(token)?.role)
    }

    /// Whether a token is past its expiry.
    ///
    /// Fail-closed: an unparseable or tampered token reports expired.
    pub fn is_expired(&self, token: &str) -> bool {
        self.codec.decode(token).is_err()
    }

    /// Validate an access token against an expected subject.
    ///
    /// True iff the signature verifies, the token is not expired, the
    /// subject matches, and the token is not from the verification
    /// namespace. Legacy access tokens without a kind claim are accepted.
    pub fn validate_access_token(&self, token: &str, expected_subject: &str) -> bool {
        match self.codec.decode(token) {
            Ok(claims) => {
                claims.sub == expected_subject && claims.kind != Some(TokenKind::Verification)
            }
            Err(_) => false,
        }
    }

    /// Validate an email-verification token.
    ///
    /// True iff the signature verifies, the token is not expired, and the
    /// kind claim is explicitly `verification`. A missing kind claim or any
    /// other kind value is rejected.
    pub fn validate_verification_token(&self, token: &str) -> bool {
        match self.codec.decode(token) {
            Ok(claims) => claims.kind == Some(TokenKind::Verification),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn service() -> TokenService {
        TokenService::new(
            TokenCodec::new(SECRET),
            Duration::hours(1),
            Duration::hours(24),
        )
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();

        let token = service.issue_access_token("carol@x.com", "ADMIN").unwrap();

        assert_eq!(service.extract_subject(&token).unwrap(), "carol@x.com");
        assert_eq!(service.extract_role(&token).unwrap().as_deref(), Some("ADMIN"));
        assert!(!service.is_expired(&token));
        assert!(service.validate_access_token(&token, "carol@x.com"));
    }

    #[test]
    fn test_access_token_subject_mismatch() {
        let service = service();
        let token = service.issue_access_token("carol@x.com", "USER").unwrap();

        assert!(!service.validate_access_token(&token, "mallory@x.com"));
    }

    #[test]
    fn test_verification_token_has_no_role() {
        let service = service();
        let token = service.issue_verification_token("alice@x.com").unwrap();

        assert_eq!(service.extract_subject(&token).unwrap(), "alice@x.com");
        assert_eq!(service.extract_role(&token).unwrap(), None);
        assert!(service.validate_verification_token(&token));
    }

    #[test]
    fn test_kind_confusion_is_rejected_both_ways() {
        let service = service();

        let access = service.issue_access_token("alice@x.com", "USER").unwrap();
        let verification = service.issue_verification_token("alice@x.com").unwrap();

        // An access token never passes the verification gate.
        assert!(!service.validate_verification_token(&access));
        // A verification token never passes the access gate.
        assert!(!service.validate_access_token(&verification, "alice@x.com"));
    }

    #[test]
    fn test_token_without_kind_claim_fails_verification_gate() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(&TokenClaims::new("alice@x.com", Duration::hours(1)))
            .unwrap();

        // Correctly signed and unexpired, but the kind claim is absent.
        assert!(!service().validate_verification_token(&token));
    }

    #[test]
    fn test_legacy_access_token_without_kind_is_accepted() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(&TokenClaims::new("alice@x.com", Duration::hours(1)))
            .unwrap();

        let service = service();
        assert!(service.validate_access_token(&token, "alice@x.com"));
        assert_eq!(service.extract_role(&token).unwrap(), None);
    }

    #[test]
    fn test_expired_token_is_reported_expired() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(
                &TokenClaims::new("alice@x.com", Duration::seconds(-120))
                    .with_kind(TokenKind::Access)
                    .with_role("USER"),
            )
            .unwrap();

        let service = service();
        assert!(service.is_expired(&token));
        assert!(!service.validate_access_token(&token, "alice@x.com"));
    }

    #[test]
    fn test_expired_verification_token_is_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(
                &TokenClaims::new("alice@x.com", Duration::seconds(-120))
                    .with_kind(TokenKind::Verification),
            )
            .unwrap();

        assert!(!service().validate_verification_token(&token));
    }

    #[test]
    fn test_tampered_token_fails_closed() {
        let service = service();
        let token = service.issue_access_token("alice@x.com", "USER").unwrap();

        let mut segments: Vec<&str> = token.split('.').collect();
        segments[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let forged = segments.join(".");

        assert!(service.is_expired(&forged));
        assert!(!service.validate_access_token(&forged, "alice@x.com"));
        assert!(service.extract_subject(&forged).is_err());
    }

    #[test]
    fn test_key_rotation_fails_closed() {
        // A token minted under the old key must be rejected by a service
        // holding the rotated key, never silently accepted.
        let old = service();
        let rotated = TokenService::new(
            TokenCodec::new(b"rotated_secret_at_least_32_bytes!!"),
            Duration::hours(1),
            Duration::hours(24),
        );

        let token = old.issue_access_token("carol@x.com", "ADMIN").unwrap();

        assert!(rotated.is_expired(&token));
        assert!(!rotated.validate_access_token(&token, "carol@x.com"));
        assert!(rotated.extract_subject(&token).is_err());
    }
}
