use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::errors::TokenError;

/// Symmetric signing codec for identity tokens.
///
/// Encodes a claim set into the compact three-segment signed wire form
/// (header, claims, signature) and verifies it back, using HMAC-SHA256.
/// Holds both key halves derived from one injected secret; there is no
/// ambient or static key lookup.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec over a symmetric secret.
    ///
    /// The secret should be at least 256 bits for HS256 and come from
    /// configuration, never from code.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign and serialize a claim set.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the claim set.
    ///
    /// Expiry is checked with zero leeway; signature, expiry and structure
    /// are independent gates and each failure maps to its own error.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_encode_and_decode_round_trip() {
        let codec = TokenCodec::new(SECRET);
        let claims = TokenClaims::new("user123", Duration::hours(1)).with_role("ADMIN");

        let token = codec.encode(&claims).expect("Failed to encode token");
        let decoded = codec.decode(&token).expect("Failed to decode token");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_wire_format_has_three_segments() {
        let codec = TokenCodec::new(SECRET);
        let claims = TokenClaims::new("user123", Duration::hours(1));

        let token = codec.encode(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_decode_with_wrong_secret_fails() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"another_secret_at_least_32_bytes!!");

        let token = codec
            .encode(&TokenClaims::new("user123", Duration::hours(1)))
            .unwrap();

        assert!(matches!(
            other.decode(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_decode_expired_token_fails() {
        let codec = TokenCodec::new(SECRET);
        let claims = TokenClaims::new("user123", Duration::seconds(-30));

        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let codec = TokenCodec::new(SECRET);
        assert!(matches!(
            codec.decode("not.a.token"),
            Err(TokenError::Malformed(_))
        ));
    }
}
