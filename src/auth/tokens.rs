use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token. `email` is the identity claim the
/// session guard resolves back to a user; `fullname` rides along so clients
/// can display it without an extra round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub fullname: String,
    pub exp: usize,
}

/// HS256 signing material, built once at startup from the configured secret
/// and shared read-only across requests.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the clock at validation time, with no
        // grace window.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a signed token expiring `ttl` from now.
    pub fn issue(
        &self,
        email: &str,
        fullname: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expires_at = Utc::now() + ttl;
        let claims = Claims {
            email: email.to_owned(),
            fullname: fullname.to_owned(),
            exp: expires_at.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Expired, malformed and badly signed tokens all come back as `None`.
    /// Rejection is an expected, frequent condition, so it is a value the
    /// caller branches on rather than an error to propagate.
    pub fn validate(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }
}
