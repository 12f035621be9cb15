use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::auth::driven_ports::{CredentialVerifier, TokenAuthority, TokenError};
use crate::domain::auth::{Credentials, IssuedToken, Principal};

/// How long an issued session token stays valid
const TOKEN_TTL_SECONDS: i64 = 1800;

/// Wire shape of the signed claims inside a session token
#[derive(Serialize, Deserialize)]
struct Claims {
    email: String,
    iat: i64,
    exp: i64,
}

/// [TokenAuthority] backed by HMAC-signed JWTs. Expiry is validated as part of
/// decoding, so [TokenAuthority::verify] needs no separate clock check.
pub struct HmacTokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl HmacTokenAuthority {
    pub fn new(secret: &[u8]) -> HmacTokenAuthority {
        Self::with_ttl(secret, Duration::seconds(TOKEN_TTL_SECONDS))
    }

    /// Authority with a caller-chosen token lifetime
    pub fn with_ttl(secret: &[u8], token_ttl: Duration) -> HmacTokenAuthority {
        HmacTokenAuthority {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
        }
    }
}

impl TokenAuthority for HmacTokenAuthority {
    fn issue(&self, principal: &Principal) -> Result<IssuedToken, anyhow::Error> {
        let now = Utc::now();
        let claims = Claims {
            email: principal.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token })
    }

    fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|decode_err| match decode_err.kind() {
                // A failing crypto backend is our problem, not the caller's
                ErrorKind::Crypto(_) => TokenError::PortError(decode_err.into()),
                _ => TokenError::Rejected,
            })?;

        Ok(Principal {
            email: token_data.claims.email,
        })
    }
}

/// The development stand-in for a real identity provider: exactly one
/// recognized email/password pair. Swapping this for a production
/// [CredentialVerifier] happens where the login route wires its adapters.
pub struct FixedCredentialChecker {
    email: &'static str,
    password: &'static str,
}

impl FixedCredentialChecker {
    pub fn development() -> FixedCredentialChecker {
        FixedCredentialChecker {
            email: "test@example.com",
            password: "myTestPassword",
        }
    }
}

impl CredentialVerifier for FixedCredentialChecker {
    async fn verify(&self, credentials: &Credentials) -> Result<Option<Principal>, anyhow::Error> {
        let matched = credentials.email == self.email && credentials.password == self.password;

        Ok(matched.then(|| Principal {
            email: credentials.email.clone(),
        }))
    }
}
