use crate::domain::auth::driven_ports::{CredentialVerifier, TokenAuthority};
use anyhow::Context;
use derive_more::Display;

/// Login credentials as submitted by a client. Displays as the email alone so
/// log lines never carry the password.
#[derive(Display)]
#[display("{email}")]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The authenticated identity embedded in (and recovered from) a session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct IssuedToken {
    pub token: String,
}

pub mod driven_ports {
    use super::*;
    use thiserror::Error;

    /// Pluggable credential-verification capability. The fixed development
    /// pair in [crate::security] is one implementation; a call out to a real
    /// identity provider would be another.
    pub trait CredentialVerifier {
        /// Resolves credentials to a principal, or [None] when they match no
        /// known identity
        async fn verify(
            &self,
            credentials: &Credentials,
        ) -> Result<Option<Principal>, anyhow::Error>;
    }

    #[derive(Debug, Error)]
    pub enum TokenError {
        #[error("token failed signature or expiry verification")]
        Rejected,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    /// Signs and verifies session tokens. Both directions are synchronous;
    /// verification must finish before any downstream handler runs.
    pub trait TokenAuthority {
        fn issue(&self, principal: &Principal) -> Result<IssuedToken, anyhow::Error>;
        fn verify(&self, token: &str) -> Result<Principal, TokenError>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum LoginError {
        #[error("invalid username and/or password")]
        BadCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[cfg(test)]
    #[allow(clippy::items_after_test_module)]
    mod login_error_clone {
        use super::LoginError;
        use anyhow::anyhow;

        impl Clone for LoginError {
            fn clone(&self) -> Self {
                match self {
                    Self::BadCredentials => Self::BadCredentials,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }
    }

    pub trait LoginPort {
        async fn login(
            &self,
            credentials: &Credentials,
            cred_check: &impl driven_ports::CredentialVerifier,
            tokens: &impl driven_ports::TokenAuthority,
        ) -> Result<IssuedToken, LoginError>;
    }
}

pub struct AuthService {}

impl driving_ports::LoginPort for AuthService {
    async fn login(
        &self,
        credentials: &Credentials,
        cred_check: &impl CredentialVerifier,
        tokens: &impl TokenAuthority,
    ) -> Result<IssuedToken, driving_ports::LoginError> {
        let principal = cred_check
            .verify(credentials)
            .await
            .context("verifying login credentials")?;
        let Some(principal) = principal else {
            return Err(driving_ports::LoginError::BadCredentials);
        };

        let issued = tokens
            .issue(&principal)
            .context("signing a session token")?;

        Ok(issued)
    }
}
