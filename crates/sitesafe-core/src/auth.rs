//! Authorization gate
//!
//! Entry points of the record store facade and the services take an
//! `AuthorizedSession`. The only way to obtain one is through an `AuthGate`,
//! so every call is tied to an explicit, request-scoped authorization.

use chrono::NaiveDateTime;
use subtle::ConstantTimeEq;

use crate::clock::Clock;
use crate::error::AppError;

/// Proof that the caller passed the authentication gate.
#[derive(Debug, Clone)]
pub struct AuthorizedSession {
    subject: String,
    authorized_at: NaiveDateTime,
}

impl AuthorizedSession {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn authorized_at(&self) -> NaiveDateTime {
        self.authorized_at
    }
}

pub trait AuthGate: Send + Sync {
    /// Check a credential and mint a session token when it is accepted.
    fn authorize(&self, subject: &str, credential: &str) -> Result<AuthorizedSession, AppError>;
}

/// Shared-secret gate: a single application password.
pub struct PasswordGate<C: Clock> {
    password: String,
    clock: C,
}

impl<C: Clock> PasswordGate<C> {
    pub fn new(password: impl Into<String>, clock: C) -> Self {
        Self {
            password: password.into(),
            clock,
        }
    }
}

impl<C: Clock> AuthGate for PasswordGate<C> {
    fn authorize(&self, subject: &str, credential: &str) -> Result<AuthorizedSession, AppError> {
        if self.password.is_empty() {
            return Err(AppError::Config("APP_PASSWORD is empty".to_string()));
        }

        let matches: bool = self
            .password
            .as_bytes()
            .ct_eq(credential.as_bytes())
            .into();
        if !matches {
            tracing::warn!(subject = %subject, "Rejected login attempt");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        Ok(AuthorizedSession {
            subject: subject.to_string(),
            authorized_at: self.clock.now(),
        })
    }
}
