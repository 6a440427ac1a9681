//! Authentication gate in front of the discovery session.
//!
//! The gate is a two-state machine (signed out, signed in as a user id) built
//! once at startup around an [`IdentityProvider`]. Observers registered with
//! [`AuthGate::observe`] receive every transition; the session uses this to
//! feed `AuthChanged` events into the controller.

use serde::Serialize;
use std::sync::Mutex;

/// Authentication status as seen by the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub authenticated: bool,
    pub user_id: Option<String>,
}

impl AuthState {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Login failed: {0}")]
    AuthFailed(String),
}

/// A source of user identities.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolve the identity of the current user.
    fn sign_in(&self) -> Result<String, AuthError>;
}

/// Identity taken from configuration or the login environment.
pub struct LocalIdentity {
    account: Option<String>,
}

impl LocalIdentity {
    pub fn new(account: Option<String>) -> Self {
        Self { account }
    }
}

impl IdentityProvider for LocalIdentity {
    fn name(&self) -> &'static str {
        "local"
    }

    fn sign_in(&self) -> Result<String, AuthError> {
        resolve_account(self.account.as_deref(), |key| std::env::var(key).ok())
    }
}

/// Pick the configured account, else `USER`, else `LOGNAME`.
pub(crate) fn resolve_account<F>(configured: Option<&str>, env: F) -> Result<String, AuthError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(account) = configured {
        let account = account.trim();
        if account.is_empty() {
            return Err(AuthError::AuthFailed("configured account is blank".to_string()));
        }
        return Ok(account.to_string());
    }

    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|key| env(key))
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .ok_or_else(|| AuthError::AuthFailed("no login name available".to_string()))
}

type Observer = Box<dyn Fn(&AuthState) + Send>;

/// Sign-in gate with transition observers.
pub struct AuthGate {
    provider: Box<dyn IdentityProvider>,
    state: Mutex<AuthState>,
    observers: Mutex<Vec<Observer>>,
}

impl AuthGate {
    pub fn new(provider: Box<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(AuthState::signed_out()),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn state(&self) -> AuthState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Register a sink for every future transition.
    pub fn observe<F>(&self, sink: F)
    where
        F: Fn(&AuthState) + Send + 'static,
    {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(Box::new(sink));
        }
    }

    /// Sign in through the identity provider.
    ///
    /// Signing in while already signed in returns the current state without a
    /// transition.
    pub fn sign_in(&self) -> Result<AuthState, AuthError> {
        let current = self.state();
        if current.authenticated {
            return Ok(current);
        }

        let user_id = self.provider.sign_in()?;
        let next = AuthState::signed_in(user_id);
        self.transition(next.clone());
        Ok(next)
    }

    pub fn sign_out(&self) {
        if self.state().authenticated {
            self.transition(AuthState::signed_out());
        }
    }

    fn transition(&self, next: AuthState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next.clone();
        }
        if let Ok(observers) = self.observers.lock() {
            for observer in observers.iter() {
                observer(&next);
            }
        }
    }
}
