/*!
 * Admin access gating
 *
 * How credentials are verified is up to the caller: anything implementing
 * [`CredentialCheck`] can back a [`Session`]. The session is an explicit
 * value handed to every admin operation, created when a user starts and
 * cleared on logout.
 */

use tracing::{info, warn};

use crate::bail;
use crate::error::Result;

/// Default admin username
pub const DEFAULT_ADMIN_USER: &str = "admin";

/// Default admin password
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Trait for verifying admin credentials
pub trait CredentialCheck {
    /// Whether the pair grants admin capability
    fn check(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialCheck for F
where
    F: Fn(&str, &str) -> bool,
{
    fn check(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

/// Compares against one fixed username/password pair
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    /// Create a checker for the given pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_USER, DEFAULT_ADMIN_PASSWORD)
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialCheck for StaticCredentials {
    fn check(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Per-user session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    admin: Option<String>,
}

impl Session {
    /// A fresh student session
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to elevate this session to admin
    pub fn login<C: CredentialCheck + ?Sized>(
        &mut self,
        checker: &C,
        username: &str,
        password: &str,
    ) -> Result<()> {
        if !checker.check(username, password) {
            warn!(user = username, "rejected admin login");
            bail!(Unauthorized, "invalid username or password");
        }

        info!(user = username, "admin logged in");
        self.admin = Some(username.to_string());
        Ok(())
    }

    /// Drop admin capability
    pub fn logout(&mut self) {
        if let Some(user) = self.admin.take() {
            info!(user = user.as_str(), "admin logged out");
        }
    }

    /// Whether this session may run admin operations
    pub fn is_admin(&self) -> bool {
        self.admin.is_some()
    }

    /// Name of the logged in admin, if any
    pub fn admin_user(&self) -> Option<&str> {
        self.admin.as_deref()
    }

    /// Fail with `Unauthorized` unless logged in as admin
    pub fn require_admin(&self) -> Result<()> {
        if !self.is_admin() {
            bail!(Unauthorized, "admin login required");
        }
        Ok(())
    }
}
