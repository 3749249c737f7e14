//! Connection settings and their rendering into client arguments.

use std::fmt::Write as _;
use std::path::PathBuf;

/// Text substituted for the password in masked renderings.
pub const PASSWORD_MASK: &str = "XXXXX";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Whether a rendering may contain the real password.
pub enum Masking {
    /// Render the real password (used for the actual process invocation).
    Plain,
    /// Replace the password with [`PASSWORD_MASK`] (logs and previews).
    Masked,
}

#[derive(Clone, Default, PartialEq, Eq)]
/// Connection settings used for every client invocation.
pub struct ConnectionSettings {
    /// Vault server host name.
    pub host: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Whether to pass `-ssl`.
    pub use_ssl: bool,
    /// Explicit path to the client executable; skips discovery when set.
    pub client_path: Option<PathBuf>,
    /// Whether logged command lines mask the password.
    pub mask_password: bool,
}

impl ConnectionSettings {
    /// Creates settings for a host and credentials, without SSL.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Enables `-ssl`.
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self
    }

    /// Uses an explicit client executable instead of discovering one.
    #[must_use]
    pub fn with_client_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_path = Some(path.into());
        self
    }

    /// Masks the password in logged command lines.
    #[must_use]
    pub fn with_masked_password(mut self) -> Self {
        self.mask_password = true;
        self
    }

    /// Renders the connection argument fragment.
    ///
    /// The fragment ends with a space so a command name can be appended
    /// directly: `-host H -user "U" -password "P" [-ssl ]`.
    pub fn connection_args(&self, masking: Masking) -> String {
        let password = match masking {
            Masking::Plain => self.password.as_str(),
            Masking::Masked => PASSWORD_MASK,
        };
        let mut out = String::new();
        let _ = write!(
            out,
            "-host {} -user \"{}\" -password \"{}\" ",
            self.host, self.username, password
        );
        if self.use_ssl {
            out.push_str("-ssl ");
        }
        out
    }

    /// Masking to apply when logging command lines.
    pub(crate) fn log_masking(&self) -> Masking {
        if self.mask_password {
            Masking::Masked
        } else {
            Masking::Plain
        }
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &PASSWORD_MASK)
            .field("use_ssl", &self.use_ssl)
            .field("client_path", &self.client_path)
            .field("mask_password", &self.mask_password)
            .finish()
    }
}
