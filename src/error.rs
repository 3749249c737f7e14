use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
/// Errors returned by this crate.
///
/// Variants that originate from the Vault client keep its output verbatim so
/// that environment or version mismatches can be diagnosed from the message.
pub enum VaultError {
    /// A required argument was empty. Raised before any process is started.
    #[error("invalid argument: {0} must not be empty")]
    InvalidArgument(&'static str),
    /// The Vault client executable could not be located.
    #[error("vault client not available: {0}")]
    ClientUnavailable(String),
    /// The client wrote to its error stream.
    #[error("error executing vault: {0}")]
    Invocation(String),
    /// The client output was not an XML document.
    #[error("unable to load XML from vault: {0}")]
    MalformedResponse(String),
    /// The client output was XML but did not have the expected shape.
    #[error("unexpected XML returned from vault: {0}")]
    UnexpectedResponse(String),
    /// The client reported a failed operation.
    ///
    /// Carries the message from the response's `<error>` element (possibly
    /// empty).
    #[error("vault rejected the operation: {0}")]
    Rejected(String),
    /// The path is not known to source control (for example, it has no history).
    #[error("path not recognized by source control: {0}")]
    PathNotRecognized(String),
    /// An I/O error occurred while spawning the client or staging files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Provider configuration could not be loaded or is incomplete.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VaultError {
    /// Returns the message reported by the Vault client, if this error carries one.
    pub fn client_message(&self) -> Option<&str> {
        match self {
            Self::Invocation(msg) | Self::Rejected(msg) => Some(msg),
            _ => None,
        }
    }
}

pub(crate) fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str, VaultError> {
    if value.is_empty() {
        return Err(VaultError::InvalidArgument(name));
    }
    Ok(value)
}
