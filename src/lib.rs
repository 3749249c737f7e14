//! Source-control adapter for the SourceGear Vault command-line client.
//!
//! This crate does not speak Vault's protocol itself. Each operation runs the
//! installed client (`vault` / `vault.exe`), validates the XML document it
//! prints, and maps the result into typed values. Nothing is cached locally
//! except the location of the client executable.
//!
//! Most users should start with [`VaultProvider`].
//!
//! ## Getting started
//!
//! ```rust,no_run
//! use vault_adapter::{ConnectionSettings, VaultProvider};
//!
//! fn main() -> vault_adapter::Result<()> {
//!     let settings = ConnectionSettings::new("vault.example.com", "build", "secret")
//!         .with_ssl()
//!         .with_masked_password();
//!     let provider = VaultProvider::new(settings);
//!
//!     let listing = provider.get_directory_entry("Main$/trunk")?;
//!     for file in &listing.files {
//!         println!("{}", file.path);
//!     }
//!
//!     let rev = provider.get_current_revision("Main$/trunk")?;
//!     println!("trunk is at version {rev}");
//!     Ok(())
//! }
//! ```
//!
//! ## Paths
//!
//! Paths are written `repository$/folder/file`. A path without the `$`
//! marker selects no repository; listing it returns the server's
//! repositories. See [`VaultPath`].
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` on the returned data types.
//! - `config` (default, implies `serde`): [`ProviderConfig`], TOML-backed
//!   provider settings.
//!
//! ## Testing without a client
//!
//! All process execution goes through [`ProcessRunner`]; pass your own
//! implementation to [`VaultProvider::with_runner`].

#![deny(unsafe_code)]

mod catalog;
mod command;
#[cfg(feature = "config")]
mod config;
mod error;
mod locate;
mod path;
mod provider;
mod response;
mod settings;
mod types;

pub use catalog::{Commands, available_commands};
pub use command::{CommandInvocation, CommandResult, ProcessRunner, SystemRunner};
#[cfg(feature = "config")]
pub use config::ProviderConfig;
pub use error::VaultError;
/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, VaultError>;
pub use path::{DIRECTORY_SEPARATOR, REPOSITORY_MARKER, ROOT, VaultPath};
pub use provider::VaultProvider;
pub use response::{VaultResponse, parse_response};
pub use settings::{ConnectionSettings, Masking, PASSWORD_MASK};
pub use types::{ClientCommand, DirectoryEntry, FileEntry, Revision};
