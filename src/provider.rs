use std::cell::OnceCell;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{self, Commands};
use crate::command::{CommandInvocation, ProcessRunner, SystemRunner};
use crate::error::require;
use crate::locate::find_client;
use crate::path::REPOSITORY_MARKER;
use crate::response::{VaultResponse, attribute_or_child, inner_text, parse_response};
use crate::settings::Masking;
#[cfg(feature = "config")]
use crate::ProviderConfig;
use crate::{ConnectionSettings, DirectoryEntry, FileEntry, Revision, VaultError, VaultPath};

/// Source-control provider backed by the Vault command-line client.
///
/// Every operation runs at most one client process and blocks until it
/// exits. The resolved client path is cached for the lifetime of the
/// provider. A provider is meant to be used from one thread at a time.
pub struct VaultProvider<R = SystemRunner> {
    settings: ConnectionSettings,
    runner: R,
    client_path: OnceCell<PathBuf>,
}

impl<R> std::fmt::Debug for VaultProvider<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultProvider")
            .field("settings", &self.settings)
            .field("client_path", &self.client_path.get())
            .finish_non_exhaustive()
    }
}

impl VaultProvider<SystemRunner> {
    /// Creates a provider that runs the client on the local machine.
    pub fn new(settings: ConnectionSettings) -> Self {
        Self::with_runner(settings, SystemRunner)
    }

    /// Validates a persisted configuration and creates a provider from it.
    #[cfg(feature = "config")]
    pub fn from_config(config: &ProviderConfig) -> Result<Self, VaultError> {
        config.validate()?;
        Ok(Self::new(config.to_connection_settings()))
    }
}

impl<R: ProcessRunner> VaultProvider<R> {
    /// Creates a provider that runs the client through `runner`.
    pub fn with_runner(settings: ConnectionSettings, runner: R) -> Self {
        Self {
            settings,
            runner,
            client_path: OnceCell::new(),
        }
    }

    /// Returns the connection settings.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Returns the process runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Whether this provider can answer [`Self::client_command_help`].
    pub fn supports_command_help(&self) -> bool {
        true
    }

    /// Resolves (and caches) the client executable path.
    pub fn client_path(&self) -> Result<&Path, VaultError> {
        if let Some(path) = self.client_path.get() {
            return Ok(path.as_path());
        }
        let path = find_client(&self.settings, &self.runner)?;
        Ok(self.client_path.get_or_init(|| path).as_path())
    }

    /// Returns `true` if the client executable can be located.
    pub fn is_available(&self) -> bool {
        self.client_path().is_ok()
    }

    /// Checks the connection settings by listing repositories.
    pub fn validate_connection(&self) -> Result<(), VaultError> {
        self.run(&CommandInvocation::new("LISTREPOSITORIES"))?;
        Ok(())
    }

    /// Runs one invocation and validates its response.
    pub fn run(&self, invocation: &CommandInvocation) -> Result<VaultResponse, VaultError> {
        let program = self.client_path()?;
        let command_line = invocation.command_line(&self.settings, Masking::Plain);
        debug!(
            program = %program.display(),
            command = %invocation.command_line(&self.settings, self.settings.log_masking()),
            "running vault client"
        );
        let result = self.runner.run(program, &command_line)?;
        debug!(
            command = invocation.command(),
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            "vault client exited"
        );
        parse_response(&result)
    }

    /// Gets the latest version of `source_path` into `target_path`.
    ///
    /// File modification times are set from the repository and no backups of
    /// overwritten files are kept.
    pub fn get_latest(
        &self,
        source_path: &str,
        target_path: impl AsRef<Path>,
    ) -> Result<(), VaultError> {
        require(source_path, "source_path")?;
        let target = destination(target_path.as_ref())?;
        let path = VaultPath::new(source_path);

        self.run(
            &CommandInvocation::new("GET")
                .quoted_arg(path.full_path())
                .option("-repository", path.repository_name())
                .option("-destpath", target.to_string_lossy())
                .arg("-setfiletime modification")
                .arg("-backup no"),
        )?;
        Ok(())
    }

    /// Lists `source_path`.
    ///
    /// Without a repository (`""`, `"$/"`), returns a root entry whose
    /// directories are the server's repositories. Otherwise returns the
    /// folder's immediate subfolders and files, each sorted by name.
    pub fn get_directory_entry(&self, source_path: &str) -> Result<DirectoryEntry, VaultError> {
        let path = VaultPath::new(source_path);
        if path.has_repository() {
            self.list_folder(&path)
        } else {
            self.list_repositories()
        }
    }

    fn list_repositories(&self) -> Result<DirectoryEntry, VaultError> {
        let response = self.run(&CommandInvocation::new("LISTREPOSITORIES"))?;
        let directories = response
            .elements("listrepositories/repository")
            .into_iter()
            .map(|el| {
                let name = attribute_or_child(el, "name").ok_or_else(|| {
                    VaultError::UnexpectedResponse("repository without a name".into())
                })?;
                let path = format!("{name}{REPOSITORY_MARKER}");
                Ok(DirectoryEntry::leaf(name, path))
            })
            .collect::<Result<Vec<_>, VaultError>>()?;

        Ok(DirectoryEntry {
            directories,
            ..DirectoryEntry::default()
        })
    }

    fn list_folder(&self, path: &VaultPath) -> Result<DirectoryEntry, VaultError> {
        let response = self.run(
            &CommandInvocation::new("LISTFOLDER")
                .quoted_arg(path.full_path())
                .option("-repository", path.repository_name())
                .arg("-norecursive"),
        )?;

        let prefix_len = path.full_path().len();
        let mut folders: Vec<String> = response
            .elements("folder/folder")
            .into_iter()
            .map(|el| {
                let full = name_attr(el);
                // Vault echoes the folder's full path, possibly in its own casing.
                full.get(prefix_len..)
                    .unwrap_or(full)
                    .trim_matches('/')
                    .to_string()
            })
            .collect();
        let mut files: Vec<String> = response
            .elements("folder/file")
            .into_iter()
            .map(|el| name_attr(el).to_string())
            .collect();
        folders.sort();
        files.sort();

        Ok(DirectoryEntry {
            name: path.leaf_name().to_string(),
            path: path.to_string(),
            directories: folders
                .into_iter()
                .map(|name| {
                    let child = path.child(&name);
                    DirectoryEntry::leaf(name, child)
                })
                .collect(),
            files: files
                .into_iter()
                .map(|name| FileEntry {
                    path: path.child(&name),
                    name,
                })
                .collect(),
        })
    }

    /// Returns the contents of the file at `source_path`.
    ///
    /// The file is fetched into a temporary staging directory which is removed
    /// before returning, whether or not the fetch succeeded.
    pub fn get_file_contents(&self, source_path: &str) -> Result<Vec<u8>, VaultError> {
        require(source_path, "source_path")?;
        let path = VaultPath::new(source_path);
        require(path.repository_name(), "repository name")?;

        let staging = tempfile::Builder::new().prefix("vault-get-").tempdir()?;
        let staging_path = staging.path().to_path_buf();
        let contents = self.fetch_file(&path, &staging_path);
        if let Err(err) = staging.close() {
            debug!(
                path = %staging_path.display(),
                error = %err,
                "failed to remove staging directory"
            );
        }
        contents
    }

    fn fetch_file(&self, path: &VaultPath, staging: &Path) -> Result<Vec<u8>, VaultError> {
        self.run(
            &CommandInvocation::new("GET")
                .quoted_arg(path.full_path())
                .option("-repository", path.repository_name())
                .option("-destpath", staging.to_string_lossy())
                .arg("-backup no"),
        )?;
        Ok(fs::read(staging.join(path.leaf_name()))?)
    }

    /// Applies `label` to `source_path`.
    pub fn apply_label(&self, label: &str, source_path: &str) -> Result<(), VaultError> {
        require(label, "label")?;
        require(source_path, "source_path")?;
        let path = VaultPath::new(source_path);

        self.run(
            &CommandInvocation::new("LABEL")
                .quoted_arg(path.full_path())
                .quoted_arg(label)
                .option("-repository", path.repository_name()),
        )?;
        Ok(())
    }

    /// Gets the version of `source_path` labeled `label` into `target_path`.
    pub fn get_labeled(
        &self,
        label: &str,
        source_path: &str,
        target_path: impl AsRef<Path>,
    ) -> Result<(), VaultError> {
        require(label, "label")?;
        require(source_path, "source_path")?;
        let target = destination(target_path.as_ref())?;
        let path = VaultPath::new(source_path);

        self.run(
            &CommandInvocation::new("GETLABEL")
                .option("-destpath", target.to_string_lossy())
                .arg("-setfiletime modification")
                .quoted_arg(path.full_path())
                .quoted_arg(label)
                .option("-repository", path.repository_name())
                .arg("-backup no"),
        )?;
        Ok(())
    }

    /// Returns the latest version number recorded for `path`.
    ///
    /// Use [`Revision::to_bytes`] for the persisted byte form.
    pub fn get_current_revision(&self, path: &str) -> Result<Revision, VaultError> {
        require(path, "path")?;
        let vault_path = VaultPath::new(path);

        let response = self.run(
            &CommandInvocation::new("VERSIONHISTORY")
                .quoted_arg(vault_path.full_path())
                .option("-repository", vault_path.repository_name())
                .arg("-rowlimit 1"),
        )?;

        let version = response
            .element("history/item")
            .and_then(|item| item.attributes.get("version"))
            .ok_or_else(|| VaultError::PathNotRecognized(path.to_string()))?;
        let number = version.trim().parse::<u64>().map_err(|_| {
            VaultError::UnexpectedResponse(format!("invalid version number '{version}'"))
        })?;
        Ok(Revision(number))
    }

    /// Runs an arbitrary client command and logs its response.
    ///
    /// `arguments` is appended verbatim. The response is rendered as indented
    /// XML; each non-empty line is logged at `info` level and returned.
    pub fn execute_client_command(
        &self,
        command_name: &str,
        arguments: &str,
    ) -> Result<Vec<String>, VaultError> {
        require(command_name, "command_name")?;
        let mut invocation = CommandInvocation::new(command_name);
        if !arguments.is_empty() {
            invocation = invocation.arg(arguments);
        }

        let lines = self.run(&invocation)?.lines()?;
        for line in &lines {
            info!(command = command_name, "{line}");
        }
        Ok(lines)
    }

    /// Lists the commands understood by the client.
    pub fn available_commands(&self) -> Commands {
        catalog::available_commands()
    }

    /// Returns the client's usage text for `command_name`, if it has any.
    ///
    /// Text before the first `usage:` marker is dropped.
    pub fn client_command_help(&self, command_name: &str) -> Result<Option<String>, VaultError> {
        require(command_name, "command_name")?;
        let response = self.run(&CommandInvocation::new("HELP").arg(command_name))?;
        let Some(usage) = response.element("usage") else {
            return Ok(None);
        };

        let text = inner_text(usage);
        match text.to_ascii_lowercase().find("usage:") {
            Some(idx) => Ok(Some(text[idx..].to_string())),
            None => Ok(Some(text)),
        }
    }

    /// Returns the connection arguments with the password masked.
    pub fn client_command_preview(&self) -> String {
        self.settings.connection_args(Masking::Masked)
    }
}

impl<R> Display for VaultProvider<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vault on {} (User Name: {})",
            self.settings.host, self.settings.username
        )
    }
}

fn name_attr(el: &xmltree::Element) -> &str {
    el.attributes.get("name").map(String::as_str).unwrap_or_default()
}

/// Normalizes a local destination: trailing separators are stripped (the
/// client rejects them) and the path is made absolute.
fn destination(target: &Path) -> Result<PathBuf, VaultError> {
    if target.as_os_str().is_empty() {
        return Err(VaultError::InvalidArgument("target_path"));
    }
    let raw = target.to_string_lossy();
    let trimmed = match raw.trim_end_matches(['\\', '/']) {
        "" => raw.as_ref(),
        trimmed => trimmed,
    };
    Ok(std::path::absolute(trimmed)?)
}
