//! Discovery of the Vault client executable.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::ProcessRunner;
use crate::{ConnectionSettings, VaultError};

const CLIENT_NAME: &str = "vault";
#[cfg_attr(not(windows), allow(dead_code))]
const CLIENT_EXE: &str = "vault.exe";
#[cfg_attr(not(windows), allow(dead_code))]
const REGISTRY_KEYS: [&str; 2] = [
    r"HKLM\SOFTWARE\SourceGear\Vault Client",
    r"HKLM\SOFTWARE\Wow6432Node\SourceGear\Vault Client",
];

/// Resolves the client executable for `settings`.
///
/// Order: the explicit `client_path`, then (on Windows) the `InstallDir`
/// registered by the client installer, then `PATH`.
pub(crate) fn find_client<R: ProcessRunner>(
    settings: &ConnectionSettings,
    runner: &R,
) -> Result<PathBuf, VaultError> {
    if let Some(path) = settings.client_path.as_ref()
        && !path.as_os_str().is_empty()
    {
        return Ok(path.clone());
    }

    #[cfg(windows)]
    if let Some(path) = find_registered_client(runner) {
        return Ok(path);
    }
    #[cfg(not(windows))]
    let _ = runner;

    match which::which(CLIENT_NAME) {
        Ok(path) => {
            debug!(path = %path.display(), "found vault client on PATH");
            Ok(path)
        }
        Err(err) => {
            debug!(error = %err, "vault client not found on PATH");
            Err(VaultError::ClientUnavailable(
                "vault client not found; install the Vault client or set client_path".into(),
            ))
        }
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn find_registered_client<R: ProcessRunner>(runner: &R) -> Option<PathBuf> {
    for key in REGISTRY_KEYS {
        let query = format!("QUERY \"{key}\" /v InstallDir");
        let result = match runner.run(Path::new("reg.exe"), &query) {
            Ok(result) => result,
            Err(err) => {
                debug!(key, error = %err, "registry query failed");
                continue;
            }
        };
        if !result.exited_successfully() {
            continue;
        }
        if let Some(install_dir) = parse_install_dir(&result.stdout) {
            let path = install_dir.join(CLIENT_EXE);
            debug!(key, path = %path.display(), "found registered vault client");
            return Some(path);
        }
    }
    None
}

/// Extracts the `REG_SZ` value from `reg.exe QUERY` output.
fn parse_install_dir(output: &str) -> Option<PathBuf> {
    output.lines().find_map(|line| {
        let (_, value) = line.split_once("REG_SZ")?;
        let value = value.trim();
        (!value.is_empty()).then(|| PathBuf::from(value))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::RefCell;
    use std::io;

    use super::*;
    use crate::CommandResult;

    #[derive(Default)]
    struct RegistryFake {
        responses: RefCell<Vec<CommandResult>>,
        calls: RefCell<Vec<String>>,
    }

    impl ProcessRunner for RegistryFake {
        fn run(&self, program: &Path, command_line: &str) -> io::Result<CommandResult> {
            assert_eq!(program, Path::new("reg.exe"));
            self.calls.borrow_mut().push(command_line.to_string());
            Ok(self.responses.borrow_mut().remove(0))
        }
    }

    const REG_OUTPUT: &str = "\r\nHKEY_LOCAL_MACHINE\\SOFTWARE\\SourceGear\\Vault Client\r\n    InstallDir    REG_SZ    C:\\Program Files\\SourceGear\\Vault Client\\\r\n\r\n";

    #[test]
    fn explicit_client_path_wins() {
        let settings = ConnectionSettings::new("h", "u", "p").with_client_path("/opt/vault/vault");
        let runner = RegistryFake::default();
        let path = find_client(&settings, &runner).unwrap();
        assert_eq!(path, PathBuf::from("/opt/vault/vault"));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn parse_install_dir_reads_reg_sz_value() {
        let dir = parse_install_dir(REG_OUTPUT).unwrap();
        assert_eq!(
            dir,
            PathBuf::from("C:\\Program Files\\SourceGear\\Vault Client\\")
        );
        assert_eq!(parse_install_dir("ERROR: not found"), None);
        assert_eq!(parse_install_dir("    InstallDir    REG_SZ    "), None);
    }

    #[test]
    fn registered_client_falls_back_to_wow6432_key() {
        let runner = RegistryFake::default();
        runner.responses.borrow_mut().extend([
            CommandResult::failure("ERROR: The system was unable to find the specified registry key or value."),
            CommandResult::success(REG_OUTPUT),
        ]);
        let path = find_registered_client(&runner).unwrap();
        assert!(path.ends_with(CLIENT_EXE));
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains(r"HKLM\SOFTWARE\SourceGear\Vault Client"));
        assert!(calls[1].contains("Wow6432Node"));
        assert!(calls[1].ends_with("/v InstallDir"));
    }

    #[test]
    fn registered_client_absent_when_both_keys_missing() {
        let runner = RegistryFake::default();
        runner
            .responses
            .borrow_mut()
            .extend([CommandResult::failure("x"), CommandResult::failure("y")]);
        assert_eq!(find_registered_client(&runner), None);
    }
}
