//! The bundled list of Vault client commands.

use std::sync::OnceLock;

use tracing::warn;

use crate::ClientCommand;

const CATALOG: &str = include_str!("../resources/vault_commands.txt");

static COMMANDS: OnceLock<Vec<ClientCommand>> = OnceLock::new();

/// Returns the bundled client commands in catalog order.
///
/// The catalog is parsed on first use. The returned iterator is `Clone`, so a
/// sequence can be restarted from any point.
pub fn available_commands() -> Commands {
    Commands {
        inner: COMMANDS.get_or_init(|| parse_catalog(CATALOG)).iter(),
    }
}

/// Iterator over the bundled [`ClientCommand`] list.
#[derive(Clone, Debug)]
pub struct Commands {
    inner: std::slice::Iter<'static, ClientCommand>,
}

impl Iterator for Commands {
    type Item = &'static ClientCommand;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Commands {}

fn parse_catalog(text: &str) -> Vec<ClientCommand> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                warn!(line, "skipping malformed command catalog line");
            }
            parsed
        })
        .collect()
}

/// Splits `NAME<whitespace>description` on the first run of spaces or tabs.
fn parse_line(line: &str) -> Option<ClientCommand> {
    let line = line.trim_start_matches([' ', '\t']);
    let (name, description) = line.split_once([' ', '\t'])?;
    let description = description.trim();
    if description.is_empty() {
        return None;
    }
    Some(ClientCommand {
        name: name.trim().to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn bundled_catalog_has_no_malformed_lines() {
        let lines = CATALOG.lines().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(available_commands().len(), lines);
    }

    #[test]
    fn bundled_catalog_lists_the_commands_the_provider_uses() {
        for name in ["GET", "GETLABEL", "LABEL", "LISTFOLDER", "LISTREPOSITORIES", "VERSIONHISTORY"] {
            assert!(
                available_commands().any(|cmd| cmd.name == name),
                "missing {name}"
            );
        }
    }

    #[test]
    fn available_commands_is_restartable() {
        let first = available_commands();
        let mut advanced = first.clone();
        advanced.next();
        assert_eq!(first.clone().nth(1), advanced.next());
        assert_eq!(first.count(), available_commands().count());
    }

    #[test]
    fn parse_line_splits_on_first_whitespace_run() {
        let cmd = parse_line("GET \t  Retrieves the latest version. ").unwrap();
        assert_eq!(cmd.name, "GET");
        assert_eq!(cmd.description, "Retrieves the latest version.");

        let cmd = parse_line("LABEL\tApplies a label\tto a version").unwrap();
        assert_eq!(cmd.description, "Applies a label\tto a version");
    }

    #[test]
    fn parse_catalog_skips_lines_with_one_field() {
        let commands = parse_catalog("ADD\tAdds files\nBROKEN\n\nDELETE  Deletes items\nLONELY \t\n");
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ADD", "DELETE"]);
    }
}
