use std::fmt::{Display, Formatter};

/// Separator between folder segments in a Vault path.
pub const DIRECTORY_SEPARATOR: char = '/';
/// Marker separating a repository name from the in-repository path.
pub const REPOSITORY_MARKER: char = '$';
/// Root of every in-repository path.
pub const ROOT: &str = "$/";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// A path addressed as `repository$/folder/...`.
///
/// Input without a `$` marker has no repository and denotes the list of
/// repositories. The display form (`repository$/a/b`) is the canonical
/// identifier handed back to callers and parses back to an equal value.
///
/// # Examples
///
/// ```
/// # use vault_adapter::VaultPath;
/// let path = VaultPath::new("MyRepo$/trunk/src/");
/// assert_eq!(path.repository_name(), "MyRepo");
/// assert_eq!(path.full_path(), "$/trunk/src");
/// assert_eq!(path.leaf_name(), "src");
/// assert_eq!(path.to_string(), "MyRepo$/trunk/src");
/// ```
pub struct VaultPath {
    repository_name: String,
    full_path: String,
}

impl VaultPath {
    /// Parses a raw path string. Never fails; an empty string is the root.
    pub fn new(raw: &str) -> Self {
        match raw.split_once(REPOSITORY_MARKER) {
            Some((repository, rest)) => Self {
                repository_name: repository.trim_matches(DIRECTORY_SEPARATOR).to_string(),
                full_path: rooted(rest),
            },
            None => Self {
                repository_name: String::new(),
                full_path: rooted(raw),
            },
        }
    }

    /// Repository name, empty when no repository was selected.
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Returns `true` when a repository was selected.
    pub fn has_repository(&self) -> bool {
        !self.repository_name.is_empty()
    }

    /// In-repository path, always starting with `$/`.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Last segment of [`Self::full_path`] (empty for the root).
    pub fn leaf_name(&self) -> &str {
        match self.full_path.rfind(DIRECTORY_SEPARATOR) {
            Some(idx) => &self.full_path[idx + 1..],
            None => &self.full_path,
        }
    }

    /// Returns the display form of a child entry of this path.
    pub fn child(&self, name: &str) -> String {
        format!("{self}{DIRECTORY_SEPARATOR}{name}")
    }
}

fn rooted(path: &str) -> String {
    format!("{ROOT}{}", path.trim_matches(DIRECTORY_SEPARATOR))
}

impl Display for VaultPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.repository_name, self.full_path)
    }
}

impl std::str::FromStr for VaultPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for VaultPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Option<&str>> for VaultPath {
    fn from(raw: Option<&str>) -> Self {
        Self::new(raw.unwrap_or_default())
    }
}
