//! Public data types returned by the provider.

use std::fmt::{Display, Formatter};

/// A folder in a directory listing.
///
/// `path` is the canonical `repository$/...` form and can be passed back to
/// any provider operation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Folder (or repository) name.
    pub name: String,
    /// Canonical path of the folder.
    pub path: String,
    /// Immediate subfolders, sorted by name. Not populated recursively.
    pub directories: Vec<DirectoryEntry>,
    /// Files directly in the folder, sorted by name.
    pub files: Vec<FileEntry>,
}

impl DirectoryEntry {
    /// Creates an entry with no children.
    pub fn leaf(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            directories: Vec::new(),
            files: Vec::new(),
        }
    }
}

/// A file in a directory listing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// File name.
    pub name: String,
    /// Canonical path of the file.
    pub path: String,
}

/// A command understood by the Vault client.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCommand {
    /// Command name as passed to the client (e.g. `ADD`).
    pub name: String,
    /// One-line description.
    pub description: String,
}

/// A Vault version number.
///
/// The byte form is 8 bytes, big-endian, so byte-wise comparison orders
/// revisions the same way as their numbers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(pub u64);

impl Revision {
    /// Returns the version number.
    pub fn number(self) -> u64 {
        self.0
    }

    /// Encodes the version as 8 big-endian bytes.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decodes a version from 8 big-endian bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Decodes a version from a slice, returning `None` unless it is 8 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = bytes.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Revision> for [u8; 8] {
    fn from(rev: Revision) -> Self {
        rev.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_bytes_decode_to_same_number() {
        let rev = Revision(42);
        assert_eq!(rev.to_bytes(), [0, 0, 0, 0, 0, 0, 0, 42]);
        assert_eq!(Revision::from_bytes(rev.to_bytes()), rev);
        assert_eq!(Revision::from_slice(&rev.to_bytes()), Some(rev));
        assert_eq!(Revision::from_slice(&[1, 2, 3]), None);
    }

    #[cfg(feature = "config")]
    #[test]
    fn listing_serializes_for_host_storage() {
        let mut entry = DirectoryEntry::leaf("trunk", "Main$/trunk");
        entry.files.push(FileEntry {
            name: "a.txt".into(),
            path: "Main$/trunk/a.txt".into(),
        });
        let text = toml::to_string(&entry).unwrap();
        assert!(text.contains("name = \"trunk\""));
        let back: DirectoryEntry = toml::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn revision_byte_order_matches_numeric_order() {
        let revs = [0u64, 1, 255, 256, 65_535, 1 << 40, u64::MAX];
        for pair in revs.windows(2) {
            let (a, b) = (Revision(pair[0]), Revision(pair[1]));
            assert!(a < b);
            assert!(a.to_bytes() < b.to_bytes());
        }
    }
}
