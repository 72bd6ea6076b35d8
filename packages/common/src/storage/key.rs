use std::fmt;

use uuid::Uuid;

use super::error::StorageError;

const MAX_KEY_LEN: usize = 512;

/// A validated object key.
///
/// Keys are `/`-separated segments made of ASCII letters, digits, `.`, `_`
/// and `-`. Empty segments and the `.`/`..` segments are rejected, so a key
/// can be joined onto a filesystem root without escaping it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Parse and validate a key.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        if raw.is_empty() {
            return Err(StorageError::InvalidKey("key is empty".into()));
        }
        if raw.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key longer than {MAX_KEY_LEN} bytes"
            )));
        }

        for segment in raw.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidKey("empty path segment".into()));
            }
            if segment == "." || segment == ".." {
                return Err(StorageError::InvalidKey("relative path segment".into()));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            {
                return Err(StorageError::InvalidKey(format!(
                    "unsupported character in segment '{segment}'"
                )));
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// Generate a fresh, collision-free key below `prefix`.
    ///
    /// The final segment is a UUIDv7 followed by `.{extension}`.
    pub fn generate(prefix: &str, extension: &str) -> Result<Self, StorageError> {
        let id = Uuid::now_v7().simple();
        let extension = extension.to_ascii_lowercase();
        Self::parse(&format!("{prefix}/{id}.{extension}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension of the final segment, if any.
    pub fn extension(&self) -> Option<&str> {
        let file = self.0.rsplit('/').next()?;
        match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
