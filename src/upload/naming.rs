//! Storage key generation.

use std::fmt;
use std::path::Path;

use uuid::Uuid;

/// `<prefix>/<uuid><ext>`, unique per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    key: String,
    file_name_start: usize,
}

impl StorageKey {
    /// Build a fresh key for `original_filename`, keeping its extension as written.
    pub fn generate(prefix: &str, original_filename: &str) -> Self {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let file_name = format!("{}{extension}", Uuid::new_v4());

        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            Self {
                key: file_name,
                file_name_start: 0,
            }
        } else {
            Self {
                key: format!("{prefix}/{file_name}"),
                file_name_start: prefix.len() + 1,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The generated file name without the prefix.
    pub fn file_name(&self) -> &str {
        &self.key[self.file_name_start..]
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_and_keep_extension() {
        let a = StorageKey::generate("tmp/uploads", "cat.png");
        let b = StorageKey::generate("tmp/uploads", "cat.png");

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("tmp/uploads/"));
        assert!(a.as_str().ends_with(".png"));
        assert!(b.as_str().ends_with(".png"));
    }

    #[test]
    fn test_file_name_is_uuid_plus_extension() {
        let key = StorageKey::generate("tmp/uploads", "Holiday.JPG");
        let name = key.file_name();

        let (stem, ext) = name.split_once('.').unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
        assert_eq!(ext, "JPG");
        assert_eq!(key.as_str(), format!("tmp/uploads/{name}"));
    }

    #[test]
    fn test_prefix_slashes_normalized() {
        let key = StorageKey::generate("/images/", "a.gif");
        assert!(key.as_str().starts_with("images/"));
        assert!(!key.as_str().starts_with("images//"));
    }

    #[test]
    fn test_empty_prefix_and_no_extension() {
        let key = StorageKey::generate("", "README");
        assert_eq!(key.as_str(), key.file_name());
        assert!(Uuid::parse_str(key.as_str()).is_ok());
    }

    #[test]
    fn test_dotfile_gets_no_extension() {
        let key = StorageKey::generate("p", ".hidden");
        assert!(Uuid::parse_str(key.file_name()).is_ok());
    }
}
