use serde::de::DeserializeOwned;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("Could not read {0:?}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error("Could not parse {0:?}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, JsonFileError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|err| JsonFileError::Io(path.to_owned(), err))?;
    serde_json::from_slice(&content).map_err(|err| JsonFileError::Json(path.to_owned(), err))
}

/// Scratch files for tests that read from disk.
#[cfg(test)]
pub mod testing {
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    pub struct TempFile(PathBuf);

    impl TempFile {
        pub fn new() -> Self {
            Self(std::env::temp_dir().join(format!("overlay-relay-{}.json", Uuid::new_v4())))
        }

        pub fn with_content(content: &str) -> Self {
            let file = Self::new();
            file.write(content);
            file
        }

        pub fn write(&self, content: &str) {
            std::fs::write(&self.0, content).unwrap();
        }

        pub fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{testing::TempFile, *};
    use std::collections::HashMap;

    #[tokio::test]
    async fn reading_json_object() {
        let file = TempFile::with_content(r#"{"!uses": "https://example.com/uses"}"#);
        let map: HashMap<String, String> = read_json(file.path()).await.unwrap();
        assert_eq!(map["!uses"], "https://example.com/uses");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let file = TempFile::new();
        let result = read_json::<HashMap<String, String>>(file.path()).await;
        assert!(matches!(result, Err(JsonFileError::Io(..))));
    }

    #[tokio::test]
    async fn invalid_content_is_json_error() {
        let file = TempFile::with_content("not json");
        let result = read_json::<HashMap<String, String>>(file.path()).await;
        assert!(matches!(result, Err(JsonFileError::Json(..))));
    }
}
