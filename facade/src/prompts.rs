use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::files::{sanitize_file_name, write_atomic};

/// Named prompt text files in a single directory.
///
/// File names must already have passed `files::sanitize_file_name`.
#[derive(Debug, Clone)]
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Names in the prompt directory that `read` can open. Temp files from
    /// in-flight writes and names that fail sanitization are left out.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("List prompts in {}", self.dir.display()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("List prompts in {}", self.dir.display()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if sanitize_file_name(&name).is_ok() {
                files.push(name);
            }
        }
        Ok(files)
    }

    /// Prompt text, or `None` if the file is absent or unreadable.
    pub async fn read(&self, file: &str) -> Option<String> {
        match tokio::fs::read_to_string(self.dir.join(file)).await {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Prompt {} not readable: {}", file, e);
                None
            }
        }
    }

    /// Create or replace a prompt file with exactly `content`.
    pub async fn write(&self, file: &str, content: &str) -> Result<()> {
        write_atomic(&self.dir.join(file), content.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_is_byte_exact() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PromptStore::new(tmp.path());

        store.write("note.txt", "hello").await.unwrap();
        assert_eq!(store.read("note.txt").await.as_deref(), Some("hello"));

        store.write("note.txt", "line one\nline two\n\n").await.unwrap();
        assert_eq!(store.read("note.txt").await.as_deref(), Some("line one\nline two\n\n"));
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PromptStore::new(tmp.path());
        assert_eq!(store.read("missing.txt").await, None);
    }

    #[tokio::test]
    async fn test_list_hides_unreadable_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PromptStore::new(tmp.path());
        store.write("analysis.txt", "a").await.unwrap();
        store.write("system.md", "b").await.unwrap();
        // Leftover temp file and a name only another tool could have created.
        std::fs::write(tmp.path().join(".analysis.txt.0d9f.tmp"), "partial").unwrap();
        std::fs::write(tmp.path().join("my prompt.txt"), "c").unwrap();

        let mut files = store.list().await.unwrap();
        files.sort();
        assert_eq!(files, vec!["analysis.txt", "system.md"]);
    }

    #[tokio::test]
    async fn test_list_missing_dir_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PromptStore::new(tmp.path().join("absent"));
        assert!(store.list().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_content() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PromptStore::new(tmp.path());
        store.write("blank.txt", "").await.unwrap();
        assert_eq!(store.read("blank.txt").await.as_deref(), Some(""));
    }
}
