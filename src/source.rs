//! Where posts come from.
//!
//! The aggregator only sees `(path, text)` pairs through [`DocumentSource`].

use crate::error::SourceError;
use async_trait::async_trait;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Path-like identifiers of every available document.
    async fn paths(&self) -> Result<Vec<String>, SourceError>;

    /// Raw text of one document.
    async fn read(&self, path: &str) -> Result<String, SourceError>;
}

/// Markdown files under a directory, honoring `.gitignore`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

pub fn collect_markdown_files(root: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !root.is_dir() {
        return Err(SourceError::NotFound(root.display().to_string()));
    }
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn paths(&self) -> Result<Vec<String>, SourceError> {
        let root = self.root.clone();
        let files = tokio::task::spawn_blocking(move || collect_markdown_files(&root)).await??;
        Ok(files
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect())
    }

    async fn read(&self, path: &str) -> Result<String, SourceError> {
        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(path.to_string()),
            _ => SourceError::Io(path.to_string(), e),
        })
    }
}

/// Documents held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }
}

impl<P: Into<String>, T: Into<String>> FromIterator<(P, T)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        Self {
            documents: iter
                .into_iter()
                .map(|(p, t)| (p.into(), t.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn paths(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.documents.keys().cloned().collect())
    }

    async fn read(&self, path: &str) -> Result<String, SourceError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_directory_source_lists_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("2024")).unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();
        fs::write(dir.path().join("2024").join("b.md"), "# B").unwrap();
        fs::write(dir.path().join("photo.jpg"), "jpeg").unwrap();
        fs::write(dir.path().join(".hidden.md"), "# hidden").unwrap();

        let source = DirectorySource::new(dir.path());
        let paths = source.paths().await.unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.ends_with("a.md")));
        assert!(paths.iter().any(|p| p.ends_with("b.md")));

        let text = source.read(&paths[0]).await.unwrap();
        assert!(text.starts_with("# "));
    }

    #[tokio::test]
    async fn test_directory_source_honors_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "drafts/\n").unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("drafts").join("wip.md"), "# WIP").unwrap();
        fs::write(dir.path().join("kept.md"), "# Kept").unwrap();

        let paths = DirectorySource::new(dir.path()).paths().await.unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("kept.md"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let source = DirectorySource::new("/nonexistent");
        let err = source.read("/nonexistent/x.md").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let err = DirectorySource::new("/nonexistent/blog").paths().await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source: MemorySource = [("a.md", "# A"), ("b.md", "# B")].into_iter().collect();
        assert_eq!(source.paths().await.unwrap(), vec!["a.md", "b.md"]);
        assert_eq!(source.read("b.md").await.unwrap(), "# B");
        assert!(matches!(
            source.read("c.md").await,
            Err(SourceError::NotFound(_))
        ));
    }
}
