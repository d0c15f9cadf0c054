use crate::error::{Result, ValidationError};
use globset::{GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// Extension of the documents the validator looks at
pub const MARKDOWN_EXTENSION: &str = "md";

/// Async discovery of Markdown documents below a root path
///
/// Symbolic links are not followed.
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    /// Include patterns set
    include_set: Option<GlobSet>,
    /// Exclude patterns set
    exclude_set: Option<GlobSet>,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only documents matching at least one pattern are kept
    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        self.include_set = build_glob_set(&patterns)?;
        Ok(self)
    }

    /// Documents matching any pattern are dropped
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        self.exclude_set = build_glob_set(&patterns)?;
        Ok(self)
    }

    /// Discover documents in the given path (file or directory), sorted by path
    pub async fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(path).await?;

        if metadata.is_file() {
            return Ok(if self.should_process(path) {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let mut files = Vec::new();
        let mut read_dir = fs::read_dir(path)
            .await
            .map_err(|e| ValidationError::FileSystemTraversal {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        while let Some(entry) = read_dir.next_entry().await? {
            let entry_path = entry.path();

            if entry_path.is_symlink() {
                continue;
            }

            if let Err(e) = self.discover_files_recursive(&entry_path, &mut files).await {
                warn!(
                    path = %entry_path.display(),
                    error = %e,
                    "Error while discovering documents"
                );
            }
        }

        files.sort();
        Ok(files)
    }

    fn discover_files_recursive<'a>(
        &'a self,
        path: &'a Path,
        files: &'a mut Vec<PathBuf>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            let metadata = fs::metadata(path).await?;

            if metadata.is_file() {
                if self.should_process(path) {
                    files.push(path.to_path_buf());
                }
            } else if metadata.is_dir() {
                let mut read_dir = fs::read_dir(path).await?;

                while let Some(entry) = read_dir.next_entry().await? {
                    let entry_path = entry.path();

                    if entry_path.is_symlink() {
                        continue;
                    }

                    if let Err(e) = self.discover_files_recursive(&entry_path, files).await {
                        warn!(
                            path = %entry_path.display(),
                            error = %e,
                            "Error while discovering documents"
                        );
                    }
                }
            }

            Ok(())
        })
    }

    /// Check if a file should be processed based on its extension and the patterns
    pub fn should_process(&self, path: &Path) -> bool {
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION));
        if !is_markdown {
            return false;
        }

        if let Some(exclude_set) = &self.exclude_set
            && exclude_set.is_match(path)
        {
            return false;
        }

        if let Some(include_set) = &self.include_set {
            return include_set.is_match(path);
        }

        true
    }
}

/// Drop one leading `./`, as a walk of `.` yields repository relative paths
pub fn relative_path(path: PathBuf) -> PathBuf {
    match path.strip_prefix(".") {
        Ok(rest) if !rest.as_os_str().is_empty() => rest.to_path_buf(),
        _ => path,
    }
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ValidationError::InvalidPattern {
                pattern: pattern.clone(),
                details: e.to_string(),
            })?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| ValidationError::InvalidPattern {
            pattern: patterns.join(", "),
            details: e.to_string(),
        })
}

/// Read a newline separated list of document paths.
///
/// Blank lines and paths without the `.md` suffix are ignored.
pub async fn read_path_list<R>(reader: R) -> Result<Vec<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let suffix = format!(".{}", MARKDOWN_EXTENSION);
    let mut lines = reader.lines();
    let mut paths = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() && line.ends_with(&suffix) {
            info!(path = line, "Adding to files checked");
            paths.push(PathBuf::from(line));
        }
    }

    Ok(paths)
}
