//! Local file selection.

use std::path::{Path, PathBuf};

use shdw::UploadFile;

use crate::error::DriveError;

/// Read `paths` into upload entries named after each file's base name.
///
/// # Errors
///
/// Fails on the first path that has no file name or cannot be read.
pub async fn read_upload_files(paths: &[PathBuf]) -> Result<Vec<UploadFile>, DriveError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let name = file_name(path)?;
        let data = tokio::fs::read(path).await.map_err(|e| {
            DriveError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;
        files.push(UploadFile::new(name, data));
    }
    Ok(files)
}

/// Split a prompt line into paths. Whitespace separates entries.
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    input.split_whitespace().map(PathBuf::from).collect()
}

fn file_name(path: &Path) -> Result<String, DriveError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| DriveError::Config(format!("not a file path: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_files_with_base_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("notes.txt");
        std::fs::write(&a, b"{}").unwrap();
        std::fs::write(&b, b"hello").unwrap();

        let files = read_upload_files(&[a, b]).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.json");
        assert_eq!(files[0].content_type, "application/json");
        assert_eq!(files[1].name, "notes.txt");
        assert_eq!(files[1].data, b"hello");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload_files(&[dir.path().join("missing.bin")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.bin"));
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            parse_paths("  a.json ./dir/b.png\t"),
            vec![PathBuf::from("a.json"), PathBuf::from("./dir/b.png")]
        );
        assert!(parse_paths("   ").is_empty());
    }
}
