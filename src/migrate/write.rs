use std::path::Path;

use crate::error::MigrateError;

use super::path::parent_dir;

/// Create the destination directory and write `bytes`, replacing any existing file.
pub async fn save(local_path: &str, bytes: &[u8]) -> Result<(), MigrateError> {
    let dir = parent_dir(local_path);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| MigrateError::CreateDirFailed { dir: dir.clone(), source })?;
    tokio::fs::write(Path::new(local_path), bytes)
        .await
        .map_err(|source| MigrateError::WriteFailed { path: local_path.into(), source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = format!("{}/a/b/foto-1.jpg", dir.path().display());

        save(&path, b"first").await.unwrap();
        save(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn blocked_directory_is_a_create_dir_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let path = format!("{}/sub/foto-1.jpg", blocker.display());

        let err = save(&path, b"data").await.unwrap_err();
        assert_eq!(err.kind(), "create_dir_failed");
    }
}
