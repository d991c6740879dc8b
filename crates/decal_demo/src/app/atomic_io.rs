use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

/// Writes `bytes` to a hidden sibling of `path` and renames it over the target.
/// A previous snapshot stays readable until the rename lands.
pub(crate) fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staged = staging_path_for(path);
    if let Err(error) = fs::write(&staged, bytes).and_then(|()| fs::rename(&staged, path)) {
        let _ = fs::remove_file(&staged);
        return Err(error);
    }
    Ok(())
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("snapshot");
    path.with_file_name(format!(".{file_name}.{}.partial", process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("frame.png");
        write_bytes_atomic(&path, b"first").expect("first write");
        write_bytes_atomic(&path, b"second").expect("second write");

        assert_eq!(fs::read(&path).expect("read"), b"second");
        assert!(!staging_path_for(&path).exists());
        let entries = fs::read_dir(path.parent().expect("parent"))
            .expect("list")
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_rename_keeps_the_target_and_cleans_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.png");
        fs::create_dir(&path).expect("blocking dir");
        fs::write(path.join("keep.txt"), b"keep").expect("keep");

        assert!(write_bytes_atomic(&path, b"frame").is_err());
        assert!(!staging_path_for(&path).exists());
        assert_eq!(fs::read(path.join("keep.txt")).expect("read"), b"keep");
    }
}
