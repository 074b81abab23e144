//! Atomic I/O operations with file locking
//!
//! The settings document carries hook commands and remote addresses, so it is
//! always written atomically (temp-then-rename) and with owner-only
//! permissions on platforms that support them.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file readable and writable only by the owner.
///
/// Uses write-to-temp-then-rename in the target directory so a crash never
/// leaves a partially written document, and acquires an advisory lock while
/// writing. On Unix the file mode is forced to `0o600` before the rename.
pub fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory ensures the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&temp_path, perms).map_err(|e| Error::io(&temp_path, e))?;
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Read a file's raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Read a file's contents as text.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Recursively copy a directory tree from `src` into `dst`.
///
/// Creates `dst` if needed. Entries whose file name appears in `skip` are not
/// descended into or copied (used to keep `.git` out of transfers). Returns
/// the relative paths of the files that were copied.
pub fn copy_tree(src: &Path, dst: &Path, skip: &[&str]) -> Result<Vec<PathBuf>> {
    if !src.is_dir() {
        return Err(Error::CopyFailed {
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
            message: "source is not a directory".to_string(),
        });
    }

    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    let mut copied = Vec::new();
    copy_tree_inner(src, dst, src, skip, &mut copied)?;
    copied.sort();
    Ok(copied)
}

fn copy_tree_inner(
    src: &Path,
    dst: &Path,
    root: &Path,
    skip: &[&str],
    copied: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
        let entry = entry.map_err(|e| Error::io(src, e))?;
        let name = entry.file_name();
        if skip.iter().any(|s| name == *s) {
            tracing::debug!(name = %name.to_string_lossy(), "skipping entry during tree copy");
            continue;
        }

        let from = entry.path();
        let to = dst.join(&name);
        let file_type = entry.file_type().map_err(|e| Error::io(&from, e))?;

        if file_type.is_dir() {
            fs::create_dir_all(&to).map_err(|e| Error::io(&to, e))?;
            copy_tree_inner(&from, &to, root, skip, copied)?;
        } else if file_type.is_file() {
            fs::copy(&from, &to).map_err(|e| Error::io(&to, e))?;
            let relative = from
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| from.clone());
            copied.push(relative);
        }
        // Symlinks are not followed; a settings tree is plain files
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn write_private_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yml");

        write_private(&path, b"profile: main\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "profile: main\n");
    }

    #[test]
    fn write_private_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/settings.yml");

        write_private(&path, b"x").unwrap();
        assert!(path.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn write_private_sets_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yml");

        write_private(&path, b"profile: main\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn copy_tree_copies_nested_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("keymaps")).unwrap();
        fs::write(src.join("init.vim"), "set nu").unwrap();
        fs::write(src.join("keymaps/normal.vim"), "nnoremap").unwrap();

        let copied = copy_tree(&src, &dst, &[]).unwrap();

        assert_eq!(
            copied,
            vec![PathBuf::from("init.vim"), PathBuf::from("keymaps/normal.vim")]
        );
        assert_eq!(read_text(&dst.join("init.vim")).unwrap(), "set nu");
        assert_eq!(read_text(&dst.join("keymaps/normal.vim")).unwrap(), "nnoremap");
    }

    #[test]
    fn copy_tree_skips_named_entries() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(src.join("init.vim"), "set nu").unwrap();

        let copied = copy_tree(&src, &dst, &[".git"]).unwrap();

        assert_eq!(copied, vec![PathBuf::from("init.vim")]);
        assert!(!dst.join(".git").exists());
    }

    #[test]
    fn copy_tree_rejects_missing_source() {
        let temp = TempDir::new().unwrap();
        let result = copy_tree(&temp.path().join("absent"), &temp.path().join("dst"), &[]);
        assert!(matches!(result, Err(Error::CopyFailed { .. })));
    }
}
