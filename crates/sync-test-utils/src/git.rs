//! Git repository fixtures for backend tests.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Initialises a real git repository with an initial commit using the `git` CLI.
///
/// Specifically:
/// - Runs `git init`
/// - Configures `user.email`, `user.name`, and `commit.gpgsign = false`
/// - Creates `README.md` and makes an initial commit
/// - Renames the default branch to `main`
///
/// Use for: backend tests that need a real working tree with history
/// (checkout, commit, branch creation).
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    let run = |args: &[&str]| {
        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .unwrap_or_else(|e| {
                panic!("real_git_repo_with_commit: failed to run `git {args:?}`: {e}")
            });
        if !output.status.success() {
            panic!(
                "real_git_repo_with_commit: `git {args:?}` failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
    };

    run(&["init"]);
    run(&["config", "user.email", "test@test.com"]);
    run(&["config", "user.name", "Test User"]);
    run(&["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    run(&["add", "."]);
    run(&["commit", "-m", "Initial commit"]);
    // Best-effort: older git versions may not support this flag
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
}

/// Initialises a bare repository with `main` as its initial head, suitable as
/// a push/pull origin for the remote git backend.
///
/// # Panics
/// Panics if `git2` fails to initialise the repository.
pub fn bare_git_repo(path: &Path) -> git2::Repository {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.bare(true).initial_head("main");
    git2::Repository::init_opts(path, &opts).unwrap_or_else(|e| {
        panic!(
            "bare_git_repo: failed to init bare repository at {}: {e}",
            path.display()
        )
    })
}
