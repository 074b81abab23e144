//! Repository selector
//!
//! Owns the single live backend instance and its lifecycle. Construction is
//! lazy and reloads are hash-gated: backend construction may be expensive
//! (cloning a remote, spawning a shell), so it never happens on a plain
//! settings read, and a byte-identical document on disk never tears down a
//! fully operational backend.
//!
//! The slot lock is held for the duration of each public operation, so
//! `get`/`reload`/`reset`/`set_profile` are serialized even under a
//! multi-threaded host; the settings lock is only taken while the slot lock
//! is held, giving a single lock order.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::Result;
use crate::settings::{BackendSpec, Settings};

use super::Repository;

/// The live backend instance, shared with callers of [`RepositorySelector::get`].
///
/// The selector stays the owner of the lifecycle: it is the only caller of
/// `terminate`, and it drops its reference when settings change.
pub type SharedRepository = Arc<Mutex<Box<dyn Repository>>>;

#[derive(Default)]
struct LiveSlot {
    instance: Option<SharedRepository>,
    /// Number of backend constructions performed so far; each settings
    /// generation constructs at most once.
    generation: u64,
}

/// Singleton-per-context factory and lifecycle manager for the active backend.
pub struct RepositorySelector {
    settings: Arc<Mutex<Settings>>,
    live: Mutex<LiveSlot>,
}

impl RepositorySelector {
    pub fn new(settings: Arc<Mutex<Settings>>) -> Self {
        Self {
            settings,
            live: Mutex::new(LiveSlot::default()),
        }
    }

    /// The settings store this selector reads.
    pub fn settings(&self) -> Arc<Mutex<Settings>> {
        Arc::clone(&self.settings)
    }

    /// Return the live backend, constructing it from the current settings
    /// document when none exists.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`](crate::Error::Configuration) when the
    /// document's backend selection is unrecognized or ambiguous;
    /// [`Error::Backend`](crate::Error::Backend) when the freshly
    /// constructed backend rejects the document's profile.
    pub async fn get(&self) -> Result<SharedRepository> {
        let mut slot = self.live.lock().await;
        if let Some(instance) = &slot.instance {
            return Ok(Arc::clone(instance));
        }

        let instance = self.construct().await?;
        slot.instance = Some(Arc::clone(&instance));
        slot.generation += 1;
        Ok(instance)
    }

    /// Reload settings from disk and rebuild the backend when they changed.
    ///
    /// Returns `false` (and leaves the live instance untouched) when the
    /// on-disk document hashes to the bytes already loaded. On change with a
    /// live instance, terminates it and constructs a fresh one from the new
    /// document; with no live instance, stays lazy.
    pub async fn reload(&self) -> Result<bool> {
        let mut slot = self.live.lock().await;

        let changed = self.settings.lock().await.reload()?;
        if !changed {
            return Ok(false);
        }

        if let Some(instance) = slot.instance.take() {
            tracing::info!("settings changed; replacing the live backend");
            instance.lock().await.terminate().await?;
            let fresh = self.construct().await?;
            slot.instance = Some(fresh);
            slot.generation += 1;
        }
        Ok(true)
    }

    /// Terminate the live backend, if any, and clear the slot. The next
    /// [`get`](Self::get) reconstructs from the then-current settings.
    pub async fn reset(&self) -> Result<()> {
        let mut slot = self.live.lock().await;
        if let Some(instance) = slot.instance.take() {
            tracing::debug!("terminating the live backend");
            instance.lock().await.terminate().await?;
        }
        Ok(())
    }

    /// Switch the active profile.
    ///
    /// The live backend (when one exists) must accept the profile first;
    /// only then is the new value persisted. A backend failure therefore
    /// leaves the persisted profile unchanged, so the document never claims
    /// a profile the backend never activated.
    pub async fn set_profile(&self, profile: &str) -> Result<()> {
        let slot = self.live.lock().await;

        if let Some(instance) = &slot.instance {
            instance.lock().await.set_profile(profile).await?;
        }

        self.settings.lock().await.set_profile(profile)?;
        tracing::info!(profile, "profile switched and persisted");
        Ok(())
    }

    /// Number of backend constructions performed so far.
    pub async fn generation(&self) -> u64 {
        self.live.lock().await.generation
    }

    async fn construct(&self) -> Result<SharedRepository> {
        let (spec, profile, storage_dir): (BackendSpec, String, PathBuf) = {
            let settings = self.settings.lock().await;
            (
                settings.backend_spec()?,
                settings.document().profile.clone(),
                settings.storage_dir().to_path_buf(),
            )
        };

        let mut backend = super::from_spec(&spec, &storage_dir);
        tracing::debug!(kind = %backend.kind(), profile, "constructing repository backend");
        backend.set_profile(&profile).await?;
        Ok(Arc::new(Mutex::new(backend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::repository::BackendKind;
    use std::fs;
    use std::path::Path;
    use sync_test_utils::git::{bare_git_repo, real_git_repo_with_commit};
    use tempfile::TempDir;

    fn selector_for(storage_dir: &Path, document: &str) -> RepositorySelector {
        fs::create_dir_all(storage_dir).unwrap();
        fs::write(storage_dir.join("settings.yml"), document).unwrap();
        let settings = Settings::load(storage_dir).unwrap();
        RepositorySelector::new(Arc::new(Mutex::new(settings)))
    }

    async fn kind_of(instance: &SharedRepository) -> BackendKind {
        instance.lock().await.kind()
    }

    fn persisted_profile(storage_dir: &Path) -> String {
        let text = fs::read_to_string(storage_dir.join("settings.yml")).unwrap();
        let doc: crate::settings::SettingsDocument = serde_yaml::from_str(&text).unwrap();
        doc.profile
    }

    #[tokio::test]
    async fn get_constructs_matching_backend_for_each_type() {
        let temp = TempDir::new().unwrap();

        let none = selector_for(
            &temp.path().join("none"),
            "repository:\n  type: none\nprofile: main\n",
        );
        assert_eq!(kind_of(&none.get().await.unwrap()).await, BackendKind::None);

        let store = temp.path().join("file-store");
        let file = selector_for(
            &temp.path().join("file"),
            &format!("repository:\n  type: file\n  path: {}\nprofile: main\n", store.display()),
        );
        assert_eq!(kind_of(&file.get().await.unwrap()).await, BackendKind::File);

        let worktree = temp.path().join("worktree");
        fs::create_dir_all(&worktree).unwrap();
        real_git_repo_with_commit(&worktree);
        let local_git = selector_for(
            &temp.path().join("git-local"),
            &format!("repository:\n  type: git\n  path: {}\nprofile: main\n", worktree.display()),
        );
        assert_eq!(
            kind_of(&local_git.get().await.unwrap()).await,
            BackendKind::LocalGit
        );

        let origin = temp.path().join("origin.git");
        bare_git_repo(&origin);
        let remote_git = selector_for(
            &temp.path().join("git-remote"),
            &format!("repository:\n  type: git\n  url: {}\nprofile: main\n", origin.display()),
        );
        assert_eq!(
            kind_of(&remote_git.get().await.unwrap()).await,
            BackendKind::RemoteGit
        );

        let rsync = selector_for(
            &temp.path().join("rsync"),
            "repository:\n  type: rsync\n  url: host:/store\nprofile: main\n",
        );
        assert_eq!(kind_of(&rsync.get().await.unwrap()).await, BackendKind::Rsync);
    }

    #[tokio::test]
    async fn get_is_reference_stable_between_generations() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        let first = selector.get().await.unwrap();
        let second = selector.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(selector.generation().await, 1);
    }

    #[tokio::test]
    async fn get_rejects_unknown_backend_type() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(
            temp.path(),
            "repository:\n  type: carrier-pigeon\nprofile: main\n",
        );

        assert!(matches!(
            selector.get().await,
            Err(Error::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn get_rejects_ambiguous_git_selection() {
        let temp = TempDir::new().unwrap();

        let neither = selector_for(
            &temp.path().join("neither"),
            "repository:\n  type: git\nprofile: main\n",
        );
        assert!(matches!(
            neither.get().await,
            Err(Error::Configuration { .. })
        ));

        let both = selector_for(
            &temp.path().join("both"),
            "repository:\n  type: git\n  path: /tmp/x\n  url: git@host:r.git\nprofile: main\n",
        );
        assert!(matches!(
            both.get().await,
            Err(Error::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn reload_without_change_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        let before = selector.get().await.unwrap();
        assert!(!selector.reload().await.unwrap());
        let after = selector.get().await.unwrap();

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(selector.generation().await, 1);
    }

    #[tokio::test]
    async fn reload_with_backend_change_replaces_live_instance_once() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        let old = selector.get().await.unwrap();
        assert_eq!(selector.generation().await, 1);

        let store = temp.path().join("store");
        fs::write(
            temp.path().join("settings.yml"),
            format!("repository:\n  type: file\n  path: {}\nprofile: main\n", store.display()),
        )
        .unwrap();

        assert!(selector.reload().await.unwrap());

        // Old instance detached from the selector, exactly one fresh construction
        assert_eq!(Arc::strong_count(&old), 1);
        assert_eq!(selector.generation().await, 2);

        let fresh = selector.get().await.unwrap();
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert_eq!(kind_of(&fresh).await, BackendKind::File);
    }

    #[tokio::test]
    async fn reload_with_change_but_no_live_instance_stays_lazy() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        fs::write(
            temp.path().join("settings.yml"),
            "repository:\n  type: none\nprofile: other\n",
        )
        .unwrap();

        assert!(selector.reload().await.unwrap());
        assert_eq!(selector.generation().await, 0);
    }

    #[tokio::test]
    async fn reset_forces_reconstruction() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        let first = selector.get().await.unwrap();
        selector.reset().await.unwrap();
        let second = selector.get().await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(selector.generation().await, 2);
    }

    #[tokio::test]
    async fn set_profile_persists_only_after_backend_acceptance() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("store");
        let selector = selector_for(
            temp.path(),
            &format!("repository:\n  type: file\n  path: {}\nprofile: main\n", store.display()),
        );
        selector.get().await.unwrap();

        // Success path persists
        selector.set_profile("travel").await.unwrap();
        assert_eq!(persisted_profile(temp.path()), "travel");

        // A file where the profile directory should go makes the backend fail
        fs::write(store.join("blocked"), "not a directory").unwrap();
        let err = selector.set_profile("blocked").await.unwrap_err();
        assert!(matches!(err, Error::Backend { .. }));
        assert_eq!(persisted_profile(temp.path()), "travel");
    }

    #[tokio::test]
    async fn set_profile_without_live_instance_still_persists() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        selector.set_profile("work").await.unwrap();
        assert_eq!(persisted_profile(temp.path()), "work");
        assert_eq!(selector.generation().await, 0);
    }

    /// The no-backend scenario: a dummy backend whose profile switches and
    /// termination succeed trivially.
    #[tokio::test]
    async fn none_backend_full_scenario() {
        let temp = TempDir::new().unwrap();
        let selector = selector_for(temp.path(), "repository:\n  type: none\nprofile: main\n");

        let instance = selector.get().await.unwrap();
        assert_eq!(kind_of(&instance).await, BackendKind::None);

        selector.set_profile("work").await.unwrap();
        assert_eq!(persisted_profile(temp.path()), "work");

        selector.reset().await.unwrap();
        selector.reset().await.unwrap(); // terminate already ran; still fine
    }
}
