//! End-to-end tests for the setsync binary

use assert_cmd::Command;
use predicates::prelude::*;
use sync_test_utils::home::TestHome;

fn setsync(home: &TestHome) -> Command {
    let mut cmd = Command::cargo_bin("setsync").unwrap();
    cmd.arg("--storage-dir").arg(home.storage_dir());
    cmd.arg("--local-dir").arg(home.local_dir());
    cmd
}

#[test]
fn init_seeds_the_settings_document() {
    let home = TestHome::new();

    setsync(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded settings document"));

    home.assert_file_exists("storage/settings.yml");
    home.assert_file_contains("storage/settings.yml", "type: none");

    // A second init leaves the document alone
    setsync(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already present"));
}

#[test]
fn status_reports_backend_and_profile_as_json() {
    let home = TestHome::new();
    home.write_settings("repository:\n  type: rsync\n  url: host:/store\nprofile: travel\n");

    let output = setsync(&home)
        .args(["status", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["backend"], "rsync");
    assert_eq!(value["profile"], "travel");
}

#[test]
fn profile_command_persists_the_switch() {
    let home = TestHome::new();
    home.write_settings("repository:\n  type: none\nprofile: main\n");

    setsync(&home)
        .args(["profile", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("work"));

    home.assert_file_contains("storage/settings.yml", "profile: work");
}

#[test]
fn upload_then_download_round_trips_through_a_file_store() {
    let home = TestHome::new();
    let store = home.root().join("store");
    home.write_settings(&format!(
        "repository:\n  type: file\n  path: {}\nprofile: main\n",
        store.display()
    ));
    home.seed_local_file("init.vim", "set nu");

    setsync(&home)
        .arg("upload")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) transferred"));
    home.assert_file_contains("store/main/init.vim", "set nu");

    std::fs::remove_file(home.local_dir().join("init.vim")).unwrap();
    setsync(&home)
        .args(["download", "--yes"])
        .assert()
        .success();
    home.assert_file_contains("local/init.vim", "set nu");
}

#[test]
fn reload_rejects_a_mysterious_backend_type() {
    let home = TestHome::new();
    home.write_settings("repository:\n  type: carrier-pigeon\nprofile: main\n");

    setsync(&home)
        .arg("reload")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mysterious repository type"));
}

#[test]
fn upload_without_local_dir_is_a_user_error() {
    let home = TestHome::new();
    home.write_settings("repository:\n  type: none\nprofile: main\n");

    let mut cmd = Command::cargo_bin("setsync").unwrap();
    cmd.arg("--storage-dir").arg(home.storage_dir());
    cmd.env_remove("SETSYNC_LOCAL_DIR");
    cmd.arg("upload")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--local-dir"));
}
