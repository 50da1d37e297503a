use assert_cmd::prelude::*;
use gallery::{GalleryAction, GalleryItem, GalleryStore, MediaKind};
use predicates::str::contains;
use std::process::Command;
use tempfile::tempdir;

fn build_cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("studio_cli").unwrap();
    cmd.env("MOCK_SERVICES", "1");
    cmd.env("HOME", home);
    cmd
}

fn sample_item(key: &str, prompt: &str) -> GalleryItem {
    GalleryItem::new(
        MediaKind::Image,
        format!("https://cdn.example.com/{}.png", key),
        prompt,
        "gemini-2.5-flash-image",
    )
    .with_r2_file_id(key)
}

fn seed_snapshot(home: &std::path::Path, items: Vec<GalleryItem>) {
    let mut store = GalleryStore::new();
    for item in items {
        store.dispatch(GalleryAction::AddImage(item));
    }
    let base = home.join(".genstudio");
    std::fs::create_dir_all(&base).unwrap();
    let data = serde_json::to_string_pretty(store.state()).unwrap();
    std::fs::write(base.join("gallery.json"), data).unwrap();
}

#[test]
fn generate_creates_and_persists_an_item() {
    let dir = tempdir().unwrap();

    build_cmd(dir.path())
        .args(&["generate", "a scenic lake"])
        .assert()
        .success()
        .stdout(contains("Completed:"));

    build_cmd(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Images: 1"));

    build_cmd(dir.path())
        .arg("list-items")
        .assert()
        .success()
        .stdout(contains("a scenic lake"));
}

#[test]
fn models_lists_the_supported_set() {
    let dir = tempdir().unwrap();
    build_cmd(dir.path())
        .arg("models")
        .assert()
        .success()
        .stdout(contains("gemini-2.5-flash-image (image)"))
        .stdout(contains("veo-3 (video)"));
}

#[test]
fn like_toggles_on_repeated_invocation() {
    let dir = tempdir().unwrap();
    seed_snapshot(dir.path(), vec![sample_item("r2-1", "sunset")]);

    build_cmd(dir.path())
        .args(&["like", "r2-1"])
        .assert()
        .success()
        .stdout(contains("Liked: r2-1"));

    build_cmd(dir.path())
        .args(&["like", "r2-1"])
        .assert()
        .success()
        .stdout(contains("Unliked: r2-1"));
}

#[test]
fn publish_marks_the_item_public() {
    let dir = tempdir().unwrap();
    seed_snapshot(dir.path(), vec![sample_item("r2-2", "mountain")]);

    build_cmd(dir.path())
        .args(&["publish", "r2-2"])
        .assert()
        .success()
        .stdout(contains("Published: r2-2"));

    build_cmd(dir.path())
        .args(&["show-item", "r2-2"])
        .assert()
        .success()
        .stdout(contains("\"isPublic\": true"));
}

#[test]
fn delete_removes_the_item_from_the_snapshot() {
    let dir = tempdir().unwrap();
    seed_snapshot(
        dir.path(),
        vec![sample_item("r2-3", "forest"), sample_item("r2-4", "river")],
    );

    build_cmd(dir.path())
        .args(&["delete", "r2-3"])
        .assert()
        .success()
        .stdout(contains("Deleted: r2-3"));

    build_cmd(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Images: 1"));
}

#[test]
fn export_and_import_items() {
    let dir = tempdir().unwrap();
    seed_snapshot(dir.path(), vec![sample_item("r2-5", "glacier")]);

    let export_file = dir.path().join("items.json");
    build_cmd(dir.path())
        .args(&["export-items", "--file", export_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Exported"));

    std::fs::remove_file(dir.path().join(".genstudio").join("gallery.json")).unwrap();

    build_cmd(dir.path())
        .args(&["import-items", "--file", export_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Imported"));

    build_cmd(dir.path())
        .args(&["show-item", "r2-5"])
        .assert()
        .success()
        .stdout(contains("glacier"));
}

#[test]
fn show_reports_unknown_items() {
    let dir = tempdir().unwrap();
    build_cmd(dir.path())
        .args(&["show-item", "ghost"])
        .assert()
        .success()
        .stdout(contains("Item not found: ghost"));
}
