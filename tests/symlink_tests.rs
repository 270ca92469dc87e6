#![cfg(unix)]

mod common;

use common::read_file;
use logroll::LogRoller;
use std::fs;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_symlink_points_at_initial_target() {
    let dir = tempdir().unwrap();
    let roller = LogRoller::builder("out.log")
        .anchor(dir.path())
        .symlink("current.log")
        .open()
        .unwrap();
    roller.finish();

    let link = fs::read_link(dir.path().join("current.log")).unwrap();
    assert_eq!(link, dir.path().join("out.log"));
}

#[test]
fn test_symlink_follows_rotation() {
    let dir = tempdir().unwrap();
    let mut roller = LogRoller::builder("out-%S.log")
        .anchor(dir.path())
        .symlink("current.log")
        .open()
        .unwrap();

    thread::sleep(Duration::from_millis(1100));
    roller.write_all(b"late\n").unwrap();
    let active = roller.active_path().to_path_buf();
    roller.finish();

    let link = fs::read_link(dir.path().join("current.log")).unwrap();
    assert_eq!(link, active);
}

#[test]
fn test_symlink_readable_through_link() {
    let dir = tempdir().unwrap();
    let mut roller = LogRoller::builder("out.log")
        .anchor(dir.path())
        .symlink("current.log")
        .open()
        .unwrap();
    roller.write_all(b"hello\n").unwrap();
    roller.finish();

    assert_eq!(read_file(&dir.path().join("current.log")), "hello\n");
}

#[test]
fn test_stale_entry_replaced() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("current.log"), "stale regular file").unwrap();

    let roller = LogRoller::builder("out.log")
        .anchor(dir.path())
        .symlink("current.log")
        .open()
        .unwrap();
    roller.finish();

    let meta = fs::symlink_metadata(dir.path().join("current.log")).unwrap();
    assert!(meta.file_type().is_symlink());
}

#[test]
fn test_symlink_parent_directories_created() {
    let dir = tempdir().unwrap();
    let roller = LogRoller::builder("out.log")
        .anchor(dir.path())
        .symlink("links/current.log")
        .open()
        .unwrap();
    roller.finish();

    let link = fs::read_link(dir.path().join("links/current.log")).unwrap();
    assert_eq!(link, dir.path().join("out.log"));
}

#[test]
fn test_symlink_path_never_template_resolved() {
    let dir = tempdir().unwrap();
    let roller = LogRoller::builder("out.log")
        .anchor(dir.path())
        .symlink("current-%S.log")
        .open()
        .unwrap();
    roller.finish();

    // The placeholder stays literal in the link name.
    assert!(
        fs::symlink_metadata(dir.path().join("current-%S.log"))
            .unwrap()
            .file_type()
            .is_symlink()
    );
}

#[test]
fn test_refreshed_after_forced_rotation() {
    let dir = tempdir().unwrap();
    let mut roller = LogRoller::builder("out.log")
        .anchor(dir.path())
        .symlink("current.log")
        .open()
        .unwrap();

    roller.rotate_now().unwrap();
    let active = roller.active_path().to_path_buf();
    roller.finish();

    let link = fs::read_link(dir.path().join("current.log")).unwrap();
    assert_eq!(link, active);
}
