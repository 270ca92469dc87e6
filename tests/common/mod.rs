#![allow(dead_code)]

use logroll::LogRoller;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// 19 bytes total, the canonical scenario.
pub const LINES: [&str; 4] = ["my\n", "dear\n", "aunt\n", "sally\n"];

pub fn write_lines(roller: &mut LogRoller, lines: &[&str]) {
    for line in lines {
        roller.write_all(line.as_bytes()).unwrap();
    }
}

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

pub fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Decompress a `.gz` file fully.
pub fn read_gz(path: &Path) -> String {
    let mut out = String::new();
    flate2::read::GzDecoder::new(fs::File::open(path).unwrap())
        .read_to_string(&mut out)
        .unwrap();
    out
}

/// Regular files directly under `dir`, sorted by name.
pub fn dir_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

/// Poll `check` until it passes or `timeout` elapses.
pub fn wait_for(timeout: Duration, check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    check()
}
