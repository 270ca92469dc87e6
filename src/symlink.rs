//! Best-effort upkeep of the symlink pointing at the active file.

use log::warn;
use std::fs;
use std::io;
use std::path::Path;

/// Make `link` point at `target`, replacing whatever entry was there.
///
/// Every failure is logged and swallowed: a stale or missing symlink is a
/// degraded-but-non-fatal condition and must never stop the write path.
pub fn point_at(link: &Path, target: &Path) {
    if let Some(parent) = link.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("could not create symlink directory {}: {e}", parent.display());
                return;
            }
        }
    }

    match fs::remove_file(link) {
        Ok(()) => {}
        // Nothing to replace; also covers a concurrent removal race.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove old symlink {}: {e}", link.display()),
    }

    if let Err(e) = create(link, target) {
        warn!(
            "could not point symlink {} at {}: {e}",
            link.display(),
            target.display()
        );
    }
}

#[cfg(unix)]
fn create(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create(link: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
