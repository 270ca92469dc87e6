use crate::archive;
use crate::config::Config;
use crate::error::Error;
use crate::symlink;
use crate::template::PathTemplate;
use crate::tracker::CompletionTracker;
use log::{debug, warn};
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// A writer that transparently rotates output across time-templated files.
///
/// Every buffer handed to [`write`](io::Write::write) is preceded by a
/// rotation check: the path template is resolved against the current UTC
/// instant, and if the resolved path differs from the active one (or a
/// [force trigger](RotateTrigger) fired), the roller opens the new target,
/// rewires output to it, refreshes the configured symlink, and hands the old
/// target to a background job that flushes, closes, and optionally gzips it.
/// The buffer always lands in the post-rotation target: no byte is ever
/// written to a file that is being retired.
///
/// Retirement work runs off the calling thread; [`finish`](LogRoller::finish)
/// signals end-of-input and blocks until all of it has drained.
///
/// # Examples
///
/// ```
/// use logroll::LogRoller;
/// use std::io::Write;
///
/// let dir = tempfile::tempdir()?;
/// let mut roller = LogRoller::builder("app-%x.log")
///     .anchor(dir.path())
///     .symlink("current.log")
///     .open()?;
///
/// roller.write_all(b"hello\n")?;
/// roller.finish();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct LogRoller {
    template: PathTemplate,
    symlink: Option<PathBuf>,
    compress: bool,
    active_path: PathBuf,
    writer: Option<BufWriter<File>>,
    tracker: CompletionTracker,
    trigger: RotateTrigger,
}

/// Configures and opens a [`LogRoller`].
///
/// Created by [`LogRoller::builder`].
pub struct LogRollerBuilder {
    config: Config,
    anchor: Option<PathBuf>,
}

impl LogRollerBuilder {
    /// Keep a symlink at `path` pointing at the active file.
    ///
    /// The path is used as given — placeholders are not substituted.
    pub fn symlink(mut self, path: impl Into<String>) -> LogRollerBuilder {
        self.config.symlink = Some(path.into());
        self
    }

    /// Gzip retired files in the background, removing the originals.
    pub fn compress(mut self, compress: bool) -> LogRollerBuilder {
        self.config.compress = compress;
        self
    }

    /// Base directory for relative paths, instead of the process working
    /// directory.
    pub fn anchor(mut self, dir: impl Into<PathBuf>) -> LogRollerBuilder {
        self.anchor = Some(dir.into());
        self
    }

    /// Open the first target and return the roller.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or the
    /// initial target cannot be opened for append.
    pub fn open(self) -> Result<LogRoller, Error> {
        LogRoller::open_anchored(self.config, self.anchor)
    }
}

impl LogRoller {
    /// Start building a roller for the given path template.
    pub fn builder(path: impl Into<String>) -> LogRollerBuilder {
        LogRollerBuilder {
            config: Config {
                path: path.into(),
                ..Config::default()
            },
            anchor: None,
        }
    }

    /// Open a roller from a [`Config`], anchoring relative paths on the
    /// process working directory.
    ///
    /// Performs the initial forced rotation: the first target is resolved
    /// and opened before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or the
    /// initial target cannot be opened for append.
    pub fn open(config: Config) -> Result<LogRoller, Error> {
        LogRoller::open_anchored(config, None)
    }

    fn open_anchored(config: Config, anchor: Option<PathBuf>) -> Result<LogRoller, Error> {
        let anchor = match anchor {
            Some(dir) => dir,
            None => env::current_dir().map_err(Error::WorkingDir)?,
        };

        let template = PathTemplate::compile(&config.path, &anchor);
        let symlink = config.symlink.map(|raw| {
            let raw = PathBuf::from(raw);
            if raw.is_absolute() { raw } else { anchor.join(raw) }
        });

        let mut roller = LogRoller {
            template,
            symlink,
            compress: config.compress,
            active_path: PathBuf::new(),
            writer: None,
            tracker: CompletionTracker::new(),
            trigger: RotateTrigger::new(),
        };
        // Forced initial rotation: open target #1, nothing to retire.
        let initial = roller.template.resolve_now();
        roller.rotate_to(initial)?;
        Ok(roller)
    }

    /// Path of the file currently receiving writes.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Whether retired files are compressed.
    pub fn compress(&self) -> bool {
        self.compress
    }

    /// A handle onto the roller's background-work accounting.
    ///
    /// Lets callers observe or wait on outstanding closes and compressions
    /// without consuming the roller.
    pub fn tracker(&self) -> CompletionTracker {
        self.tracker.clone()
    }

    /// A cloneable flag that forces a full handoff before the next buffer
    /// is forwarded, even if the resolved path is unchanged.
    ///
    /// Fire it from anywhere; a signal-handler thread is the typical
    /// source, making "start a fresh file on demand" an operator action.
    pub fn trigger(&self) -> RotateTrigger {
        self.trigger.clone()
    }

    /// Perform a forced rotation immediately.
    ///
    /// The full handoff runs even when the resolved path equals the active
    /// one: the current file is retired and a fresh handle is opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the new target cannot be opened for append. The
    /// previous target stays active in that case.
    pub fn rotate_now(&mut self) -> Result<(), Error> {
        let next = self.template.resolve_now();
        self.rotate_to(next)
    }

    /// Signal end-of-input: retire the active target through the tracker and
    /// block until every outstanding close and compression has finished.
    ///
    /// The final file is closed the same way a retired one is, but never
    /// compressed — it remains the file the symlink points at.
    pub fn finish(mut self) {
        if let Some(writer) = self.writer.take() {
            let path = std::mem::take(&mut self.active_path);
            self.retire(writer, path, false);
        }
        self.tracker.wait_drained();
    }

    fn maybe_rotate(&mut self) -> Result<(), Error> {
        let forced = self.trigger.take();
        // Static patterns resolve to the active path by construction; skip
        // the comparison on the hot path.
        if self.template.is_static() && !forced {
            return Ok(());
        }
        let next = self.template.resolve_now();
        if forced || next != self.active_path {
            self.rotate_to(next)?;
        }
        Ok(())
    }

    fn rotate_to(&mut self, next: PathBuf) -> Result<(), Error> {
        // The new target must be open before anything is torn down; if the
        // open fails the old target stays wired and writes keep flowing.
        let writer = open_target(&next)?;

        let old_writer = self.writer.replace(writer);
        let old_path = std::mem::replace(&mut self.active_path, next);

        if let Some(link) = &self.symlink {
            symlink::point_at(link, &self.active_path);
        }

        match old_writer {
            Some(mut old_writer) => {
                debug!(
                    "rotating {} -> {}",
                    old_path.display(),
                    self.active_path.display()
                );
                // A forced rotation can resolve to the unchanged path. The
                // retiring handle then shares its file with the new one: its
                // buffered bytes must reach the OS before the new handle
                // appends, and compressing it would capture a file that is
                // still receiving writes.
                let same_target = old_path == self.active_path;
                if same_target {
                    if let Err(e) = old_writer.flush() {
                        warn!("flush of retired {} failed: {e}", old_path.display());
                    }
                }
                self.retire(old_writer, old_path, self.compress && !same_target);
            }
            None => debug!("opened {}", self.active_path.display()),
        }
        Ok(())
    }

    /// Flush, close, and optionally compress a retired target off-thread.
    ///
    /// The close unit is registered here, before the handoff returns;
    /// retirements of different targets run concurrently.
    fn retire(&self, writer: BufWriter<File>, path: PathBuf, compress: bool) {
        let tracker = self.tracker.clone();
        tracker.register();
        thread::spawn(move || {
            close_target(writer, &path);
            if compress {
                // Register the compression unit before releasing the close
                // unit so the pending count cannot touch zero in between.
                tracker.register();
                tracker.deregister();
                compress_target(&path);
            }
            tracker.deregister();
        });
    }

    fn active_writer(&mut self) -> &mut BufWriter<File> {
        // Some for the whole life of the roller: set by the initial
        // rotation, swapped (never cleared) on every later one, and only
        // taken by finish(), which consumes self.
        self.writer.as_mut().expect("roller has an active target")
    }
}

impl io::Write for LogRoller {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.maybe_rotate().map_err(io::Error::other)?;
        self.active_writer().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.active_writer().flush()
    }
}

impl Drop for LogRoller {
    fn drop(&mut self) {
        // finish() already took the writer on the normal path. Dropping
        // without finish() flushes inline, with no drain guarantee.
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!("flush of {} on drop failed: {e}", self.active_path.display());
            }
        }
    }
}

/// Thread-safe request for a forced rotation.
///
/// Obtained from [`LogRoller::trigger`]; clones share one flag. Firing is a
/// single atomic store, safe from signal-handler threads. The controller
/// consumes the flag at its next rotation check.
#[derive(Clone)]
pub struct RotateTrigger {
    pending: Arc<AtomicBool>,
}

impl RotateTrigger {
    fn new() -> RotateTrigger {
        RotateTrigger {
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a forced rotation before the next buffer is forwarded.
    pub fn fire(&self) {
        self.pending.store(true, Ordering::Release);
    }

    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

fn open_target(path: &Path) -> Result<BufWriter<File>, Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(BufWriter::new(file))
}

fn close_target(mut writer: BufWriter<File>, path: &Path) {
    if let Err(e) = writer.flush() {
        warn!("flush of retired {} failed: {e}", path.display());
    }
    let (file, _) = writer.into_parts();
    if let Err(e) = file.sync_all() {
        warn!("sync of retired {} failed: {e}", path.display());
    }
}

fn compress_target(path: &Path) {
    match archive::compress_file(path) {
        Ok(gz_path) => {
            debug!("compressed {} -> {}", path.display(), gz_path.display());
            if let Err(e) = fs::remove_file(path) {
                warn!("could not remove {} after compression: {e}", path.display());
            }
        }
        Err(e) => warn!("compression of {} failed: {e}", path.display()),
    }
}
