//! Size-rotated log files.
//!
//! A [`RotatingFile`] appends whole lines to an active file. When the next
//! line would push the file past its size limit, the active file is renamed
//! to `<name>.<timestamp>.<seq>`, optionally gzipped, and a fresh file is
//! opened. Rotated files older than the retention window are deleted.

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// When and how a file is rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size threshold in bytes.
    pub max_bytes: u64,
    /// How long rotated files are kept.
    pub retention: Duration,
    /// Gzip rotated files.
    pub compress: bool,
}

impl RotationPolicy {
    /// Creates a policy from a size in megabytes and a retention in days.
    ///
    /// ```
    /// use shared::logging::RotationPolicy;
    ///
    /// let policy = RotationPolicy::new(100, 10, true);
    /// assert_eq!(policy.max_bytes, 100 * 1024 * 1024);
    /// assert_eq!(policy.retention.as_secs(), 10 * 24 * 60 * 60);
    /// ```
    #[must_use]
    pub const fn new(max_megabytes: u64, retention_days: u64, compress: bool) -> Self {
        Self {
            max_bytes: max_megabytes * 1024 * 1024,
            retention: Duration::from_secs(retention_days * SECONDS_PER_DAY),
            compress,
        }
    }

    /// Overrides the size threshold with an exact byte count.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Overrides the retention window.
    #[must_use]
    pub const fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}

#[derive(Default)]
struct FileState {
    file: Option<File>,
    size: u64,
    sequence: u64,
    /// The last write failed and may have left a partial line behind.
    torn: bool,
}

/// Append-only line writer with size-based rotation.
///
/// All writes go through one internal mutex, so lines from concurrent callers
/// never interleave.
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<FileState>,
}

impl RotatingFile {
    /// Creates a writer for `path`. The file is opened on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            state: Mutex::new(FileState::default()),
        }
    }

    /// Path of the active file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotation policy in effect.
    #[must_use]
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Appends `line` plus a newline, rotating first if the limit would be
    /// exceeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written, or if a due
    /// rotation failed. A failed rotation still writes the line to the active
    /// file before reporting.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| io::Error::other(format!("Mutex poisoned: {e}")))?;

        let mut buffer = Vec::with_capacity(line.len() + 1);
        buffer.extend_from_slice(line.as_bytes());
        buffer.push(b'\n');
        let incoming = buffer.len() as u64;

        // A handle to a removed file would swallow every write until rotation.
        if state.file.is_some() && active_file_missing(&self.path) {
            state.file = None;
        }
        if state.file.is_none() {
            self.open(&mut state)?;
        }

        let mut rotation_result = Ok(());
        if state.size > 0 && state.size + incoming > self.policy.max_bytes {
            state.file = None;
            rotation_result = self.rotate(&mut state).map(drop);
            self.open(&mut state)?;
        }

        if state.torn && state.size > 0 {
            buffer.insert(0, b'\n');
        }

        let written = buffer.len() as u64;
        let result = match state.file.as_mut() {
            Some(file) => file.write_all(&buffer).and_then(|()| file.flush()),
            None => Err(io::Error::other("No file available")),
        };

        match result {
            Ok(()) => {
                state.size += written;
                state.torn = false;
            }
            Err(e) => {
                state.file = None;
                state.torn = true;
                return Err(e);
            }
        }
        drop(state);

        rotation_result
    }

    /// Rotated siblings of the active file, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be read.
    pub fn rotated_files(&self) -> io::Result<Vec<PathBuf>> {
        rotated_siblings(&self.path)
    }

    fn open(&self, state: &mut FileState) -> io::Result<()> {
        let file = match open_append(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                open_append(&self.path)?
            }
            other => other?,
        };
        state.size = file.metadata()?.len();
        state.file = Some(file);
        Ok(())
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<Option<PathBuf>> {
        state.sequence += 1;
        let stamp = Local::now().format("%Y%m%dT%H%M%S%.6f");
        let rotated = self.path.with_file_name(format!(
            "{}.{stamp}.{:06}",
            file_name(&self.path),
            state.sequence
        ));

        state.size = 0;
        match fs::rename(&self.path, &rotated) {
            // The active file vanished underneath us; the reopen starts a new one.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            other => other?,
        }

        let rotated = if self.policy.compress {
            compress(&rotated)?
        } else {
            rotated
        };

        self.prune_expired();
        Ok(Some(rotated))
    }

    /// Deletes rotated files older than the retention window.
    ///
    /// Individual deletion errors are ignored so one stuck file does not stop
    /// the rest of the cleanup.
    fn prune_expired(&self) {
        let Ok(rotated) = self.rotated_files() else {
            return;
        };

        for path in rotated {
            let expired = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|age| age >= self.policy.retention);
            if expired {
                let _ = fs::remove_file(&path);
            }
        }
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Lists rotated siblings of `path` (`<name>.<timestamp>.<seq>[.gz]`), oldest
/// first.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be read.
pub fn rotated_siblings(path: &Path) -> io::Result<Vec<PathBuf>> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = format!("{}.", file_name(path));

    let mut rotated: Vec<PathBuf> = fs::read_dir(parent)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|candidate| {
            candidate
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix))
        })
        .collect();

    // Timestamp and zero-padded sequence make lexical order chronological.
    rotated.sort();
    Ok(rotated)
}

fn active_file_missing(path: &Path) -> bool {
    matches!(fs::metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn compress(path: &Path) -> io::Result<PathBuf> {
    let gz_path = path.with_file_name(format!("{}.gz", file_name(path)));

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()?;

    fs::remove_file(path)?;
    Ok(gz_path)
}
