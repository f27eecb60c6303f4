//! Filesystem and clock abstraction
//!
//! All filesystem access in the build core goes through [`BuildHost`]. The
//! analyzer's decisions rest entirely on modification times, so the trait
//! also owns the clock; tests drive a [`MemoryHost`] with a manual clock to
//! pin down timestamp edge cases that real filesystems cannot reproduce
//! deterministically.

use mason_config::normalize_path;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub trait BuildHost {
    fn current_dir(&self) -> PathBuf;

    /// True iff `path` exists and is a regular file.
    fn file_exists(&self, path: &Path) -> bool;

    fn read_file(&self, path: &Path) -> Option<String>;

    /// Write `content`, creating parent directories as needed.
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;

    fn modified_time(&self, path: &Path) -> Option<SystemTime>;

    fn set_modified_time(&self, path: &Path, time: SystemTime) -> io::Result<()>;

    fn now(&self) -> SystemTime;
}

/// The real filesystem and clock.
pub struct SystemHost;

impl BuildHost for SystemHost {
    fn current_dir(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        fs::read_to_string(path).ok()
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn modified_time(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn set_modified_time(&self, path: &Path, time: SystemTime) -> io::Result<()> {
        let file = fs::OpenOptions::new().append(true).open(path)?;
        file.set_modified(time)
    }

    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    mtime: SystemTime,
}

struct MemoryState {
    files: HashMap<PathBuf, MemoryFile>,
    clock: SystemTime,
}

/// In-memory host with a manually advanced clock.
///
/// Writes stamp the current clock; the clock only moves when told to. Paths
/// are normalized on every access, matching the keying discipline of the
/// build core.
pub struct MemoryHost {
    current_dir: PathBuf,
    state: Mutex<MemoryState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::with_current_dir("/")
    }

    pub fn with_current_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: dir.into(),
            state: Mutex::new(MemoryState {
                files: HashMap::new(),
                // Keep well clear of the epoch so "older than everything"
                // sentinels stay older than every file.
                clock: SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Advance the clock and return the new time.
    pub fn advance(&self, by: Duration) -> SystemTime {
        let mut state = self.lock();
        state.clock += by;
        state.clock
    }

    /// Advance the clock by one nanosecond.
    pub fn tick(&self) -> SystemTime {
        self.advance(Duration::from_nanos(1))
    }

    /// Write a file stamped at an explicit time, leaving the clock alone.
    pub fn write_at(&self, path: impl AsRef<Path>, content: &str, mtime: SystemTime) {
        self.lock().files.insert(
            normalize_path(path.as_ref()),
            MemoryFile {
                content: content.to_string(),
                mtime,
            },
        );
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.lock().files.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildHost for MemoryHost {
    fn current_dir(&self) -> PathBuf {
        self.current_dir.clone()
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.lock().files.contains_key(&normalize_path(path))
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        self.lock()
            .files
            .get(&normalize_path(path))
            .map(|f| f.content.clone())
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut state = self.lock();
        let mtime = state.clock;
        state.files.insert(
            normalize_path(path),
            MemoryFile {
                content: content.to_string(),
                mtime,
            },
        );
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        match self.lock().files.remove(&normalize_path(path)) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }

    fn modified_time(&self, path: &Path) -> Option<SystemTime> {
        self.lock().files.get(&normalize_path(path)).map(|f| f.mtime)
    }

    fn set_modified_time(&self, path: &Path, time: SystemTime) -> io::Result<()> {
        match self.lock().files.get_mut(&normalize_path(path)) {
            Some(file) => {
                file.mtime = time;
                Ok(())
            }
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }

    fn now(&self) -> SystemTime {
        self.lock().clock
    }
}
