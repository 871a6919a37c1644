//! File backend with log rotation
//!
//! Writes formatted lines to an append-only file, tracking line and byte
//! counts, and rotates the file when a configured threshold is crossed or a
//! local-day boundary passes. Archived files older than the retention window
//! are pruned during rotation.
//!
//! Archive naming convention: a rotation triggered by the day boundary
//! renames the live file to `<stem>.<YYYY-MM-DD>.<ext>` (stamped with the
//! rotation date; a same-day collision falls back to
//! `<stem>.<YYYY-MM-DD>.<NNN>.<ext>`). A rotation triggered by the line or
//! size threshold renames it to `<stem>.<NNN>.<ext>` using the first free
//! zero-padded number from `001`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Datelike, Days, Local};
use serde::Deserialize;

use super::Backend;
use crate::error::Error;
use crate::level::Level;
use crate::writer::format_timestamp;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    filename: String,
    /// Rotate once this many lines have been written (0 disables).
    maxlines: u64,
    /// Rotate once the file reaches this many bytes (0 disables).
    maxsize: u64,
    /// Rotate at each local-midnight boundary.
    daily: bool,
    /// Delete archived files older than this many days (0 disables).
    maxdays: u64,
    /// Master switch for all rotation.
    rotate: bool,
    /// Octal permission bits applied to the log file.
    perm: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            maxlines: 0,
            maxsize: 0,
            daily: false,
            maxdays: 0,
            rotate: true,
            perm: "0777".to_string(),
        }
    }
}

/// Mutable file state, shared with the daily-rotation timer thread.
struct FileState {
    file: Option<File>,
    path: PathBuf,
    perm: u32,
    curr_lines: u64,
    curr_bytes: u64,
    /// Day the file was (re)opened, as days since the common era.
    open_day: i32,
}

impl FileState {
    /// Open (or create) the log file in append mode and reseed the counters.
    ///
    /// The byte counter picks up the existing file size; the line count of a
    /// pre-existing file is not recovered (that would require scanning the
    /// whole file) and restarts at zero. Line-threshold rotation of a
    /// reopened file is therefore late by up to one file's worth of lines.
    fn open(&mut self) -> Result<(), Error> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.perm);
        }
        let file = options.open(&self.path).map_err(|source| Error::FileOpenFailure {
            path: self.path.clone(),
            source,
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // The process umask narrows the mode passed at open; chmod to
            // the configured bits, matching the open-then-chmod of the
            // original adapter. Failure here is not fatal.
            let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(self.perm));
        }
        let size = file
            .metadata()
            .map_err(|source| Error::FileOpenFailure {
                path: self.path.clone(),
                source,
            })?
            .len();
        self.curr_bytes = size;
        self.curr_lines = 0;
        self.open_day = day_stamp(Local::now());
        self.file = Some(file);
        Ok(())
    }
}

/// Backend writing formatted lines to a rotating, append-only log file.
pub struct FileBackend {
    config: FileConfig,
    state: Option<Arc<Mutex<FileState>>>,
}

impl FileBackend {
    pub fn new() -> Self {
        Self {
            config: FileConfig::default(),
            state: None,
        }
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for FileBackend {
    fn init(&mut self, config: &str) -> Result<(), Error> {
        if !config.is_empty() {
            self.config = serde_json::from_str(config)?;
        }
        if self.config.filename.is_empty() {
            return Err(Error::MissingFilename);
        }
        let perm = u32::from_str_radix(&self.config.perm, 8)
            .map_err(|_| Error::InvalidConfig(format!("perm {:?} is not octal", self.config.perm)))?;

        let mut path = PathBuf::from(&self.config.filename);
        if path.extension().is_none() {
            path.set_extension("log");
        }

        let mut state = FileState {
            file: None,
            path,
            perm,
            curr_lines: 0,
            curr_bytes: 0,
            open_day: day_stamp(Local::now()),
        };
        state.open()?;

        let state = Arc::new(Mutex::new(state));
        if self.config.rotate && self.config.daily {
            spawn_daily_rotation(self.config.clone(), Arc::downgrade(&state));
        }
        self.state = Some(state);
        Ok(())
    }

    fn write_message(&self, when: DateTime<Local>, msg: &str, _level: Level) -> Result<(), Error> {
        let state = self.state.as_ref().ok_or_else(|| {
            Error::WriteFailure(std::io::Error::new(
                std::io::ErrorKind::Other,
                "file backend used before init",
            ))
        })?;
        let line = format!("{}{}\n", format_timestamp(when), msg);

        let mut st = state.lock().unwrap_or_else(|e| e.into_inner());
        if st.file.is_none() {
            // Handle lost to an earlier failed rotation; retry the open.
            st.open()?;
        }
        let today = day_stamp(when);
        if needs_rotate(&self.config, &st, today) {
            do_rotate(&self.config, &mut st, today)?;
        }
        let file = st
            .file
            .as_mut()
            .ok_or_else(|| {
                Error::WriteFailure(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "log file is closed",
                ))
            })?;
        file.write_all(line.as_bytes()).map_err(Error::WriteFailure)?;
        st.curr_lines += 1;
        st.curr_bytes += line.len() as u64;
        Ok(())
    }
}

fn day_stamp(when: DateTime<Local>) -> i32 {
    when.num_days_from_ce()
}

fn needs_rotate(config: &FileConfig, state: &FileState, today: i32) -> bool {
    config.rotate
        && ((config.maxlines > 0 && state.curr_lines >= config.maxlines)
            || (config.maxsize > 0 && state.curr_bytes >= config.maxsize)
            || (config.daily && today != state.open_day))
}

/// Close, archive, and reopen the log file, then prune expired archives.
///
/// Must be called with the state lock held. On a failed archive rename the
/// original file is reopened so later writes can proceed, and the caller
/// gets `RotationFailure`.
fn do_rotate(config: &FileConfig, state: &mut FileState, today: i32) -> Result<(), Error> {
    let by_day = config.daily && today != state.open_day;
    state.file = None;

    if state.path.exists() {
        let archived = archive_path(&state.path, by_day);
        if let Err(source) = fs::rename(&state.path, &archived) {
            state.open()?;
            return Err(Error::RotationFailure {
                path: state.path.clone(),
                source,
            });
        }
    }

    state.open()?;
    if config.maxdays > 0 {
        prune_archives(&state.path, config.maxdays);
    }
    Ok(())
}

fn archive_path(live: &Path, by_day: bool) -> PathBuf {
    let dir = parent_dir(live);
    let stem = live
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("log")
        .to_string();
    let ext = live
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("log")
        .to_string();

    if by_day {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let plain = dir.join(format!("{stem}.{date}.{ext}"));
        if !plain.exists() {
            return plain;
        }
        // Same-day restart already archived under this date.
        numbered_path(&dir, &format!("{stem}.{date}"), &ext)
    } else {
        numbered_path(&dir, &stem, &ext)
    }
}

fn numbered_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let mut n: u32 = 1;
    loop {
        let candidate = dir.join(format!("{base}.{n:03}.{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn parent_dir(live: &Path) -> PathBuf {
    match live.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Delete archived siblings of `live` older than `maxdays` days.
///
/// Only files matching `<stem>.*.<ext>` are considered; the live file is
/// never touched. Failures go to the diagnostic stream and never abort the
/// write that triggered rotation.
fn prune_archives(live: &Path, maxdays: u64) {
    let dir = parent_dir(live);
    let Some(live_name) = live.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    let Some(stem) = live.file_stem().and_then(|s| s.to_str()) else {
        return;
    };
    let ext = live.extension().and_then(|s| s.to_str()).unwrap_or("log");
    let prefix = format!("{stem}.");
    let suffix = format!(".{ext}");

    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(maxdays * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("fanlog: retention scan of {dir:?} failed: {err}");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == live_name || !name.starts_with(&prefix) || !name.ends_with(&suffix) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if modified < cutoff {
            if let Err(err) = fs::remove_file(&path) {
                eprintln!("fanlog: failed to delete expired log {path:?}: {err}");
            }
        }
    }
}

/// Arm the per-backend midnight timer.
///
/// The thread holds only a `Weak` to the file state, so it exits once the
/// backend is dropped. It reacquires the write lock before rotating, so it
/// never rotates concurrently with an in-progress write.
fn spawn_daily_rotation(config: FileConfig, state: Weak<Mutex<FileState>>) {
    let spawned = std::thread::Builder::new()
        .name("fanlog-daily-rotation".to_string())
        .spawn(move || loop {
            std::thread::sleep(until_next_midnight(Local::now()));
            let Some(state) = state.upgrade() else {
                return;
            };
            let mut st = state.lock().unwrap_or_else(|e| e.into_inner());
            let today = day_stamp(Local::now());
            if needs_rotate(&config, &st, today) {
                if let Err(err) = do_rotate(&config, &mut st, today) {
                    eprintln!("fanlog: daily rotation of {:?} failed: {err}", st.path);
                }
            }
        });
    if let Err(err) = spawned {
        eprintln!("fanlog: failed to start daily rotation timer: {err}");
    }
}

fn until_next_midnight(now: DateTime<Local>) -> Duration {
    let next = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest());
    match next {
        // Small grace period so the wakeup lands on the far side of midnight.
        Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO) + Duration::from_millis(100),
        None => Duration::from_secs(24 * 60 * 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn file_backend(config: &str) -> FileBackend {
        let mut backend = FileBackend::new();
        backend.init(config).unwrap();
        backend
    }

    fn write_lines(backend: &FileBackend, count: usize) {
        for i in 0..count {
            backend
                .write_message(Local::now(), &format!(" [Info] line {i}"), Level::Info)
                .unwrap();
        }
    }

    fn line_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_init_requires_filename() {
        let mut backend = FileBackend::new();
        assert!(matches!(backend.init("{}"), Err(Error::MissingFilename)));
        assert!(matches!(backend.init(""), Err(Error::MissingFilename)));
    }

    #[test]
    fn test_init_rejects_bad_perm() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        let config = format!(r#"{{"filename": {:?}, "perm": "rwx"}}"#, filename);
        let mut backend = FileBackend::new();
        assert!(matches!(backend.init(&config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_init_rejects_malformed_json() {
        let mut backend = FileBackend::new();
        assert!(matches!(backend.init("{filename"), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_extension_defaults_to_log() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app");
        let config = format!(r#"{{"filename": {:?}}}"#, filename);
        let backend = file_backend(&config);
        write_lines(&backend, 1);
        assert!(temp.path().join("app.log").exists());
    }

    #[test]
    fn test_reopen_seeds_byte_count_not_lines() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        fs::write(&filename, "previous run\n").unwrap();

        let config = format!(r#"{{"filename": {:?}}}"#, filename);
        let backend = file_backend(&config);

        let state = backend.state.as_ref().unwrap().lock().unwrap();
        assert_eq!(state.curr_bytes, "previous run\n".len() as u64);
        assert_eq!(state.curr_lines, 0);
    }

    #[test]
    fn test_maxlines_rotates_exactly_once_on_overflow() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        let config = format!(r#"{{"filename": {:?}, "maxlines": 3}}"#, filename);
        let backend = file_backend(&config);

        // The first three writes fill the file without rotating.
        write_lines(&backend, 3);
        assert!(!temp.path().join("app.001.log").exists());
        assert_eq!(line_count(&filename), 3);

        // The fourth write rotates first, then lands in the fresh file.
        write_lines(&backend, 1);
        let archive = temp.path().join("app.001.log");
        assert!(archive.exists());
        assert_eq!(line_count(&archive), 3);
        assert_eq!(line_count(&filename), 1);

        let state = backend.state.as_ref().unwrap().lock().unwrap();
        assert_eq!(state.curr_lines, 1);
    }

    #[test]
    fn test_count_rotations_pick_next_free_number() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        let config = format!(r#"{{"filename": {:?}, "maxlines": 2}}"#, filename);
        let backend = file_backend(&config);

        write_lines(&backend, 6);
        assert!(temp.path().join("app.001.log").exists());
        assert!(temp.path().join("app.002.log").exists());
        assert!(!temp.path().join("app.003.log").exists());
    }

    #[test]
    fn test_maxsize_rotates_on_threshold() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        // Every line is well over 10 bytes, so the second write rotates.
        let config = format!(r#"{{"filename": {:?}, "maxsize": 10}}"#, filename);
        let backend = file_backend(&config);

        write_lines(&backend, 2);
        assert!(temp.path().join("app.001.log").exists());
        assert_eq!(line_count(&filename), 1);
    }

    #[test]
    fn test_rotate_flag_disables_rotation() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        let config = format!(r#"{{"filename": {:?}, "maxlines": 2, "rotate": false}}"#, filename);
        let backend = file_backend(&config);

        write_lines(&backend, 5);
        assert!(!temp.path().join("app.001.log").exists());
        assert_eq!(line_count(&filename), 5);
    }

    #[test]
    fn test_day_boundary_rotates_once_under_concurrent_writers() {
        let temp = TempDir::new().unwrap();
        let filename = temp.path().join("app.log");
        let config = format!(r#"{{"filename": {:?}, "daily": true}}"#, filename);
        let backend = Arc::new(file_backend(&config));

        // Simulate a file opened before midnight.
        backend.state.as_ref().unwrap().lock().unwrap().open_day -= 1;

        let mut handles = Vec::new();
        for thread_id in 0..8 {
            let backend = Arc::clone(&backend);
            handles.push(std::thread::spawn(move || {
                for i in 0..5 {
                    backend
                        .write_message(
                            Local::now(),
                            &format!(" [Info] t={thread_id} i={i}"),
                            Level::Info,
                        )
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let date = Local::now().format("%Y-%m-%d").to_string();
        let archive = temp.path().join(format!("app.{date}.log"));
        assert!(archive.exists(), "expected date-stamped archive");
        // Exactly one rotation: every line is in either the archive or the
        // live file, and no second archive appeared.
        assert_eq!(line_count(&archive) + line_count(&filename), 40);
        assert!(!temp.path().join(format!("app.{date}.001.log")).exists());
    }

    #[test]
    fn test_prune_keeps_recent_and_unrelated_files() {
        let temp = TempDir::new().unwrap();
        let live = temp.path().join("app.log");
        fs::write(&live, "live\n").unwrap();
        let recent = temp.path().join("app.001.log");
        fs::write(&recent, "archived\n").unwrap();
        let unrelated = temp.path().join("other.001.log");
        fs::write(&unrelated, "not ours\n").unwrap();

        prune_archives(&live, 7);

        assert!(live.exists());
        assert!(recent.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_write_before_init_fails() {
        let backend = FileBackend::new();
        let err = backend
            .write_message(Local::now(), " [Info] x", Level::Info)
            .unwrap_err();
        assert!(matches!(err, Error::WriteFailure(_)));
    }
}
