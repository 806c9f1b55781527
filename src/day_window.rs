//! Day boundary tracking and window persistence
//!
//! The pinned `DayWindow` is the only mutable state in the engine. It is
//! persisted as three scalar fields in a TOML record, loaded once at startup
//! and kept in memory thereafter, and rebuilt exactly when the current local
//! calendar date no longer matches the persisted date.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{NeatError, Result, StorageError};
use crate::models::{local_date_for, DayWindow};

/// Durable form of a `DayWindow`: three scalar fields, any key-value store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedWindow {
    /// Absolute instant of local midnight, epoch milliseconds
    pub start_of_day_epoch_millis: i64,

    /// UTC offset captured at that midnight, in seconds
    pub zone_offset_at_start_seconds: i32,

    /// The local date this window represents, "YYYY-MM-DD"
    pub calendar_date_iso: String,
}

impl PersistedWindow {
    pub fn from_window(window: &DayWindow) -> Self {
        PersistedWindow {
            start_of_day_epoch_millis: window.start_instant.timestamp_millis(),
            zone_offset_at_start_seconds: window.zone_offset_at_start.local_minus_utc(),
            calendar_date_iso: window.calendar_date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn to_window(&self) -> Result<DayWindow> {
        let start_instant = Utc
            .timestamp_millis_opt(self.start_of_day_epoch_millis)
            .single()
            .ok_or_else(|| {
                NeatError::Storage(StorageError::Corrupted {
                    reason: format!(
                        "invalid epoch millis: {}",
                        self.start_of_day_epoch_millis
                    ),
                })
            })?;

        let zone_offset_at_start = FixedOffset::east_opt(self.zone_offset_at_start_seconds)
            .ok_or_else(|| {
                NeatError::Storage(StorageError::Corrupted {
                    reason: format!(
                        "invalid zone offset seconds: {}",
                        self.zone_offset_at_start_seconds
                    ),
                })
            })?;

        let calendar_date = NaiveDate::parse_from_str(&self.calendar_date_iso, "%Y-%m-%d")
            .map_err(|e| {
                NeatError::Storage(StorageError::Corrupted {
                    reason: format!("invalid calendar date {:?}: {e}", self.calendar_date_iso),
                })
            })?;

        Ok(DayWindow {
            start_instant,
            zone_offset_at_start,
            calendar_date,
        })
    }
}

/// Durable storage contract for the day window
///
/// `save` must be atomic: a concurrent reader never observes a partially
/// written window.
pub trait WindowStore: Send {
    fn load(&self) -> Result<Option<PersistedWindow>>;
    fn save(&self, window: &PersistedWindow) -> Result<()>;
}

/// File-backed window store
///
/// Persists the window as a small TOML record. Writes go to a sibling
/// temporary file followed by a rename, so the record on disk is always
/// either the old window or the new one, never a partial write.
pub struct FileWindowStore {
    path: PathBuf,
}

impl FileWindowStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileWindowStore {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WindowStore for FileWindowStore {
    fn load(&self) -> Result<Option<PersistedWindow>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            NeatError::Storage(StorageError::ReadFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })
        })?;

        let window: PersistedWindow = toml::from_str(&content).map_err(|e| {
            NeatError::Storage(StorageError::Corrupted {
                reason: e.to_string(),
            })
        })?;

        Ok(Some(window))
    }

    fn save(&self, window: &PersistedWindow) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                NeatError::Storage(StorageError::WriteFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            })?;
        }

        let content = toml::to_string_pretty(window).map_err(|e| {
            NeatError::Storage(StorageError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })
        })?;

        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            NeatError::Storage(StorageError::WriteFailed {
                path: tmp_path.clone(),
                reason: e.to_string(),
            })
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            NeatError::Storage(StorageError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })
        })?;

        Ok(())
    }
}

/// In-memory window store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryWindowStore {
    inner: Mutex<Option<PersistedWindow>>,
}

impl MemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowStore for MemoryWindowStore {
    fn load(&self) -> Result<Option<PersistedWindow>> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| NeatError::Internal(format!("window store lock poisoned: {e}")))?;
        Ok(guard.clone())
    }

    fn save(&self, window: &PersistedWindow) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| NeatError::Internal(format!("window store lock poisoned: {e}")))?;
        *guard = Some(window.clone());
        Ok(())
    }
}

/// Day boundary tracker
///
/// Resolves the pinned window for the current local day. The store is read
/// once, on first use; afterwards the cached window is authoritative until
/// the local calendar date moves on.
pub struct DayBoundaryTracker<S: WindowStore> {
    store: S,
    cached: Option<DayWindow>,
    loaded: bool,
}

impl<S: WindowStore> DayBoundaryTracker<S> {
    pub fn new(store: S) -> Self {
        DayBoundaryTracker {
            store,
            cached: None,
            loaded: false,
        }
    }

    /// The pinned window for the local calendar date of `now`.
    ///
    /// If a window for that date already exists (cached or persisted) it is
    /// returned verbatim, ignoring any change in `tz_offset` since it was
    /// created. Otherwise a fresh window is built at local midnight,
    /// persisted over any stale record, and returned.
    pub fn current_window(
        &mut self,
        now: DateTime<Utc>,
        tz_offset: FixedOffset,
    ) -> Result<DayWindow> {
        if !self.loaded {
            self.load_persisted();
            self.loaded = true;
        }

        let today = local_date_for(now, tz_offset);

        if let Some(window) = self.cached {
            if window.calendar_date == today {
                return Ok(window);
            }
            debug!(
                old_date = %window.calendar_date,
                new_date = %today,
                "local calendar date rolled over, rebuilding day window"
            );
        }

        let window = DayWindow::for_instant(now, tz_offset);
        self.store.save(&PersistedWindow::from_window(&window))?;
        self.cached = Some(window);

        debug!(
            calendar_date = %window.calendar_date,
            start_instant = %window.start_instant,
            offset_seconds = window.zone_offset_at_start.local_minus_utc(),
            "pinned new day window"
        );

        Ok(window)
    }

    /// The currently pinned window, if any, without creating one
    pub fn pinned(&mut self) -> Option<DayWindow> {
        if !self.loaded {
            self.load_persisted();
            self.loaded = true;
        }
        self.cached
    }

    fn load_persisted(&mut self) {
        match self.store.load() {
            Ok(Some(persisted)) => match persisted.to_window() {
                Ok(window) => self.cached = Some(window),
                Err(e) => {
                    // A corrupted record never blocks a calculation; the
                    // window is rebuilt fresh for today.
                    warn!(error = %e, "discarding corrupted persisted day window");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "could not load persisted day window");
            }
        }
    }
}
