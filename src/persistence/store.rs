//! Save storage backends and the capture/apply store.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;

use super::types::{EquipmentRecord, PlayerRecord, SaveBlob, SettingsRecord, SAVE_SCHEMA_VERSION};
use crate::constants::SAVE_FILE_NAME;

/// Where the serialized blob lives. Production uses [`FileStorage`]; tests
/// and the headless simulator use [`MemoryStorage`].
pub trait SaveStorage {
    fn read(&self) -> io::Result<String>;
    fn write(&self, data: &str) -> io::Result<()>;
}

impl<S: SaveStorage> SaveStorage for std::rc::Rc<S> {
    fn read(&self) -> io::Result<String> {
        (**self).read()
    }

    fn write(&self, data: &str) -> io::Result<()> {
        (**self).write(data)
    }
}

/// Platform config-dir backed storage.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates storage under the platform config directory.
    pub fn new() -> io::Result<Self> {
        let dirs = ProjectDirs::from("", "", "skirmish").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine config directory")
        })?;
        let dir = dirs.config_dir();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(SAVE_FILE_NAME),
        })
    }

    /// Storage at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SaveStorage for FileStorage {
    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn write(&self, data: &str) -> io::Result<()> {
        fs::write(&self.path, data)
    }
}

/// In-memory storage.
#[derive(Default)]
pub struct MemoryStorage {
    data: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the stored content, as if a previous run had saved it.
    pub fn with_content(content: &str) -> Self {
        Self {
            data: RefCell::new(Some(content.to_string())),
        }
    }

    pub fn content(&self) -> Option<String> {
        self.data.borrow().clone()
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self) -> io::Result<String> {
        self.data
            .borrow()
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no saved data"))
    }

    fn write(&self, data: &str) -> io::Result<()> {
        *self.data.borrow_mut() = Some(data.to_string());
        Ok(())
    }
}

/// Versioned load/save of the progression blob, plus the two runtime
/// synchronization directions: capture (runtime → record) and apply
/// (record → runtime).
pub struct PersistenceStore<S: SaveStorage> {
    storage: S,
    blob: SaveBlob,
}

impl<S: SaveStorage> PersistenceStore<S> {
    /// Creates a store with a default in-memory record. Call [`load`] to
    /// hydrate it from storage.
    ///
    /// [`load`]: PersistenceStore::load
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            blob: SaveBlob::default(),
        }
    }

    /// Reads the blob from storage.
    ///
    /// Absent or corrupt data synthesizes schema defaults rather than
    /// failing. Older-version blobs keep all their data (missing fields
    /// backfill to defaults), get bumped to the current version, and the
    /// migration is persisted immediately.
    pub fn load(&mut self) {
        self.blob = match self.storage.read() {
            Ok(raw) => match serde_json::from_str::<SaveBlob>(&raw) {
                Ok(blob) => blob,
                Err(err) => {
                    log::warn!("save blob corrupt ({err}); reinitializing with defaults");
                    SaveBlob::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("no save found; starting fresh");
                SaveBlob::default()
            }
            Err(err) => {
                log::warn!("save blob unreadable ({err}); reinitializing with defaults");
                SaveBlob::default()
            }
        };

        if self.blob.version < SAVE_SCHEMA_VERSION {
            log::info!(
                "migrating save from schema v{} to v{}",
                self.blob.version,
                SAVE_SCHEMA_VERSION
            );
            self.blob.version = SAVE_SCHEMA_VERSION;
            if let Err(err) = self.save() {
                log::warn!("could not persist save migration: {err}");
            }
        }
    }

    /// Snapshots live runtime state into the in-memory record. No I/O.
    pub fn capture(
        &mut self,
        player: &PlayerRecord,
        equipment: &EquipmentRecord,
        settings: &SettingsRecord,
        now: i64,
        play_time_seconds: u64,
    ) {
        self.blob.player = player.clone();
        self.blob.equipment = equipment.clone();
        self.blob.settings = settings.clone();
        self.blob.last_save_time = now;
        self.blob.play_time_seconds = play_time_seconds;
    }

    /// Pushes the record's values back onto live runtime state.
    pub fn apply(
        &self,
        player: &mut PlayerRecord,
        equipment: &mut EquipmentRecord,
        settings: &mut SettingsRecord,
    ) {
        *player = self.blob.player.clone();
        *equipment = self.blob.equipment.clone();
        *settings = self.blob.settings.clone();
    }

    /// Serializes the in-memory record to storage. Idempotent; safe to call
    /// repeatedly. Callers catch and log failures so a full disk or locked
    /// file never crashes a session.
    pub fn save(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.blob)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.storage.write(&json)
    }

    pub fn blob(&self) -> &SaveBlob {
        &self.blob
    }
}
