//! Versioned save persistence.
//!
//! A single serialized blob holds player progression, inventory, and
//! settings. The store synchronizes it with live runtime state in two
//! directions: `capture` (runtime → record) and `apply` (record → runtime),
//! and `save`/`load` move the record to and from stable storage.

pub mod store;
pub mod types;

pub use store::{FileStorage, MemoryStorage, PersistenceStore, SaveStorage};
pub use types::{EquipSlot, EquipmentRecord, PlayerRecord, SaveBlob, SettingsRecord};
