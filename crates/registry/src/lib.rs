//! The cross-project catalog of generated sites.
//!
//! Each catalog is a `registry.json` array living in some directory. A
//! scaffolding run upserts one entry into every configured location; the
//! index renderer turns a catalog into a browsable page.

pub mod entry;
pub mod error;
pub mod index;
pub mod store;
pub mod sync;

pub use {
    entry::RegistryEntry,
    error::{Error, Result},
    index::render_index,
    store::{REGISTRY_FILE, RegistryStore, UpsertReport, UpsertResult},
    sync::{LocationReport, RegistryTarget, registry_targets, sync_registries},
};
