//! # Catalog Store
//!
//! Owns the persisted tool and starter pack collections. Loads defaults when
//! nothing usable is on disk, and re-persists after every mutation.
//!
//! Collection edits are pure functions (`upsert`, `remove`) so the rules are
//! testable without a database; [`CatalogStore`] wires them to SQLite.

use super::db::{CatalogDb, KEY_PACKS, KEY_TOOLS};
use super::defaults;
use crate::model::{StarterPack, Tool};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Replace a tool in place when the id matches, otherwise prepend it as the
/// newest entry. Does not mutate the input.
pub fn upsert(tools: &[Tool], tool: Tool) -> Vec<Tool> {
    let mut next = tools.to_vec();
    match next.iter().position(|t| t.id == tool.id) {
        Some(idx) => next[idx] = tool,
        None => next.insert(0, tool),
    }
    next
}

/// Remove the tool with the given id; no-op when absent.
pub fn remove(tools: &[Tool], id: &str) -> Vec<Tool> {
    tools.iter().filter(|t| t.id != id).cloned().collect()
}

/// Generate a fresh tool identifier.
///
/// v4 UUIDs are far beyond the "practically safe for a session-scale
/// catalog" bar; cryptographic uniqueness is not a requirement here.
pub fn new_tool_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Resolve a pack's tool references against the catalog, silently omitting
/// dangling ids. Order follows the pack's reference order.
pub fn resolve_pack(pack: &StarterPack, tools: &[Tool]) -> Vec<Tool> {
    pack.tool_ids
        .iter()
        .filter_map(|id| tools.iter().find(|t| &t.id == id))
        .cloned()
        .collect()
}

/// Persistent store for tools and starter packs
pub struct CatalogStore {
    db: CatalogDb,
}

impl CatalogStore {
    /// Create a store over an open database
    pub fn new(db: CatalogDb) -> Self {
        Self { db }
    }

    /// Load both collections.
    ///
    /// Each key falls back to the built-in defaults independently: a corrupt
    /// tools blob does not discard a healthy packs blob. Malformed data is
    /// logged and never surfaced as an error.
    pub fn load(&self) -> Result<(Vec<Tool>, Vec<StarterPack>)> {
        let tools = self.load_collection(KEY_TOOLS, defaults::default_tools)?;
        let packs = self.load_collection(KEY_PACKS, defaults::default_packs)?;
        Ok((tools, packs))
    }

    /// Load just the tool collection
    pub fn load_tools(&self) -> Result<Vec<Tool>> {
        self.load_collection(KEY_TOOLS, defaults::default_tools)
    }

    /// Load just the starter packs
    pub fn load_packs(&self) -> Result<Vec<StarterPack>> {
        self.load_collection(KEY_PACKS, defaults::default_packs)
    }

    fn load_collection<T, F>(&self, key: &str, fallback: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        match self.db.get_blob(key)? {
            Some(data) => match serde_json::from_str(&data) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    tracing::warn!("Malformed '{}' blob, using defaults: {}", key, e);
                    Ok(fallback())
                }
            },
            None => Ok(fallback()),
        }
    }

    /// Persist both collections. Empty collections are skipped so that a
    /// transiently empty state never clobbers the last good blob.
    pub fn save(&self, tools: &[Tool], packs: &[StarterPack]) -> Result<()> {
        self.save_collection(KEY_TOOLS, tools)?;
        self.save_collection(KEY_PACKS, packs)?;
        Ok(())
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        if items.is_empty() {
            tracing::debug!("Skipping save of empty '{}' collection", key);
            return Ok(());
        }
        let data = serde_json::to_string(items)?;
        self.db.set_blob(key, &data)
    }

    /// Insert or replace a tool, persist, and return the new collection.
    pub fn upsert_tool(&self, tool: Tool) -> Result<Vec<Tool>> {
        let tools = upsert(&self.load_tools()?, tool);
        self.save_collection(KEY_TOOLS, &tools)?;
        tracing::info!("Catalog now holds {} tools", tools.len());
        Ok(tools)
    }

    /// Delete a tool by id, persist, and return the new collection.
    /// Deleting an unknown id is a no-op, not an error.
    pub fn delete_tool(&self, id: &str) -> Result<Vec<Tool>> {
        let tools = remove(&self.load_tools()?, id);
        self.save_collection(KEY_TOOLS, &tools)?;
        Ok(tools)
    }
}
