//! Named, saved filter snapshots.
//!
//! A preset captures a complete [`FilterValueSet`] under a name. Snapshots
//! are value copies in both directions: saving clones the live set, loading
//! clones the stored one, so the active filters and the preset can never
//! alias each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FilterError, Result};
use crate::value::FilterValueSet;

/// An immutable snapshot of a complete filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Assigned at save time, never reused even after deletion.
    pub id: Uuid,
    pub name: String,
    pub filters: FilterValueSet,
    pub created_at: DateTime<Utc>,
}

impl Preset {
    fn new(name: String, filters: FilterValueSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            filters,
            created_at: Utc::now(),
        }
    }
}

/// Holds the saved presets for one module.
///
/// The manager itself is storage-agnostic; [`load_file`](Self::load_file) /
/// [`save_file`](Self::save_file) provide the JSON-file persistence the CLI
/// uses, and integrators with other backends can serialize the manager
/// however they like.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetManager {
    presets: Vec<Preset>,
}

impl PresetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the given values under a name. The snapshot is a deep copy
    /// taken now; later edits to the live set do not touch it.
    pub fn save(&mut self, name: impl Into<String>, values: &FilterValueSet) -> Preset {
        let preset = Preset::new(name.into(), values.clone());
        self.presets.push(preset.clone());
        preset
    }

    /// Copy of the snapshot stored under `id`, or `None` for an unknown id.
    /// Never an error: preset lists may lag an external store.
    pub fn load(&self, id: Uuid) -> Option<FilterValueSet> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.filters.clone())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    /// Remove a preset; returns whether it existed. Its id stays retired.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        self.presets.len() != before
    }

    /// Load a preset file, or return an empty manager when the file does
    /// not exist yet. A file that exists but does not parse as a preset
    /// list is reported as [`FilterError::PresetShape`].
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| FilterError::PresetShape(e.to_string()))
    }

    pub fn save_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
