//! Editor settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::history::DEFAULT_UNDO_CAPACITY;
use crate::topology::DEFAULT_COPLANAR_THRESHOLD;

/// Smallest per-step scale factor; keeps scaled geometry from collapsing or flipping
pub const DEFAULT_MIN_SCALE_FACTOR: f32 = 0.01;

/// Tunables for the editing kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Minimum dot product between triangle normals for quad pairing
    pub coplanar_threshold: f32,
    /// Number of undo levels kept
    pub undo_capacity: usize,
    /// Lower clamp for the scale gizmo factor
    pub min_scale_factor: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            coplanar_threshold: DEFAULT_COPLANAR_THRESHOLD,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            min_scale_factor: DEFAULT_MIN_SCALE_FACTOR,
        }
    }
}

impl EditorSettings {
    /// Load settings from the platform config dir, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "quadmesh", "quadmesh") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Some(settings) = Self::load_from(&config_path) {
                return settings;
            }
        }
        Self::default()
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &Path) -> Option<Self> {
        let json = std::fs::read_to_string(path).ok()?;
        match Self::from_json(&json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Ignoring settings at {}: {e}", path.display());
                None
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid settings JSON: {e}"))
    }

    /// Save settings to the platform config dir
    pub fn save(&self) -> Result<(), String> {
        let dirs = directories::ProjectDirs::from("com", "quadmesh", "quadmesh")
            .ok_or_else(|| "No config directory on this platform".to_string())?;
        let result = self.save_to(&dirs.config_dir().join("settings.json"));
        if let Err(e) = &result {
            tracing::warn!("Settings not saved: {e}");
        }
        result
    }

    /// Write settings as pretty JSON to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create {}: {e}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Cannot serialize settings: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Cannot write {}: {e}", path.display()))
    }
}
