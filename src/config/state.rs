use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

const STATE_VERSION: u32 = 0;

/// On-disk document tracking hidden devices, hidden processes, and the audio
/// sources currently muted through this tool.
///
/// `muted` only lists sources muted by the partial mute mode; it is not a
/// mirror of the driver's native mute flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentState {
    pub version: u32,
    pub devices: BTreeMap<String, String>,
    pub processes: Vec<String>,
    pub muted: Vec<String>,
}

impl Default for PersistentState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            devices: BTreeMap::new(),
            processes: Vec::new(),
            muted: Vec::new(),
        }
    }
}

/// Loads the state document once and flushes it synchronously on every change.
///
/// An unreadable or corrupt file loads as the empty document; an unwritable
/// file leaves the in-memory state authoritative for the session.
pub struct StateStore {
    path: PathBuf,
    data: Mutex<PersistentState>,
}

impl StateStore {
    pub fn load(path: PathBuf) -> Self {
        let data = match Self::read_document(&path) {
            Ok(state) => state,
            Err(e) => {
                debug!(
                    "No usable state document at {}: {}. Starting empty.",
                    path.display(),
                    e
                );
                PersistentState::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn default_state_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home_dir.join(".config/volume-gestures/state.json"))
    }

    fn read_document(path: &PathBuf) -> Result<PersistentState> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))
    }

    /// Write the whole document; returns whether the write succeeded.
    pub fn save(&self) -> bool {
        let content = {
            let data = self.data.lock().unwrap();
            match serde_json::to_string_pretty(&*data) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to serialize state document: {}", e);
                    return false;
                }
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create state directory {}: {}", parent.display(), e);
                return false;
            }
        }
        match fs::write(&self.path, content) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write state file {}: {}", self.path.display(), e);
                false
            }
        }
    }

    pub fn hidden_devices(&self) -> BTreeMap<String, String> {
        self.data.lock().unwrap().devices.clone()
    }

    pub fn set_hidden_devices(&self, devices: BTreeMap<String, String>) {
        self.data.lock().unwrap().devices = devices;
        self.save();
    }

    pub fn hidden_processes(&self) -> Vec<String> {
        self.data.lock().unwrap().processes.clone()
    }

    pub fn set_hidden_processes(&self, processes: Vec<String>) {
        self.data.lock().unwrap().processes = processes;
        self.save();
    }

    pub fn is_device_hidden(&self, id: &str) -> bool {
        self.data.lock().unwrap().devices.contains_key(id)
    }

    pub fn is_process_hidden(&self, name: &str) -> bool {
        self.data.lock().unwrap().processes.iter().any(|p| p == name)
    }

    /// Whether the source id was muted through the partial mute mode.
    pub fn is_muted(&self, id: &str) -> bool {
        self.data.lock().unwrap().muted.iter().any(|m| m == id)
    }

    pub fn muted(&self) -> Vec<String> {
        self.data.lock().unwrap().muted.clone()
    }

    /// Record a source as muted and flush immediately.
    pub fn add_muted(&self, id: &str) {
        if id.is_empty() {
            return;
        }
        {
            let mut data = self.data.lock().unwrap();
            if data.muted.iter().any(|m| m == id) {
                return;
            }
            data.muted.push(id.to_string());
        }
        self.save();
    }

    /// Remove a source from the muted set and flush immediately.
    pub fn remove_muted(&self, id: &str) {
        {
            let mut data = self.data.lock().unwrap();
            let before = data.muted.len();
            data.muted.retain(|m| m != id);
            if data.muted.len() == before {
                return;
            }
        }
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let store = StateStore::load(PathBuf::from("/nonexistent/volume-gestures/state.json"));
        assert!(store.muted().is_empty());
        assert!(store.hidden_devices().is_empty());
        assert!(store.hidden_processes().is_empty());
    }

    #[test]
    fn test_add_muted_ignores_empty_and_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json"));
        store.add_muted("");
        store.add_muted("player.exe");
        store.add_muted("player.exe");
        assert_eq!(store.muted(), vec!["player.exe".to_string()]);
    }
}
