//! Persisted "last seen message" per channel.

use std::{
    collections::BTreeMap,
    path::PathBuf,
};

use tracing::{debug, warn};

use crate::Result;

/// Canonical channel key -> highest delivered message id.
pub type Checkpoints = BTreeMap<String, u64>;

/// Durable checkpoint storage.
///
/// No locking: concurrent invocations for one channel can race and lose an
/// advancement. Acceptable for a single-operator CLI.
pub trait CheckpointStore: Send + Sync {
    /// Never fails: missing or corrupt state reads as empty.
    fn load(&self) -> Checkpoints;

    fn save(&self, state: &Checkpoints) -> Result<()>;
}

/// Flat JSON object file, e.g. `{"-1001234": 57}`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoints".into());
        name.push(format!(".tmp-{}", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl CheckpointStore for JsonFileStore {
    fn load(&self) -> Checkpoints {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Checkpoints::new(),
            Err(e) => {
                warn!("cannot read {}: {e}; starting from empty state", self.path.display());
                return Checkpoints::new();
            }
        };

        match serde_json::from_str::<Checkpoints>(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!("ignoring corrupt state file {}: {e}", self.path.display());
                Checkpoints::new()
            }
        }
    }

    fn save(&self, state: &Checkpoints) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        // Write-then-rename: a killed process leaves either the old or the new file.
        let tmp = self.temp_path();
        let txt = serde_json::to_string_pretty(state)?;
        std::fs::write(&tmp, txt)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("wrote {} checkpoint(s) to {}", state.len(), self.path.display());
        Ok(())
    }
}

/// Fold legacy entries into the canonical key.
///
/// Every legacy key present (other than the canonical one) contributes its
/// value to a running maximum and is removed. The canonical entry is then set
/// to that maximum. Returns `(last_id, changed)`; re-running after a migration
/// is a no-op.
pub fn reconcile(
    state: &mut Checkpoints,
    canonical_key: &str,
    legacy_keys: &[String],
) -> (u64, bool) {
    let mut changed = false;
    let mut last_id = state.get(canonical_key).copied().unwrap_or(0);

    for legacy in legacy_keys {
        if legacy == canonical_key {
            continue;
        }
        let Some(legacy_id) = state.remove(legacy) else {
            continue;
        };
        last_id = last_id.max(legacy_id);
        changed = true;
    }

    if state.get(canonical_key) != Some(&last_id) {
        state.insert(canonical_key.to_string(), last_id);
        changed = true;
    }

    (last_id, changed)
}
