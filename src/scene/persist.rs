use std::path::{Path, PathBuf};

use crate::foundation::error::{LabelError, LabelResult};
use crate::scene::model::SceneState;

/// Fixed file name the whole scene blob is stored under.
pub const STORAGE_FILE: &str = "labelkit-scene-v1.json";

fn storage_path(dir: &Path) -> PathBuf {
    dir.join(STORAGE_FILE)
}

/// Load the persisted scene, falling back to defaults on any failure.
///
/// A missing file is the normal first-run case; a corrupt or invalid blob is
/// logged and discarded. This mirrors the startup contract: persistence
/// problems never surface to the editing session.
pub fn load(dir: &Path) -> SceneState {
    match try_load(dir) {
        Ok(Some(scene)) => scene,
        Ok(None) => SceneState::default(),
        Err(e) => {
            tracing::warn!("discarding persisted scene state: {e}");
            SceneState::default()
        }
    }
}

/// Load the persisted scene, reporting read problems to the caller.
///
/// Returns `Ok(None)` when no blob exists yet. A blob that parses but fails
/// [`SceneState::validate`] is treated as corrupt.
pub fn try_load(dir: &Path) -> LabelResult<Option<SceneState>> {
    let path = storage_path(dir);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LabelError::persistence_read(format!(
                "read '{}': {e}",
                path.display()
            )));
        }
    };

    let scene: SceneState = serde_json::from_slice(&bytes)
        .map_err(|e| LabelError::persistence_read(format!("parse '{}': {e}", path.display())))?;
    scene
        .validate()
        .map_err(|e| LabelError::persistence_read(format!("invalid persisted scene: {e}")))?;
    Ok(Some(scene))
}

/// Write the scene blob, creating the directory if needed.
///
/// Callers are expected to continue without persistence when this fails.
pub fn save(dir: &Path, scene: &SceneState) -> LabelResult<()> {
    let path = storage_path(dir);
    std::fs::create_dir_all(dir).map_err(|e| {
        LabelError::persistence_write(format!("create '{}': {e}", dir.display()))
    })?;
    let json = serde_json::to_vec(scene)
        .map_err(|e| LabelError::persistence_write(format!("serialize scene: {e}")))?;
    std::fs::write(&path, json).map_err(|e| {
        LabelError::persistence_write(format!("write '{}': {e}", path.display()))
    })
}

/// Remove the persisted blob, as part of an explicit reset-to-defaults.
pub fn reset(dir: &Path) -> LabelResult<()> {
    let path = storage_path(dir);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LabelError::persistence_write(format!(
            "remove '{}': {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/persist.rs"]
mod tests;
