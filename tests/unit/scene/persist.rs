use super::*;
use crate::scene::model::{Pattern, ScenePatch};

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "labelkit_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn save_then_load_roundtrips() {
    let dir = temp_dir("persist_roundtrip");

    let scene = SceneState::default().apply(ScenePatch {
        pattern: Some(Pattern::Waves),
        product_name: Some("Crema mani".to_string()),
        ..ScenePatch::default()
    });
    save(&dir, &scene).unwrap();

    let loaded = load(&dir);
    assert_eq!(loaded.pattern, Pattern::Waves);
    assert_eq!(loaded.product_name, "Crema mani");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_blob_loads_defaults() {
    let dir = temp_dir("persist_missing");
    assert!(try_load(&dir).unwrap().is_none());

    let scene = load(&dir);
    assert_eq!(scene.product_name, SceneState::default().product_name);
}

#[test]
fn corrupt_blob_is_reported_and_falls_back() {
    let dir = temp_dir("persist_corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(STORAGE_FILE), b"{not json").unwrap();

    let err = try_load(&dir).unwrap_err();
    assert!(matches!(err, crate::foundation::error::LabelError::PersistenceRead(_)));

    // The forgiving entry point recovers silently.
    let scene = load(&dir);
    assert_eq!(scene.tagline, SceneState::default().tagline);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn invalid_persisted_scene_counts_as_corrupt() {
    let dir = temp_dir("persist_invalid");
    std::fs::create_dir_all(&dir).unwrap();

    let mut scene = SceneState::default();
    scene.export.dpi = 9999;
    let json = serde_json::to_vec(&scene).unwrap();
    std::fs::write(dir.join(STORAGE_FILE), json).unwrap();

    assert!(try_load(&dir).is_err());
    assert_eq!(load(&dir).export.dpi, SceneState::default().export.dpi);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn reset_removes_the_blob_and_tolerates_absence() {
    let dir = temp_dir("persist_reset");
    save(&dir, &SceneState::default()).unwrap();
    assert!(try_load(&dir).unwrap().is_some());

    reset(&dir).unwrap();
    assert!(try_load(&dir).unwrap().is_none());
    // Resetting twice is fine.
    reset(&dir).unwrap();

    std::fs::remove_dir_all(&dir).ok();
}
