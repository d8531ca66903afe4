use fournil_forecast::error::DemandError;
use fournil_forecast::models::{DemandModel, ForestParams, ForestRegressor};
use fournil_forecast::store::{ModelState, ModelStore};
use fournil_forecast::BagFormat;
use std::collections::BTreeMap;
use std::fs;

fn tiny_model() -> DemandModel {
    let rows = vec![[2.0, 10.0, 1.0], [2.0, 11.0, 1.0], [3.0, 10.0, 1.0]];
    let targets = vec![3.0, 3.0, 3.0];
    let params = ForestParams {
        trees: 5,
        ..ForestParams::default()
    };
    let forest = ForestRegressor::fit(&rows, &targets, &params).unwrap();
    let mut regressors = BTreeMap::new();
    regressors.insert(BagFormat::Small, forest);
    DemandModel::new(regressors)
}

#[test]
fn missing_artifact_is_absent_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));
    assert!(!store.exists());
    assert!(matches!(store.load(), ModelState::Absent));
}

#[test]
fn replace_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));
    let model = tiny_model();

    store.replace(&model).unwrap();
    assert!(store.exists());

    let loaded = match store.load() {
        ModelState::Loaded(model) => model,
        other => panic!("expected a loaded model, got {other:?}"),
    };
    assert!(loaded.regressor(BagFormat::Small).is_some());
    assert!(loaded.regressor(BagFormat::Medium).is_none());
}

#[test]
fn replace_leaves_no_temp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));
    store.replace(&tiny_model()).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["model.json".to_string()]);
}

#[test]
fn unparsable_artifact_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, b"not a model").unwrap();

    let store = ModelStore::new(&path);
    assert!(store.exists());
    assert!(matches!(store.load(), ModelState::Corrupt));
}

#[test]
fn training_slot_is_exclusive_and_scoped() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));

    let guard = store.begin_training().unwrap();
    match store.begin_training() {
        Err(DemandError::TrainingInProgress) => {}
        other => panic!("expected TrainingInProgress, got {other:?}"),
    }

    drop(guard);
    assert!(store.begin_training().is_ok());
}
