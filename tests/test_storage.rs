use std::fs;

use arena_shooter::storage::{PersonalBest, Profile, ProfileStore};

use tempfile::tempdir;

#[test]
fn missing_profile_starts_empty() {
    let dir = tempdir().unwrap();
    let store = ProfileStore::open(dir.path().join("profile.json"));
    assert_eq!(store.profile(), &Profile::default());
    assert_eq!(store.player_name(), "");
    assert_eq!(store.personal_best(), 0);
}

#[test]
fn corrupt_profile_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, "{ not json").unwrap();
    let store = ProfileStore::open(&path);
    assert_eq!(store.profile(), &Profile::default());
}

#[test]
fn player_name_is_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");

    let mut store = ProfileStore::open(&path);
    store.set_player_name("  Ada  ").unwrap();
    assert_eq!(store.player_name(), "Ada");

    let reopened = ProfileStore::open(&path);
    assert_eq!(reopened.player_name(), "Ada");
}

#[test]
fn blank_name_is_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    let mut store = ProfileStore::open(&path);
    store.set_player_name("Ada").unwrap();
    store.set_player_name("   ").unwrap();
    assert_eq!(store.player_name(), "Ada");
}

#[test]
fn personal_best_progression() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    let mut store = ProfileStore::open(&path);

    assert_eq!(store.record_final_score(0).unwrap(), PersonalBest::NoRecord);
    assert_eq!(
        store.record_final_score(50).unwrap(),
        PersonalBest::New { previous: 0 }
    );
    assert_eq!(store.record_final_score(30).unwrap(), PersonalBest::Standing(50));
    assert_eq!(store.record_final_score(50).unwrap(), PersonalBest::Standing(50));
    assert_eq!(
        store.record_final_score(80).unwrap(),
        PersonalBest::New { previous: 50 }
    );

    assert_eq!(ProfileStore::open(&path).personal_best(), 80);
}

#[test]
fn standing_best_does_not_touch_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    let mut store = ProfileStore::open(&path);
    store.record_final_score(0).unwrap();
    assert!(!path.exists());
}

#[test]
fn parent_directories_are_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("profile.json");
    let mut store = ProfileStore::open(&path);
    store.record_final_score(12).unwrap();
    assert!(path.exists());
}

#[test]
fn unknown_and_missing_fields_are_tolerated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, r#"{ "personal_best": 33, "theme": "dark" }"#).unwrap();
    let store = ProfileStore::open(&path);
    assert_eq!(store.personal_best(), 33);
    assert_eq!(store.player_name(), "");
}
