use modelbook::core::error::CatalogError;
use modelbook::core::paths::{ApiLayout, DataLayout};
use modelbook::plugins::api::{build_api, scan_catalog};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn core_md(id: &str, name: &str, release_date: Option<&str>) -> String {
    let mut text = format!(
        "### id\n\n{}\n\n### name\n\n{}\n\n### creator\n\nAcme\n\n### edition\n\nstandard\n\n### main modality\n\n- image\n",
        id, name
    );
    if let Some(date) = release_date {
        text.push_str(&format!("\n### release date\n\n{}\n", date));
    }
    text
}

fn add_model(layout: &DataLayout, id: &str, name: &str, release_date: Option<&str>) {
    fs::create_dir_all(layout.model_dir(id)).unwrap();
    fs::write(layout.core_path(id), core_md(id, name, release_date)).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn layouts(root: &Path) -> (DataLayout, ApiLayout) {
    (
        DataLayout::new(root.join("data")),
        ApiLayout::new(root.join("public/api")),
    )
}

#[test]
fn models_sort_upcoming_alphabetical_then_newest_first() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.zephyr", "Zephyr", None);
    add_model(&data, "acme.atlas", "Atlas", None);
    add_model(&data, "acme.cobalt", "Cobalt", Some("2024-01-01"));
    add_model(&data, "acme.dune", "Dune", Some("2025-06-01"));

    let summary = build_api(&data, &api).unwrap();
    assert_eq!(summary.models, 4);

    let models = read_json(&api.models_path());
    let ids: Vec<&str> = models
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["acme.atlas", "acme.zephyr", "acme.dune", "acme.cobalt"]);
    assert_eq!(models[2]["release date"], "2025-06-01");
    assert!(models[0].get("release date").is_none());
}

#[test]
fn id_mismatch_aborts_without_writing_artifacts() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.atlas", "Atlas", None);
    fs::create_dir_all(data.model_dir("acme.drifted")).unwrap();
    fs::write(
        data.core_path("acme.drifted"),
        core_md("acme.original", "Drifted", None),
    )
    .unwrap();

    let err = build_api(&data, &api).unwrap_err();
    match err {
        CatalogError::ConsistencyError {
            expected, found, ..
        } => {
            assert_eq!(expected, "acme.drifted");
            assert_eq!(found, "acme.original");
        }
        other => panic!("expected consistency error, got {other}"),
    }
    assert!(!api.root.exists());
}

#[test]
fn validation_failure_names_file_and_field() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.atlas", "Atlas", None);
    fs::write(
        data.core_path("acme.atlas"),
        core_md("acme.atlas", "Atlas", Some("someday")),
    )
    .unwrap();

    let err = build_api(&data, &api).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("acme.atlas"), "{message}");
    assert!(message.contains("core.md"), "{message}");
    assert!(message.contains("`release date`"), "{message}");
    assert!(!api.models_path().exists());
}

#[test]
fn provider_files_without_endpoints_are_dropped() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.atlas", "Atlas", None);
    add_model(&data, "acme.bare", "Bare", None);

    let providers = data.providers_dir("acme.atlas");
    fs::create_dir_all(&providers).unwrap();
    fs::write(
        providers.join("fal.md"),
        "### text to image\n\nfal-ai/atlas\n",
    )
    .unwrap();
    fs::write(providers.join("empty.md"), "### any\n\n_No response_\n").unwrap();
    fs::write(providers.join("notes.txt"), "ignored").unwrap();

    let bare_providers = data.providers_dir("acme.bare");
    fs::create_dir_all(&bare_providers).unwrap();
    fs::write(bare_providers.join("replicate.md"), "### any\n\n\n").unwrap();

    build_api(&data, &api).unwrap();
    let models = read_json(&api.models_path());

    let atlas = &models[0];
    assert_eq!(atlas["id"], "acme.atlas");
    let map = atlas["providers api endpoints"].as_object().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["fal"]["text to image"], "fal-ai/atlas");

    let bare = &models[1];
    assert_eq!(bare["id"], "acme.bare");
    assert!(bare.get("providers api endpoints").is_none());
}

#[test]
fn avatar_flag_tracks_non_empty_url() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.a", "A", None);
    add_model(&data, "acme.b", "B", None);
    add_model(&data, "acme.c", "C", None);
    fs::write(
        data.avatar_path("acme.a"),
        "### avatar url\n\nhttps://cdn.example/models/avatars/acme.a.png\n\n### monster\n\nkraken\n",
    )
    .unwrap();
    fs::write(data.avatar_path("acme.b"), "### avatar url\n\n\n### item\n\nlantern\n").unwrap();

    build_api(&data, &api).unwrap();
    let models = read_json(&api.models_path());
    assert_eq!(models[0]["avatar generated"], true);
    assert_eq!(models[1]["avatar generated"], false);
    assert_eq!(models[2]["avatar generated"], false);
    assert!(models[0].get("avatar url").is_none());
}

#[test]
fn tweets_map_omits_empty_sequences() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.loud", "Loud", None);
    add_model(&data, "acme.quiet", "Quiet", None);
    add_model(&data, "acme.silent", "Silent", None);
    fs::write(
        data.tweets_path("acme.loud"),
        "### tweets\n\n- wow\n- incredible\n",
    )
    .unwrap();
    fs::write(data.tweets_path("acme.quiet"), "### tweets\n\n").unwrap();

    let summary = build_api(&data, &api).unwrap();
    assert_eq!(summary.tweets, 1);
    let tweets = read_json(&api.tweets_path());
    assert_eq!(tweets, serde_json::json!({ "acme.loud": ["wow", "incredible"] }));
}

#[test]
fn descriptions_directory_is_rebuilt_each_run() {
    let tmp = tempdir().unwrap();
    let (data, api) = layouts(tmp.path());
    add_model(&data, "acme.atlas", "Atlas", None);
    add_model(&data, "acme.blank", "Blank", None);
    add_model(&data, "acme.gone", "Gone", None);
    fs::write(data.description_path("acme.atlas"), "# Atlas\n\nMaps things.\n").unwrap();
    fs::write(data.description_path("acme.blank"), "  \n").unwrap();
    fs::write(data.description_path("acme.gone"), "Soon removed.\n").unwrap();

    build_api(&data, &api).unwrap();
    assert!(api.description_path("acme.gone").exists());

    fs::remove_dir_all(data.model_dir("acme.gone")).unwrap();
    let summary = build_api(&data, &api).unwrap();
    assert_eq!(summary.descriptions, 1);

    let mut files: Vec<String> = fs::read_dir(api.descriptions_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(files, vec!["acme.atlas.json"]);

    let description = read_json(&api.description_path("acme.atlas"));
    assert_eq!(
        description,
        serde_json::json!({ "id": "acme.atlas", "content": "# Atlas\n\nMaps things.\n" })
    );
}

#[test]
fn directories_without_core_record_are_ignored() {
    let tmp = tempdir().unwrap();
    let (data, _) = layouts(tmp.path());
    add_model(&data, "acme.atlas", "Atlas", None);
    fs::create_dir_all(data.model_dir("acme.draft")).unwrap();
    fs::write(data.description_path("acme.draft"), "draft").unwrap();
    fs::write(data.root.join("README.md"), "not a model").unwrap();

    let catalog = scan_catalog(&data).unwrap();
    assert_eq!(catalog.models.len(), 1);
    assert!(catalog.descriptions.is_empty());
}

#[test]
fn missing_data_directory_is_an_io_error() {
    let tmp = tempdir().unwrap();
    let data = DataLayout::new(tmp.path().join("nope"));
    assert!(matches!(
        scan_catalog(&data).unwrap_err(),
        CatalogError::IoError { .. }
    ));
}
