use modelbook::core::error::CatalogError;
use modelbook::core::markdown::decode;
use modelbook::core::paths::DataLayout;
use modelbook::core::records::{Edition, ModelCore};
use modelbook::plugins::intake::{add_model, append_outputs, workflow_outputs};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ISSUE_BODY: &str = "\
### id

acme.rocket-1

### name

Rocket 1

### nickname

_No response_

### creator

Acme

### edition

Max

### main modality

- [x] video
- [ ] image

### release date

2025-02-14
";

#[test]
fn add_writes_canonical_core_record() {
    let tmp = tempdir().unwrap();
    let layout = DataLayout::new(tmp.path().join("data"));

    let added = add_model(&layout, ISSUE_BODY, Path::new("$ISSUE_BODY")).unwrap();
    assert_eq!(added.core_path, layout.core_path("acme.rocket-1"));
    assert_eq!(added.model.edition, Edition::Max);

    let stored = fs::read_to_string(&added.core_path).unwrap();
    assert!(!stored.contains("_No response_"));
    assert!(!stored.contains("[x]"));
    assert!(stored.contains("### edition\n\nmax\n"));
    assert!(stored.contains("### main modality\n\n- video\n"));
    assert_eq!(decode::<ModelCore>(&stored).unwrap(), added.model);
}

#[test]
fn add_refuses_to_overwrite_existing_model() {
    let tmp = tempdir().unwrap();
    let layout = DataLayout::new(tmp.path().join("data"));
    add_model(&layout, ISSUE_BODY, Path::new("$ISSUE_BODY")).unwrap();
    let before = fs::read_to_string(layout.core_path("acme.rocket-1")).unwrap();

    let err = add_model(&layout, ISSUE_BODY, Path::new("$ISSUE_BODY")).unwrap_err();
    assert!(matches!(err, CatalogError::Duplicate(_)));
    assert_eq!(
        fs::read_to_string(layout.core_path("acme.rocket-1")).unwrap(),
        before
    );
}

#[test]
fn add_rejects_invalid_body_without_writing() {
    let tmp = tempdir().unwrap();
    let layout = DataLayout::new(tmp.path().join("data"));
    let body = ISSUE_BODY.replace("Rocket 1", "_No response_");

    let err = add_model(&layout, &body, Path::new("issue.md")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("issue.md"), "{message}");
    assert!(message.contains("`name`"), "{message}");
    assert!(!layout.root.exists());
}

#[test]
fn outputs_are_appended_as_key_value_lines() {
    let tmp = tempdir().unwrap();
    let layout = DataLayout::new(tmp.path().join("data"));
    let outputs_path = tmp.path().join("github_output");
    fs::write(&outputs_path, "previous=1\n").unwrap();

    let added = add_model(&layout, ISSUE_BODY, Path::new("$ISSUE_BODY")).unwrap();
    append_outputs(&outputs_path, &workflow_outputs(&added.model)).unwrap();

    assert_eq!(
        fs::read_to_string(&outputs_path).unwrap(),
        "previous=1\nbranch-name=add-model/acme.rocket-1\nmodel-id=acme.rocket-1\nmodel-name=Rocket 1\n"
    );
}
