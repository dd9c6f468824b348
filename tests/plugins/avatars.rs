use modelbook::core::error::CatalogError;
use modelbook::core::paths::DataLayout;
use modelbook::core::records::Modality;
use modelbook::plugins::api::scan_catalog;
use modelbook::plugins::avatars::{
    AVATAR_PREFIX, AvatarListing, KeyInventory, ListPage, STYLE_REFERENCE_KEY, collect_keys,
    find_orphaned_avatars, pending_avatars,
};
use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;

fn write_model(layout: &DataLayout, id: &str, nickname: Option<&str>, edition: &str, modality: &str) {
    let mut text = format!("### id\n\n{}\n\n### name\n\n{} model\n\n", id, id);
    if let Some(nickname) = nickname {
        text.push_str(&format!("### nickname\n\n{}\n\n", nickname));
    }
    text.push_str(&format!(
        "### creator\n\nAcme Labs\n\n### edition\n\n{}\n\n### main modality\n\n{}\n",
        edition, modality
    ));
    fs::create_dir_all(layout.model_dir(id)).unwrap();
    fs::write(layout.core_path(id), text).unwrap();
}

#[test]
fn pending_skips_generated_and_unsupported_models() {
    let tmp = tempdir().unwrap();
    let layout = DataLayout::new(tmp.path());
    write_model(&layout, "acme.a", Some("Ace"), "nano", "- text\n- image");
    write_model(&layout, "acme.b", None, "max", "- audio");
    write_model(&layout, "acme.c", None, "pro", "- text");
    write_model(&layout, "acme.d", None, "pro", "- video");
    fs::write(
        layout.avatar_path("acme.d"),
        "### avatar url\n\nhttps://cdn.example/d.png\n",
    )
    .unwrap();

    let plan = pending_avatars(&scan_catalog(&layout).unwrap());

    let ids: Vec<&str> = plan.pending.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["acme.a", "acme.b"]);
    let ace = &plan.pending[0];
    assert_eq!(ace.name, "Ace");
    assert_eq!(ace.size, "small");
    assert_eq!(ace.modality, Modality::Image);
    assert_eq!(ace.creator_id, "acme-labs");
    assert_eq!(plan.pending[1].size, "large");

    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].id, "acme.c");
}

#[test]
fn orphans_are_unknown_png_keys() {
    let ids: BTreeSet<String> = ["acme.a", "acme.b"].iter().map(|s| s.to_string()).collect();
    let keys = vec![
        "models/avatars/acme.a.png".to_string(),
        "models/avatars/raw/acme.b.png".to_string(),
        "models/avatars/raw/acme.gone.png".to_string(),
        "models/avatars/acme.gone.json".to_string(),
        STYLE_REFERENCE_KEY.to_string(),
        "models/avatars/old.png".to_string(),
    ];

    assert_eq!(
        find_orphaned_avatars(&ids, keys),
        vec![
            "models/avatars/raw/acme.gone.png".to_string(),
            "models/avatars/old.png".to_string(),
        ]
    );
}

struct ScriptedListing {
    pages: Vec<ListPage>,
    calls: Vec<Option<String>>,
}

impl AvatarListing for ScriptedListing {
    fn list(&mut self, _prefix: &str, start_after: Option<&str>) -> Result<ListPage, CatalogError> {
        self.calls.push(start_after.map(str::to_string));
        Ok(if self.pages.is_empty() {
            ListPage::default()
        } else {
            self.pages.remove(0)
        })
    }
}

#[test]
fn collect_keys_follows_start_after_until_not_truncated() {
    let mut listing = ScriptedListing {
        pages: vec![
            ListPage {
                keys: vec!["k1".into(), "k2".into()],
                truncated: true,
            },
            ListPage {
                keys: vec!["k3".into()],
                truncated: false,
            },
        ],
        calls: Vec::new(),
    };

    let keys = collect_keys(&mut listing, AVATAR_PREFIX).unwrap();
    assert_eq!(keys, vec!["k1", "k2", "k3"]);
    assert_eq!(listing.calls, vec![None, Some("k2".to_string())]);
}

#[test]
fn collect_keys_stops_on_empty_truncated_page() {
    let mut listing = ScriptedListing {
        pages: vec![ListPage {
            keys: vec![],
            truncated: true,
        }],
        calls: Vec::new(),
    };
    assert!(collect_keys(&mut listing, AVATAR_PREFIX).unwrap().is_empty());
    assert_eq!(listing.calls.len(), 1);
}

#[test]
fn key_inventory_pages_through_prefix() {
    let text = "models/avatars/c.png\nother/x.png\nmodels/avatars/a.png\nmodels/avatars/b.png\n";
    let mut inventory = KeyInventory::parse(text, 2);
    let keys = collect_keys(&mut inventory, AVATAR_PREFIX).unwrap();
    assert_eq!(
        keys,
        vec![
            "models/avatars/a.png",
            "models/avatars/b.png",
            "models/avatars/c.png"
        ]
    );
}
