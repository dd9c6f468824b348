//! Avatar bookkeeping for the external generation pipeline.
//!
//! Generation itself (text/image model calls, uploads) lives outside this
//! crate. What stays here is deciding which models still need an avatar and
//! which stored avatar objects no longer belong to any model.

use crate::core::error::CatalogError;
use crate::core::records::{Modality, creator_id};
use crate::plugins::api::Catalog;
use serde::Serialize;
use std::collections::BTreeSet;

pub const AVATAR_PREFIX: &str = "models/avatars/";
pub const STYLE_REFERENCE_KEY: &str = "models/avatars/style/reference.png";
pub const LIST_PAGE_SIZE: usize = 1000;

const SUPPORTED_MODALITIES: &[Modality] = &[Modality::Image, Modality::Video, Modality::Audio];

/// Prompt inputs for one model awaiting an avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarJob {
    pub id: String,
    pub creator: String,
    pub creator_id: String,
    /// Nickname when present, otherwise the model name.
    pub name: String,
    pub size: &'static str,
    pub modality: Modality,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedModel {
    pub id: String,
    pub modalities: Vec<Modality>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvatarPlan {
    pub pending: Vec<AvatarJob>,
    pub skipped: Vec<SkippedModel>,
}

/// Models without a generated avatar, in catalog order. Models whose primary
/// modality cannot be depicted are reported as skipped.
pub fn pending_avatars(catalog: &Catalog) -> AvatarPlan {
    let mut plan = AvatarPlan::default();

    for model in catalog.models.iter().filter(|m| !m.avatar_generated) {
        let core = &model.core;
        match core.primary_modality() {
            Some(modality) if SUPPORTED_MODALITIES.contains(&modality) => {
                plan.pending.push(AvatarJob {
                    id: core.id.clone(),
                    creator: core.creator.clone(),
                    creator_id: creator_id(&core.creator),
                    name: core.display_name().to_string(),
                    size: core.edition.size(),
                    modality,
                });
            }
            _ => plan.skipped.push(SkippedModel {
                id: core.id.clone(),
                modalities: core.main_modality.clone(),
            }),
        }
    }

    plan
}

/// Model id an avatar object key belongs to, e.g.
/// `models/avatars/raw/acme.rocket.png` -> `acme.rocket`.
pub fn avatar_key_model_id(key: &str) -> Option<&str> {
    if !key.ends_with(".png") || key == STYLE_REFERENCE_KEY {
        return None;
    }
    let filename = key.rsplit('/').next()?;
    let id = filename.strip_suffix(".png")?;
    (!id.is_empty()).then_some(id)
}

/// Avatar keys whose model no longer exists, in listing order.
pub fn find_orphaned_avatars<I>(model_ids: &BTreeSet<String>, keys: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter()
        .filter(|key| avatar_key_model_id(key).is_some_and(|id| !model_ids.contains(id)))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub truncated: bool,
}

/// Paginated object-store listing.
pub trait AvatarListing {
    /// Keys under `prefix` strictly after `start_after`, in key order.
    fn list(&mut self, prefix: &str, start_after: Option<&str>) -> Result<ListPage, CatalogError>;
}

/// Follow pagination until the listing reports no more pages.
pub fn collect_keys<L: AvatarListing + ?Sized>(
    listing: &mut L,
    prefix: &str,
) -> Result<Vec<String>, CatalogError> {
    let mut keys: Vec<String> = Vec::new();
    let mut start_after: Option<String> = None;

    loop {
        let page = listing.list(prefix, start_after.as_deref())?;
        let Some(last) = page.keys.last().cloned() else {
            break;
        };
        keys.extend(page.keys);
        if !page.truncated {
            break;
        }
        start_after = Some(last);
    }

    Ok(keys)
}

/// Listing over an exported key inventory (one key per line).
#[derive(Debug, Clone)]
pub struct KeyInventory {
    keys: Vec<String>,
    page_size: usize,
}

impl KeyInventory {
    pub fn parse(text: &str, page_size: usize) -> Self {
        let mut keys: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        keys.sort();
        keys.dedup();
        KeyInventory {
            keys,
            page_size: page_size.max(1),
        }
    }
}

impl AvatarListing for KeyInventory {
    fn list(&mut self, prefix: &str, start_after: Option<&str>) -> Result<ListPage, CatalogError> {
        let mut matching = self
            .keys
            .iter()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| start_after.is_none_or(|after| key.as_str() > after));
        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let truncated = matching.next().is_some();
        Ok(ListPage { keys, truncated })
    }
}
