//! Typed records and the schemas they are validated against.

use crate::core::schema::{Field, FieldKind, Record, Schema};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const EDITIONS: &[&str] = &["nano", "mini", "standard", "pro", "max"];
pub const MODALITIES: &[&str] = &["text", "image", "video", "audio", "3d"];

/// Size/tier tag of a model release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Nano,
    Mini,
    Standard,
    Pro,
    Max,
}

impl Edition {
    /// Display size used when prompting for avatars.
    pub fn size(&self) -> &'static str {
        match self {
            Edition::Nano => "small",
            Edition::Max => "large",
            Edition::Mini | Edition::Standard | Edition::Pro => "medium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Video,
    Audio,
    #[serde(rename = "3d")]
    ThreeD,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Audio => "audio",
            Modality::ThreeD => "3d",
        }
    }
}

pub const MODEL_CORE_SCHEMA: Schema = Schema {
    name: "model core",
    fields: &[
        Field::required("id", FieldKind::Text),
        Field::required("name", FieldKind::Text),
        Field::optional("nickname", FieldKind::Text),
        Field::required("creator", FieldKind::Text),
        Field::required("edition", FieldKind::Enum(EDITIONS)),
        Field::required("main modality", FieldKind::EnumList(MODALITIES)),
        Field::optional("release date", FieldKind::Date),
    ],
};

/// Core metadata of one model, stored as `core.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCore {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub creator: String,
    pub edition: Edition,
    #[serde(rename = "main modality")]
    pub main_modality: Vec<Modality>,
    /// Absent for upcoming models.
    #[serde(
        rename = "release date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<NaiveDate>,
}

impl Record for ModelCore {
    const SCHEMA: &'static Schema = &MODEL_CORE_SCHEMA;
}

impl ModelCore {
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.name)
    }

    /// Modality an avatar should depict: image, then video, then audio,
    /// otherwise whatever is listed first.
    pub fn primary_modality(&self) -> Option<Modality> {
        [Modality::Image, Modality::Video, Modality::Audio]
            .into_iter()
            .find(|m| self.main_modality.contains(m))
            .or_else(|| self.main_modality.first().copied())
    }
}

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub fn slugify(input: &str) -> String {
    NON_SLUG
        .replace_all(&input.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

pub fn creator_id(creator: &str) -> String {
    slugify(creator)
}

/// Canonical model identifier: `<creator-slug>.<name-slug>`.
pub fn model_id(creator: &str, name: &str) -> String {
    format!("{}.{}", creator_id(creator), slugify(name))
}

pub const CAPABILITIES: &[&str] = &[
    "any",
    "text to image",
    "image to image",
    "text to video",
    "image to video",
    "video to video",
    "text to audio",
    "text to speech",
    "speech to text",
    "audio to audio",
    "image to 3d",
    "text to 3d",
];

pub const PROVIDER_ENDPOINTS_SCHEMA: Schema = Schema {
    name: "provider api endpoints",
    fields: &[
        Field::optional("any", FieldKind::Text),
        Field::optional("text to image", FieldKind::Text),
        Field::optional("image to image", FieldKind::Text),
        Field::optional("text to video", FieldKind::Text),
        Field::optional("image to video", FieldKind::Text),
        Field::optional("video to video", FieldKind::Text),
        Field::optional("text to audio", FieldKind::Text),
        Field::optional("text to speech", FieldKind::Text),
        Field::optional("speech to text", FieldKind::Text),
        Field::optional("audio to audio", FieldKind::Text),
        Field::optional("image to 3d", FieldKind::Text),
        Field::optional("text to 3d", FieldKind::Text),
    ],
};

/// Endpoint identifiers one provider exposes for a model, by capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<String>,
    #[serde(rename = "text to image", default, skip_serializing_if = "Option::is_none")]
    pub text_to_image: Option<String>,
    #[serde(rename = "image to image", default, skip_serializing_if = "Option::is_none")]
    pub image_to_image: Option<String>,
    #[serde(rename = "text to video", default, skip_serializing_if = "Option::is_none")]
    pub text_to_video: Option<String>,
    #[serde(rename = "image to video", default, skip_serializing_if = "Option::is_none")]
    pub image_to_video: Option<String>,
    #[serde(rename = "video to video", default, skip_serializing_if = "Option::is_none")]
    pub video_to_video: Option<String>,
    #[serde(rename = "text to audio", default, skip_serializing_if = "Option::is_none")]
    pub text_to_audio: Option<String>,
    #[serde(rename = "text to speech", default, skip_serializing_if = "Option::is_none")]
    pub text_to_speech: Option<String>,
    #[serde(rename = "speech to text", default, skip_serializing_if = "Option::is_none")]
    pub speech_to_text: Option<String>,
    #[serde(rename = "audio to audio", default, skip_serializing_if = "Option::is_none")]
    pub audio_to_audio: Option<String>,
    #[serde(rename = "image to 3d", default, skip_serializing_if = "Option::is_none")]
    pub image_to_3d: Option<String>,
    #[serde(rename = "text to 3d", default, skip_serializing_if = "Option::is_none")]
    pub text_to_3d: Option<String>,
}

impl Record for ProviderEndpoints {
    const SCHEMA: &'static Schema = &PROVIDER_ENDPOINTS_SCHEMA;
}

impl ProviderEndpoints {
    fn slots(&self) -> [&Option<String>; 12] {
        [
            &self.any,
            &self.text_to_image,
            &self.image_to_image,
            &self.text_to_video,
            &self.image_to_video,
            &self.video_to_video,
            &self.text_to_audio,
            &self.text_to_speech,
            &self.speech_to_text,
            &self.audio_to_audio,
            &self.image_to_3d,
            &self.text_to_3d,
        ]
    }

    /// True when no capability carries a non-blank endpoint.
    pub fn is_empty(&self) -> bool {
        self.slots()
            .iter()
            .all(|slot| slot.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

pub const TWEETS_SCHEMA: Schema = Schema {
    name: "tweets",
    fields: &[Field::optional("tweets", FieldKind::List)],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetsRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tweets: Vec<String>,
}

impl Record for TweetsRecord {
    const SCHEMA: &'static Schema = &TWEETS_SCHEMA;
}

pub const AVATAR_SCHEMA: Schema = Schema {
    name: "avatar",
    fields: &[
        Field::optional("avatar url", FieldKind::Text),
        Field::optional("monster", FieldKind::Text),
        Field::optional("item", FieldKind::Text),
        Field::optional("material", FieldKind::Text),
    ],
};

/// Avatar cache written by the generation pipeline. Only the URL is
/// consumed here; the identity fields are carried for round-tripping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRecord {
    #[serde(rename = "avatar url", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl Record for AvatarRecord {
    const SCHEMA: &'static Schema = &AVATAR_SCHEMA;
}

impl AvatarRecord {
    pub fn is_generated(&self) -> bool {
        self.avatar_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
