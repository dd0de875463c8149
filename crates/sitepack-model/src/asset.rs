//! Uploaded project assets.

use serde::{Deserialize, Serialize};

/// An uploaded file referenced by props and styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    /// Output filename.
    pub name: String,
    #[serde(flatten)]
    pub kind: AssetKind,
}

impl Asset {
    /// Font family, for font assets.
    #[must_use]
    pub fn font_family(&self) -> Option<&str> {
        match &self.kind {
            AssetKind::Font { meta } => Some(&meta.family),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, AssetKind::Image { .. })
    }
}

/// Asset type with its type-specific metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AssetKind {
    Font { meta: FontMeta },
    Image {
        #[serde(default)]
        meta: ImageMeta,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMeta {
    pub family: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}
