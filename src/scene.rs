/*!
 * Scene model: the multilingual content unit of a script.
 *
 * A scene carries three independent language blocks (outline, visual,
 * dialogue) plus an optional reference image. Each block always holds a
 * value for every supported language; an unset value is the empty string.
 */

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language_utils::{LanguageCode, fallback_chain};

/// Maximum number of characters shown in an outline preview
const PREVIEW_CHARS: usize = 20;

/// The three text blocks of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneField {
    /// Plot outline of the scene
    Outline,
    /// Composition, action and camera description
    Visual,
    /// Spoken lines or narration
    Dialogue,
}

impl SceneField {
    /// Column order used by exports
    pub const ALL: [SceneField; 3] = [SceneField::Outline, SceneField::Visual, SceneField::Dialogue];

    /// Order in which the translation engine walks the blocks
    pub const TRANSLATION_ORDER: [SceneField; 3] =
        [SceneField::Visual, SceneField::Outline, SceneField::Dialogue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outline => "outline",
            Self::Visual => "visual",
            Self::Dialogue => "dialogue",
        }
    }
}

impl fmt::Display for SceneField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parallel text of one block, one slot per supported language.
///
/// The struct has a field per language, so a slot can never be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageBlock {
    #[serde(default)]
    pub zh: String,
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub id: String,
}

impl LanguageBlock {
    /// Build a block from explicit values
    pub fn new(zh: impl Into<String>, en: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            zh: zh.into(),
            en: en.into(),
            id: id.into(),
        }
    }

    /// Current text of a language slot
    pub fn get(&self, lang: LanguageCode) -> &str {
        match lang {
            LanguageCode::Zh => &self.zh,
            LanguageCode::En => &self.en,
            LanguageCode::Id => &self.id,
        }
    }

    /// Mutable access to a language slot
    pub fn slot_mut(&mut self, lang: LanguageCode) -> &mut String {
        match lang {
            LanguageCode::Zh => &mut self.zh,
            LanguageCode::En => &mut self.en,
            LanguageCode::Id => &mut self.id,
        }
    }

    /// Replace the text of a language slot
    pub fn set(&mut self, lang: LanguageCode, text: impl Into<String>) {
        *self.slot_mut(lang) = text.into();
    }

    /// Whether the slot holds nothing but whitespace
    pub fn is_blank(&self, lang: LanguageCode) -> bool {
        self.get(lang).trim().is_empty()
    }

    /// Whether every slot is blank
    pub fn is_empty(&self) -> bool {
        LanguageCode::ALL.iter().all(|lang| self.is_blank(*lang))
    }

    /// Whether every slot holds non-blank text
    pub fn is_complete(&self) -> bool {
        LanguageCode::ALL.iter().all(|lang| !self.is_blank(*lang))
    }

    /// Iterate over `(language, text)` pairs in zh, en, id order
    pub fn iter(&self) -> impl Iterator<Item = (LanguageCode, &str)> {
        LanguageCode::ALL.into_iter().map(move |lang| (lang, self.get(lang)))
    }
}

/// A reference image attached to a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Original file name, exported as-is
    pub filename: String,
    /// Raw image bytes
    pub data: Bytes,
}

impl ImageRef {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A single scene of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    id: u32,
    /// Optional reference image
    pub image: Option<ImageRef>,
    /// Plot outline
    pub outline: LanguageBlock,
    /// Visual description
    pub visual: LanguageBlock,
    /// Dialogue or narration
    pub dialogue: LanguageBlock,
}

impl Scene {
    /// Create an empty scene. Ids are handed out by the project store.
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            image: None,
            outline: LanguageBlock::default(),
            visual: LanguageBlock::default(),
            dialogue: LanguageBlock::default(),
        }
    }

    /// Stable id, assigned once at creation
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn block(&self, field: SceneField) -> &LanguageBlock {
        match field {
            SceneField::Outline => &self.outline,
            SceneField::Visual => &self.visual,
            SceneField::Dialogue => &self.dialogue,
        }
    }

    pub fn block_mut(&mut self, field: SceneField) -> &mut LanguageBlock {
        match field {
            SceneField::Outline => &mut self.outline,
            SceneField::Visual => &mut self.visual,
            SceneField::Dialogue => &mut self.dialogue,
        }
    }

    /// Text of one `(field, language)` slot
    pub fn text(&self, field: SceneField, lang: LanguageCode) -> &str {
        self.block(field).get(lang)
    }

    /// Overwrite one `(field, language)` slot
    pub fn set_text(&mut self, field: SceneField, lang: LanguageCode, text: impl Into<String>) {
        self.block_mut(field).set(lang, text);
    }

    /// File name of the reference image, empty when none is attached
    pub fn image_name(&self) -> &str {
        self.image.as_ref().map(|image| image.filename.as_str()).unwrap_or("")
    }

    /// Short outline teaser: the first non-blank outline along the fallback
    /// chain of `base`, trimmed and cut to 20 characters
    pub fn outline_preview(&self, base: LanguageCode) -> Option<String> {
        let text = fallback_chain(base)
            .into_iter()
            .map(|lang| self.outline.get(lang).trim())
            .find(|text| !text.is_empty())?;

        if text.chars().count() > PREVIEW_CHARS {
            let cut: String = text.chars().take(PREVIEW_CHARS).collect();
            Some(format!("{}…", cut))
        } else {
            Some(text.to_string())
        }
    }
}
