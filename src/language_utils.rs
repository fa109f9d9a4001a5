use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language utilities for the three script languages
///
/// Scripts carry parallel text in Chinese, English and Indonesian. This module
/// owns the closed language set, parsing of ISO 639 codes into it, the
/// locale identifiers handed to translation providers and the fallback chain
/// used to pick a translation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    /// Chinese (simplified)
    Zh,
    /// English
    En,
    /// Bahasa Indonesia
    Id,
}

impl LanguageCode {
    /// All supported languages, in fallback priority order
    pub const ALL: [LanguageCode; 3] = [LanguageCode::Zh, LanguageCode::En, LanguageCode::Id];

    /// ISO 639-1 code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
            Self::Id => "id",
        }
    }

    /// Locale identifier expected by web translation endpoints
    pub fn provider_locale(&self) -> &'static str {
        match self {
            Self::Zh => "zh-cn",
            Self::En => "en",
            Self::Id => "id",
        }
    }

    /// English name of the language ("Chinese", "English", "Indonesian")
    pub fn english_name(&self) -> String {
        Language::from_639_1(self.as_str())
            .map(|lang| lang.to_name().to_string())
            .unwrap_or_else(|| self.as_str().to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_language_code(s)
    }
}

/// Parse an ISO 639-1, 639-2/B or 639-3 code (or a provider locale such as
/// `zh-cn`) into one of the supported languages
pub fn parse_language_code(code: &str) -> Result<LanguageCode> {
    let normalized_code = code.trim().to_lowercase();

    // Region suffixes ("zh-cn", "zh_TW", "en-US") only narrow the language
    let primary = normalized_code
        .split(['-', '_'])
        .next()
        .unwrap_or_default();

    let language = match primary.len() {
        2 => Language::from_639_1(primary),
        3 => {
            // ISO 639-2/B codes that differ from 639-3
            let part2t = match primary {
                "chi" => "zho",
                "may" => "msa",
                other => other,
            };
            Language::from_639_3(part2t)
        }
        _ => None,
    };

    match language.and_then(|lang| lang.to_639_1()) {
        Some("zh") => Ok(LanguageCode::Zh),
        Some("en") => Ok(LanguageCode::En),
        Some("id") => Ok(LanguageCode::Id),
        Some(other) => Err(anyhow!("Unsupported script language: {}", other)),
        None => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Priority order used to select a translation source: the base language
/// first, then zh, en, id, without duplicates
pub fn fallback_chain(base: LanguageCode) -> Vec<LanguageCode> {
    let mut chain = Vec::with_capacity(LanguageCode::ALL.len());
    chain.push(base);
    for lang in LanguageCode::ALL {
        if !chain.contains(&lang) {
            chain.push(lang);
        }
    }
    chain
}
