/*!
 * Tests for language utility functions
 */

use polyscript::language_utils::{LanguageCode, fallback_chain, parse_language_code};

/// Test parsing of the supported codes in their usual spellings
#[test]
fn test_parseLanguageCode_withIsoVariants_shouldMapToSupportedLanguage() {
    assert_eq!(parse_language_code("zh").unwrap(), LanguageCode::Zh);
    assert_eq!(parse_language_code("zho").unwrap(), LanguageCode::Zh);
    assert_eq!(parse_language_code("zh_TW").unwrap(), LanguageCode::Zh);
    assert_eq!(parse_language_code("en-US").unwrap(), LanguageCode::En);
    assert_eq!(parse_language_code("id").unwrap(), LanguageCode::Id);
    assert_eq!(parse_language_code("IND").unwrap(), LanguageCode::Id);
}

/// Languages outside the script set are rejected
#[test]
fn test_parseLanguageCode_withOtherLanguage_shouldFail() {
    assert!(parse_language_code("de").is_err());
    assert!(parse_language_code("may").is_err());
    assert!(parse_language_code("english").is_err());
}

#[test]
fn test_fromStr_shouldRoundTripDisplay() {
    for lang in LanguageCode::ALL {
        let parsed: LanguageCode = lang.to_string().parse().unwrap();
        assert_eq!(parsed, lang);
    }
}

/// The chain always holds every language exactly once, base first
#[test]
fn test_fallbackChain_forEveryBase_shouldBeAPermutation() {
    for base in LanguageCode::ALL {
        let chain = fallback_chain(base);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], base);
        for lang in LanguageCode::ALL {
            assert_eq!(chain.iter().filter(|l| **l == lang).count(), 1);
        }
    }
    assert_eq!(
        fallback_chain(LanguageCode::Id),
        vec![LanguageCode::Id, LanguageCode::Zh, LanguageCode::En]
    );
}

#[test]
fn test_providerLocale_shouldUseSimplifiedChinese() {
    assert_eq!(LanguageCode::Zh.provider_locale(), "zh-cn");
    assert_eq!(LanguageCode::En.provider_locale(), "en");
    assert_eq!(LanguageCode::Id.provider_locale(), "id");
}

#[test]
fn test_serde_shouldUseLowercaseCodes() {
    let json = serde_json::to_string(&LanguageCode::Id).unwrap();
    assert_eq!(json, "\"id\"");
    let lang: LanguageCode = serde_json::from_str("\"zh\"").unwrap();
    assert_eq!(lang, LanguageCode::Zh);
}
