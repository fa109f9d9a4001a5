/*!
 * Translation of scene text using AI providers.
 *
 * This module is split into several submodules:
 *
 * - `core`: The configured translator service backed by a provider
 * - `cache`: Caching of translations per language pair
 * - `engine`: Non-destructive fill of the language blocks of a scene
 */

// Re-export main types for easier usage
pub use self::core::TranslationService;
pub use self::engine::{
    BlockOutcome, CancellationFlag, EngineOptions, SceneTranslationReport, TranslationEngine,
    TranslationWarning,
};

// Submodules
pub mod cache;
pub mod core;
pub mod engine;
