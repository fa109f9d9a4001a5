/*!
 * # polyscript - multilingual video script authoring
 *
 * A Rust library for maintaining video production scripts whose scenes carry
 * parallel text in Chinese, English and Indonesian.
 *
 * ## Features
 *
 * - Named projects holding ordered scenes with stable ids
 * - Three language blocks per scene (outline, visual, dialogue) and an
 *   optional reference image
 * - Non-destructive translation fill using AI providers:
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Fallback to the source text when a provider fails
 * - CSV export with a UTF-8 byte-order marker for spreadsheet tools
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `scene`: Scene and language block model
 * - `project_store`: Projects, scene ordering and store events
 * - `translation`: AI-powered translation:
 *   - `translation::core`: Provider backed translator service
 *   - `translation::cache`: Caching of translations
 *   - `translation::engine`: Source selection and blank slot fill
 * - `export`: Flat table export
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: Script files and file system operations
 * - `language_utils`: Supported language codes
 * - `providers`: Client implementations for LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod export;
pub mod file_utils;
pub mod language_utils;
pub mod project_store;
pub mod providers;
pub mod scene;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{ExportError, ProviderError, StoreError};
pub use export::{EXPORT_HEADERS, ExportRow, ExportService};
pub use language_utils::{LanguageCode, fallback_chain};
pub use project_store::{MoveDirection, Project, ProjectStore, StoreEvent, StoreObserver};
pub use scene::{ImageRef, LanguageBlock, Scene, SceneField};
pub use translation::{SceneTranslationReport, TranslationEngine, TranslationService};
