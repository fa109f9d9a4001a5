/*!
 * Non-destructive translation fill for scenes.
 *
 * Each language block of a scene is handled on its own: a source language is
 * picked along the fallback chain `[base, zh, en, id]`, and only the blank
 * slots of that block are filled from it. Slots that already hold text are
 * never overwritten. A provider failure degrades to a verbatim copy of the
 * source text and is reported as a warning, so a translated block always
 * ends up fully populated.
 */

use futures::future::join_all;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::app_config::TranslationCommonConfig;
use crate::errors::ProviderError;
use crate::language_utils::{LanguageCode, fallback_chain};
use crate::providers::Translator;
use crate::scene::{LanguageBlock, Scene, SceneField};

/// Knobs for provider calls made by the engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Budget for a single provider call
    pub timeout: Duration,
    /// Additional attempts after a failed call
    pub retry_count: u32,
    /// Pause before retry n is `retry_backoff * n`
    pub retry_backoff: Duration,
    /// Translate the blank slots of a block concurrently
    pub parallel_targets: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_count: 1,
            retry_backoff: Duration::from_millis(500),
            parallel_targets: true,
        }
    }
}

impl From<&TranslationCommonConfig> for EngineOptions {
    fn from(common: &TranslationCommonConfig) -> Self {
        Self {
            timeout: Duration::from_secs(common.timeout_secs),
            retry_count: common.retry_count,
            retry_backoff: Duration::from_millis(common.retry_backoff_ms),
            parallel_targets: common.parallel_targets,
        }
    }
}

/// Shared flag to abandon a scene translation between blocks
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The block in flight still completes.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A provider failure that was recovered with a verbatim copy
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationWarning {
    pub field: SceneField,
    pub source: LanguageCode,
    pub target: LanguageCode,
    pub error: ProviderError,
}

impl fmt::Display for TranslationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} failed ({}), copied source text",
            self.field, self.source, self.target, self.error
        )
    }
}

/// What happened to one block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    /// Every slot was blank, nothing to translate from
    Skipped,
    /// Blank slots were filled from `source`
    Filled {
        source: LanguageCode,
        /// Slots filled with provider output
        translated: Vec<LanguageCode>,
        /// Slots filled with a verbatim copy after a provider failure
        copied: Vec<LanguageCode>,
    },
}

impl BlockOutcome {
    /// Number of slots written besides the source slot
    pub fn filled_slots(&self) -> usize {
        match self {
            Self::Skipped => 0,
            Self::Filled { translated, copied, .. } => translated.len() + copied.len(),
        }
    }
}

/// Result of translating one scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneTranslationReport {
    /// Processed blocks in processing order
    pub blocks: Vec<(SceneField, BlockOutcome)>,
    /// Non-fatal provider failures
    pub warnings: Vec<TranslationWarning>,
    /// Set when the run stopped early on a cancellation request
    pub cancelled: bool,
}

impl SceneTranslationReport {
    pub fn filled_slots(&self) -> usize {
        self.blocks.iter().map(|(_, outcome)| outcome.filled_slots()).sum()
    }

    pub fn outcome(&self, field: SceneField) -> Option<&BlockOutcome> {
        self.blocks.iter().find(|(f, _)| *f == field).map(|(_, outcome)| outcome)
    }

    /// Whether the run finished without warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && !self.cancelled
    }
}

/// Fills blank language slots of scenes through a `Translator`
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    translator: Arc<dyn Translator>,
    options: EngineOptions,
}

impl TranslationEngine {
    pub fn new(translator: Arc<dyn Translator>, options: EngineOptions) -> Self {
        Self { translator, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Ask the translator whether it is reachable, without translating
    pub async fn check_translator(&self) -> Result<(), ProviderError> {
        self.translator.check_connection().await
    }

    /// First language along the fallback chain of `base` whose trimmed text
    /// is non-empty, together with that trimmed text
    pub fn select_source(block: &LanguageBlock, base: LanguageCode) -> Option<(LanguageCode, String)> {
        fallback_chain(base).into_iter().find_map(|lang| {
            let text = block.get(lang).trim();
            (!text.is_empty()).then(|| (lang, text.to_string()))
        })
    }

    /// Fill the blank slots of one block.
    ///
    /// Warnings are returned for every slot that fell back to a verbatim copy.
    pub async fn translate_block(
        &self,
        block: &mut LanguageBlock,
        field: SceneField,
        base: LanguageCode,
    ) -> (BlockOutcome, Vec<TranslationWarning>) {
        let Some((source, source_text)) = Self::select_source(block, base) else {
            debug!("{} block is empty, nothing to translate", field);
            return (BlockOutcome::Skipped, Vec::new());
        };

        let targets: Vec<LanguageCode> = LanguageCode::ALL
            .into_iter()
            .filter(|lang| *lang != source && block.is_blank(*lang))
            .collect();

        let results: Vec<Result<String, ProviderError>> = if self.options.parallel_targets {
            join_all(
                targets
                    .iter()
                    .map(|target| self.translate_with_retry(&source_text, source, *target)),
            )
            .await
        } else {
            let mut results = Vec::with_capacity(targets.len());
            for target in &targets {
                results.push(self.translate_with_retry(&source_text, source, *target).await);
            }
            results
        };

        let mut translated = Vec::new();
        let mut copied = Vec::new();
        let mut warnings = Vec::new();

        for (target, result) in targets.into_iter().zip(results) {
            // Checked again at write time: a slot is only ever filled once
            if !block.is_blank(target) {
                continue;
            }

            match result {
                Ok(text) => {
                    block.set(target, text);
                    translated.push(target);
                }
                Err(error) => {
                    let warning = TranslationWarning { field, source, target, error };
                    warn!("Translation failed: {}", warning);
                    block.set(target, source_text.clone());
                    copied.push(target);
                    warnings.push(warning);
                }
            }
        }

        block.set(source, source_text);

        (BlockOutcome::Filled { source, translated, copied }, warnings)
    }

    /// Translate all three blocks of a scene
    pub async fn translate_scene(&self, scene: &mut Scene, base: LanguageCode) -> SceneTranslationReport {
        self.translate_scene_with_cancel(scene, base, &CancellationFlag::new()).await
    }

    /// Translate all three blocks of a scene, checking `cancel` before each
    /// block. A failure inside one block never stops the others.
    pub async fn translate_scene_with_cancel(
        &self,
        scene: &mut Scene,
        base: LanguageCode,
        cancel: &CancellationFlag,
    ) -> SceneTranslationReport {
        let mut report = SceneTranslationReport::default();

        for field in SceneField::TRANSLATION_ORDER {
            if cancel.is_cancelled() {
                debug!("Translation of scene {} cancelled before {} block", scene.id(), field);
                report.cancelled = true;
                break;
            }

            let (outcome, warnings) = self.translate_block(scene.block_mut(field), field, base).await;
            report.blocks.push((field, outcome));
            report.warnings.extend(warnings);
        }

        debug!("Scene {} translated via {}: {} slots filled, {} warnings",
               scene.id(), self.translator.name(), report.filled_slots(), report.warnings.len());
        report
    }

    /// One provider call with the configured timeout and retry budget
    async fn translate_with_retry(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, ProviderError> {
        let attempts = self.options.retry_count + 1;
        let mut last_error = ProviderError::EmptyResponse;

        for attempt in 1..=attempts {
            let call = self.translator.translate(text, source, target);
            let result = match tokio::time::timeout(self.options.timeout, call).await {
                Ok(Ok(translation)) if translation.trim().is_empty() => Err(ProviderError::EmptyResponse),
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.options.timeout.as_millis() as u64)),
            };

            match result {
                Ok(translation) => return Ok(translation),
                Err(error) => {
                    debug!("{} -> {} attempt {}/{} failed: {}", source, target, attempt, attempts, error);
                    last_error = error;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.options.retry_backoff * attempt).await;
            }
        }

        Err(last_error)
    }
}
