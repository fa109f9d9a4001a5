/*!
 * Tests for the translation fill engine
 */

use polyscript::errors::ProviderError;
use polyscript::language_utils::LanguageCode;
use polyscript::project_store::Project;
use polyscript::providers::mock::MockTranslator;
use polyscript::scene::{LanguageBlock, SceneField};
use polyscript::providers::Translator;
use polyscript::translation::{BlockOutcome, CancellationFlag, EngineOptions, TranslationEngine};
use async_trait::async_trait;
use std::sync::Arc;

use crate::common;

fn project_with_scene() -> (Project, u32) {
    let mut project = Project::new("Demo", LanguageCode::Zh);
    let id = project.add_scene();
    (project, id)
}

/// Scenario: a Chinese outline is filled into the blank languages only
#[tokio::test]
async fn test_translateScene_withChineseOutline_shouldFillOutlineOnly() {
    let translator = MockTranslator::working();
    let engine = common::engine_with(translator.clone());
    let (mut project, id) = project_with_scene();
    let scene = project.scene_mut(id).unwrap();
    scene.outline = LanguageBlock::new("你好", "", "");

    let report = engine.translate_scene(scene, LanguageCode::Zh).await;

    assert_eq!(scene.outline.zh, "你好");
    assert_eq!(scene.outline.en, "[en] 你好");
    assert_eq!(scene.outline.id, "[id] 你好");
    assert!(scene.visual.is_empty());
    assert!(scene.dialogue.is_empty());
    assert!(report.is_clean());
    assert_eq!(report.filled_slots(), 2);
    assert_eq!(report.outcome(SceneField::Visual), Some(&BlockOutcome::Skipped));
    assert_eq!(translator.call_count(), 2);
}

/// A second run finds nothing blank and changes nothing
#[tokio::test]
async fn test_translateScene_runTwice_shouldBeIdempotent() {
    let translator = MockTranslator::working();
    let engine = common::engine_with(translator.clone());
    let (mut project, id) = project_with_scene();
    let scene = project.scene_mut(id).unwrap();
    scene.visual.en = "Sunset".to_string();
    scene.dialogue.id = "Halo".to_string();

    engine.translate_scene(scene, LanguageCode::Zh).await;
    let after_first = scene.clone();
    let calls = translator.call_count();

    let report = engine.translate_scene(scene, LanguageCode::Zh).await;

    assert_eq!(*scene, after_first);
    assert_eq!(translator.call_count(), calls);
    assert_eq!(report.filled_slots(), 0);
}

/// Every block with at least one non-blank slot ends up complete
#[tokio::test]
async fn test_translateScene_withPartialBlocks_shouldCompleteEachBlock() {
    let engine = common::engine_with(MockTranslator::working());
    let (mut project, id) = project_with_scene();
    let scene = project.scene_mut(id).unwrap();
    scene.outline.id = "Pembukaan".to_string();
    scene.visual = LanguageBlock::new("", "Harbour", "Pelabuhan");
    scene.dialogue.zh = "早上好".to_string();

    engine.translate_scene(scene, LanguageCode::En).await;

    for field in SceneField::ALL {
        assert!(scene.block(field).is_complete(), "{} block is incomplete", field);
    }
}

/// base = id, zh blank, en = "Hello": English is the source
#[tokio::test]
async fn test_translateBlock_withBlankBase_shouldUseNextInChain() {
    let translator = MockTranslator::working();
    let engine = common::engine_with(translator.clone());
    let mut block = LanguageBlock::new("", "Hello", "");

    let (outcome, _) = engine.translate_block(&mut block, SceneField::Dialogue, LanguageCode::Id).await;

    match outcome {
        BlockOutcome::Filled { source, .. } => assert_eq!(source, LanguageCode::En),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(translator.requests().iter().all(|r| r.source_language == LanguageCode::En));
    assert_eq!(block.zh, "[zh] Hello");
    assert_eq!(block.id, "[id] Hello");
}

/// Manual edits in non-blank slots are never overwritten
#[tokio::test]
async fn test_translateBlock_withManualEdit_shouldKeepItBitForBit() {
    let translator = MockTranslator::working();
    let engine = common::engine_with(translator.clone());
    let mut block = LanguageBlock::new("你好", "  Hi there ", "");

    engine.translate_block(&mut block, SceneField::Outline, LanguageCode::Zh).await;

    assert_eq!(block.en, "  Hi there ");
    assert_eq!(block.id, "[id] 你好");
    let targets: Vec<_> = translator.requests().iter().map(|r| r.target_language).collect();
    assert_eq!(targets, vec![LanguageCode::Id]);
}

/// Provider failure copies the source text and reports a warning
#[tokio::test]
async fn test_translateBlock_withFailingProvider_shouldCopySourceVerbatim() {
    common::init_test_logging();
    let engine = common::engine_with(MockTranslator::failing());
    let mut block = LanguageBlock::new("你好", "", "");

    let (outcome, warnings) = engine.translate_block(&mut block, SceneField::Outline, LanguageCode::Zh).await;

    assert_eq!(block, LanguageBlock::new("你好", "你好", "你好"));
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.source == LanguageCode::Zh && w.field == SceneField::Outline));
    assert!(matches!(warnings[0].error, ProviderError::ApiError { status_code: 500, .. }));
    assert_eq!(
        outcome,
        BlockOutcome::Filled {
            source: LanguageCode::Zh,
            translated: vec![],
            copied: vec![LanguageCode::En, LanguageCode::Id],
        }
    );
}

/// One failing target does not affect the other target of the block
#[tokio::test]
async fn test_translateBlock_withOneFailingTarget_shouldTranslateTheOther() {
    let engine = common::engine_with(MockTranslator::failing_for(LanguageCode::Id));
    let mut block = LanguageBlock::new("", "Good morning", "");

    let (_, warnings) = engine.translate_block(&mut block, SceneField::Dialogue, LanguageCode::Zh).await;

    assert_eq!(block.zh, "[zh] Good morning");
    assert_eq!(block.id, "Good morning");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].target, LanguageCode::Id);
}

/// Empty provider output counts as a failure
#[tokio::test]
async fn test_translateBlock_withEmptyResponse_shouldFallBack() {
    let engine = common::engine_with(MockTranslator::new(polyscript::providers::mock::MockBehavior::Empty));
    let mut block = LanguageBlock::new("", "", "Halo");

    let (_, warnings) = engine.translate_block(&mut block, SceneField::Visual, LanguageCode::Id).await;

    assert_eq!(block, LanguageBlock::new("Halo", "Halo", "Halo"));
    assert!(warnings.iter().all(|w| w.error == ProviderError::EmptyResponse));
}

/// A single retry recovers from a transient failure
#[tokio::test]
async fn test_translateBlock_withTransientFailure_shouldRetryOnce() {
    let translator = MockTranslator::fail_first(1);
    let options = EngineOptions {
        parallel_targets: false,
        ..common::fast_options()
    };
    let engine = TranslationEngine::new(Arc::new(translator.clone()), options);
    let mut block = LanguageBlock::new("你好", "", "");

    let (_, warnings) = engine.translate_block(&mut block, SceneField::Outline, LanguageCode::Zh).await;

    assert!(warnings.is_empty());
    assert_eq!(block.en, "[en] 你好");
    assert_eq!(block.id, "[id] 你好");
    assert_eq!(translator.call_count(), 3);
}

/// Whitespace-only slots count as blank and the source is stored trimmed
#[tokio::test]
async fn test_translateBlock_withWhitespaceSlots_shouldTreatThemAsBlank() {
    let engine = common::engine_with(MockTranslator::working());
    let mut block = LanguageBlock::new("  ", " Hello \n", "\t");

    engine.translate_block(&mut block, SceneField::Visual, LanguageCode::Zh).await;

    assert_eq!(block.en, "Hello");
    assert_eq!(block.zh, "[zh] Hello");
    assert_eq!(block.id, "[id] Hello");
}

/// An entirely blank scene is left untouched without provider calls
#[tokio::test]
async fn test_translateScene_withEmptyScene_shouldNotCallProvider() {
    let translator = MockTranslator::working();
    let engine = common::engine_with(translator.clone());
    let (mut project, id) = project_with_scene();
    let scene = project.scene_mut(id).unwrap();

    let report = engine.translate_scene(scene, LanguageCode::Zh).await;

    assert_eq!(translator.call_count(), 0);
    assert_eq!(report.blocks.len(), 3);
    assert!(report.blocks.iter().all(|(_, outcome)| *outcome == BlockOutcome::Skipped));
}

/// Blocks are processed visual first, then outline, then dialogue
#[tokio::test]
async fn test_translateScene_shouldWalkBlocksInProcessingOrder() {
    let engine = common::engine_with(MockTranslator::working());
    let (mut project, id) = project_with_scene();
    let scene = project.scene_mut(id).unwrap();

    let report = engine.translate_scene(scene, LanguageCode::Zh).await;

    let order: Vec<_> = report.blocks.iter().map(|(field, _)| *field).collect();
    assert_eq!(order, SceneField::TRANSLATION_ORDER.to_vec());
}

/// Translator that requests cancellation as soon as it is first called
#[derive(Debug)]
struct CancellingTranslator {
    cancel: CancellationFlag,
}

#[async_trait]
impl Translator for CancellingTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, ProviderError> {
        self.cancel.cancel();
        Ok(format!("[{}] {}", target, text))
    }
}

/// Cancelling during the first block finishes that block and stops there
#[tokio::test]
async fn test_translateScene_cancelledDuringFirstBlock_shouldStopAfterIt() {
    let cancel = CancellationFlag::new();
    let translator = CancellingTranslator { cancel: cancel.clone() };
    let engine = TranslationEngine::new(Arc::new(translator), common::fast_options());
    let (mut project, id) = project_with_scene();
    let scene = project.scene_mut(id).unwrap();
    scene.visual.zh = "日出".to_string();
    scene.outline.zh = "你好".to_string();
    scene.dialogue.en = "Hi".to_string();

    let report = engine.translate_scene_with_cancel(scene, LanguageCode::Zh, &cancel).await;

    assert!(report.cancelled);
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].0, SceneField::Visual);
    assert!(scene.visual.is_complete());
    assert_eq!(scene.visual.en, "[en] 日出");
    assert_eq!(scene.outline, LanguageBlock::new("你好", "", ""));
    assert_eq!(scene.dialogue, LanguageBlock::new("", "Hi", ""));
}
