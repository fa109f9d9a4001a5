/*!
 * Tests for the controller binding surface
 */

use anyhow::Result;
use parking_lot::Mutex;
use polyscript::app_config::{Config, TranslationProvider};
use polyscript::errors::StoreError;
use polyscript::language_utils::LanguageCode;
use polyscript::project_store::{MoveDirection, StoreEvent, StoreObserver};
use polyscript::providers::mock::MockTranslator;
use polyscript::scene::SceneField;
use polyscript::translation::CancellationFlag;
use polyscript::Controller;
use std::sync::Arc;

use crate::common;

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<StoreEvent>>,
}

impl StoreObserver for EventLog {
    fn on_event(&self, event: &StoreEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Test the controller initialization with a config-selected provider
#[test]
fn test_withConfig_withMockProvider_shouldStartWithDefaultProject() -> Result<()> {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config.default_project_name = "Storyboard".to_string();

    let controller = Controller::with_config(config)?;

    assert_eq!(controller.store().current_name(), "Storyboard");
    assert!(controller.store().current().is_empty());
    Ok(())
}

#[test]
fn test_withConfig_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_textAccessors_shouldReadAndWriteSlots() {
    let mut controller = Controller::new_for_test();
    let id = controller.add_scene();

    controller.set_text(id, SceneField::Visual, LanguageCode::Zh, "海边日落").unwrap();

    assert_eq!(controller.get_text(id, SceneField::Visual, LanguageCode::Zh).unwrap(), "海边日落");
    assert_eq!(controller.get_text(id, SceneField::Visual, LanguageCode::En).unwrap(), "");
    assert_eq!(
        controller.get_text(7, SceneField::Visual, LanguageCode::En),
        Err(StoreError::UnknownScene(7))
    );
}

/// Scenario: project "Demo", one scene with a Chinese outline
#[tokio::test]
async fn test_translateScene_inDemoProject_shouldFillOutline() {
    let mut controller = common::controller_with(MockTranslator::working());
    controller.create_project("Demo").unwrap();
    let id = controller.add_scene();
    controller.set_text(id, SceneField::Outline, LanguageCode::Zh, "你好").unwrap();

    let report = controller.translate_scene(id, Some(LanguageCode::Zh)).await.unwrap();

    let scene = controller.scene(id).unwrap();
    assert_eq!(scene.outline.zh, "你好");
    assert!(!scene.outline.en.is_empty());
    assert!(!scene.outline.id.is_empty());
    assert!(scene.visual.is_empty());
    assert!(scene.dialogue.is_empty());
    assert_eq!(report.filled_slots(), 2);
}

/// Same scenario with a dead provider: verbatim copies plus warnings
#[tokio::test]
async fn test_translateScene_withFailingProvider_shouldCopyAndWarn() {
    let mut controller = common::controller_with(MockTranslator::failing());
    controller.create_project("Demo").unwrap();
    let id = controller.add_scene();
    controller.set_text(id, SceneField::Outline, LanguageCode::Zh, "你好").unwrap();

    let report = controller.translate_scene(id, None).await.unwrap();

    let scene = controller.scene(id).unwrap();
    assert_eq!(scene.outline.en, "你好");
    assert_eq!(scene.outline.id, "你好");
    assert_eq!(report.warnings.len(), 2);
    assert!(!report.is_clean());
}

/// The project base language is used when none is given
#[tokio::test]
async fn test_translateScene_withoutBase_shouldUseProjectBaseLanguage() {
    let translator = MockTranslator::working();
    let mut controller = common::controller_with(translator.clone());
    let id = controller.add_scene();
    controller.set_text(id, SceneField::Dialogue, LanguageCode::Zh, "谢谢").unwrap();
    controller.set_text(id, SceneField::Dialogue, LanguageCode::Id, "Terima kasih").unwrap();

    controller.translate_scene(id, None).await.unwrap();
    assert_eq!(translator.requests()[0].source_language, LanguageCode::Zh);

    let second = controller.add_scene();
    controller.set_text(second, SceneField::Dialogue, LanguageCode::Zh, "谢谢").unwrap();
    controller.set_text(second, SceneField::Dialogue, LanguageCode::Id, "Terima kasih").unwrap();
    controller.translate_scene(second, Some(LanguageCode::Id)).await.unwrap();
    assert_eq!(translator.requests()[1].source_language, LanguageCode::Id);
}

#[tokio::test]
async fn test_translateScene_shouldNotifyObservers() {
    let log = Arc::new(EventLog::default());
    let mut controller = common::controller_with(MockTranslator::working());
    controller.subscribe(log.clone());

    let id = controller.add_scene();
    controller.set_text(id, SceneField::Visual, LanguageCode::En, "Close-up").unwrap();
    controller.translate_scene(id, None).await.unwrap();

    let events = log.events.lock();
    assert!(matches!(
        events.last(),
        Some(StoreEvent::SceneTranslated { scene_id: 1, filled_slots: 2, .. })
    ));
}

/// Cancellation before the first block leaves the scene as it was
#[tokio::test]
async fn test_translateSceneWithCancel_whenCancelled_shouldLeaveSceneUntouched() {
    let translator = MockTranslator::working();
    let mut controller = common::controller_with(translator.clone());
    let id = controller.add_scene();
    controller.set_text(id, SceneField::Outline, LanguageCode::En, "Opening").unwrap();

    let cancel = CancellationFlag::new();
    cancel.cancel();
    let report = controller.translate_scene_with_cancel(id, None, &cancel).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(translator.call_count(), 0);
    assert_eq!(controller.get_text(id, SceneField::Outline, LanguageCode::Zh).unwrap(), "");
}

#[test]
fn test_projectOperations_shouldDelegateToStore() {
    let mut controller = Controller::new_for_test();
    controller.create_project("Demo").unwrap();
    let a = controller.add_scene();
    let b = controller.add_scene();

    controller.move_scene(1, MoveDirection::Up).unwrap();
    let order: Vec<u32> = controller.store().current().scenes().iter().map(|s| s.id()).collect();
    assert_eq!(order, vec![b, a]);

    controller.delete_scene(0).unwrap();
    assert_eq!(controller.add_scene(), 3);

    controller.switch_project("Default Project").unwrap();
    assert!(controller.store().current().is_empty());
    assert_eq!(controller.create_project("Demo"), Err(StoreError::DuplicateProjectName("Demo".to_string())));
}

#[test]
fn test_attachImage_withLimitFromConfig_shouldRejectLargeImage() {
    let mut config = Config::default();
    config.max_image_bytes = Some(2);
    let mut controller = Controller::with_translator(config, Arc::new(MockTranslator::working()));
    let id = controller.add_scene();

    assert_eq!(
        controller.attach_image(id, "frame.png", vec![0; 3]),
        Err(StoreError::ImageTooLarge { size: 3, limit: 2 })
    );
    controller.attach_image(id, "frame.png", vec![0; 2]).unwrap();
    assert_eq!(controller.scene(id).unwrap().image_name(), "frame.png");

    controller.clear_image(id).unwrap();
    assert!(controller.scene(id).unwrap().image.is_none());
}

#[test]
fn test_exportCurrent_shouldStartWithBom() {
    let mut controller = Controller::new_for_test();
    controller.add_scene();

    let bytes = controller.export_current().unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
}

/// The provider check never spends a translation request
#[tokio::test]
async fn test_checkProvider_shouldNotTranslate() -> Result<()> {
    let translator = MockTranslator::working();
    let controller = Controller::with_translator(Config::default(), Arc::new(translator.clone()));

    controller.check_provider().await?;

    assert_eq!(translator.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_checkProvider_withUnreachableProvider_shouldFail() {
    let controller = common::controller_with(MockTranslator::failing());
    assert!(controller.check_provider().await.is_err());
}

/// A config-selected provider is checked through the same surface the CLI uses
#[tokio::test]
async fn test_checkProvider_withConfiguredMock_shouldSucceed() -> Result<()> {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;

    let controller = Controller::with_config(config)?;

    controller.check_provider().await?;
    Ok(())
}
