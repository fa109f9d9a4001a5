use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::{ExportError, ProviderError, StoreError};
use crate::export::ExportService;
use crate::file_utils::{FileManager, ScriptDocument};
use crate::language_utils::LanguageCode;
use crate::project_store::{MoveDirection, ProjectStore, StoreEvent, StoreObserver};
use crate::providers::Translator;
use crate::scene::{Scene, SceneField};
use crate::translation::{
    CancellationFlag, EngineOptions, SceneTranslationReport, TranslationEngine, TranslationService,
    TranslationWarning,
};

// @module: Application controller, the surface a UI binds to

/// Summary of a whole-script run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Scenes processed
    pub scenes: usize,
    /// Slots filled by the engine
    pub filled_slots: usize,
    /// Non-fatal provider failures
    pub warnings: Vec<TranslationWarning>,
    /// Where the export artifact was written
    pub output_path: PathBuf,
    pub elapsed: Duration,
}

/// Owns the project store and the translation engine
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Projects edited in this process
    store: ProjectStore,
    // @field: Fills blank language slots
    engine: TranslationEngine,
}

impl Controller {
    /// Create a controller that translates offline, for tests and dry runs
    pub fn new_for_test() -> Self {
        Self::with_translator(Config::default(), Arc::new(crate::providers::mock::MockTranslator::working()))
    }

    // @method: Create a new controller with the provider named in the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let service = TranslationService::new(config.translation.clone())
            .context("Failed to create translation service")?;
        Ok(Self::with_translator(config, Arc::new(service)))
    }

    // @method: Create a controller around an explicit translator
    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Self {
        let store = ProjectStore::with_options(
            config.default_project_name.clone(),
            config.base_language,
            config.max_image_bytes,
        );
        let engine = TranslationEngine::new(translator, EngineOptions::from(&config.translation.common));

        Self { config, store, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Check that the translation provider is reachable
    pub async fn check_provider(&self) -> Result<(), ProviderError> {
        self.engine.check_translator().await
    }

    /// Register an observer that is told about every store mutation
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.store.subscribe(observer);
    }

    pub fn create_project(&mut self, name: &str) -> Result<StoreEvent, StoreError> {
        self.store.create_project(name)
    }

    pub fn switch_project(&mut self, name: &str) -> Result<StoreEvent, StoreError> {
        self.store.switch_project(name)
    }

    pub fn add_scene(&mut self) -> u32 {
        self.store.add_scene()
    }

    pub fn move_scene(&mut self, index: usize, direction: MoveDirection) -> Result<Option<StoreEvent>, StoreError> {
        self.store.move_scene(index, direction)
    }

    pub fn delete_scene(&mut self, index: usize) -> Result<StoreEvent, StoreError> {
        self.store.delete_scene(index)
    }

    pub fn scene(&self, scene_id: u32) -> Option<&Scene> {
        self.store.current().scene(scene_id)
    }

    /// Text of one slot of a scene in the current project
    pub fn get_text(&self, scene_id: u32, field: SceneField, language: LanguageCode) -> Result<&str, StoreError> {
        self.scene(scene_id)
            .map(|scene| scene.text(field, language))
            .ok_or(StoreError::UnknownScene(scene_id))
    }

    pub fn set_text(
        &mut self,
        scene_id: u32,
        field: SceneField,
        language: LanguageCode,
        text: impl Into<String>,
    ) -> Result<StoreEvent, StoreError> {
        self.store.set_text(scene_id, field, language, text)
    }

    pub fn attach_image(&mut self, scene_id: u32, filename: &str, data: Vec<u8>) -> Result<StoreEvent, StoreError> {
        self.store.attach_image(scene_id, filename, data)
    }

    pub fn clear_image(&mut self, scene_id: u32) -> Result<StoreEvent, StoreError> {
        self.store.clear_image(scene_id)
    }

    /// Fill the blank slots of a scene in the current project.
    /// `base` defaults to the project's base language.
    pub async fn translate_scene(
        &mut self,
        scene_id: u32,
        base: Option<LanguageCode>,
    ) -> Result<SceneTranslationReport, StoreError> {
        self.translate_scene_with_cancel(scene_id, base, &CancellationFlag::new()).await
    }

    pub async fn translate_scene_with_cancel(
        &mut self,
        scene_id: u32,
        base: Option<LanguageCode>,
        cancel: &CancellationFlag,
    ) -> Result<SceneTranslationReport, StoreError> {
        let project_name = self.store.current_name().to_string();
        let project = self.store.current_mut();
        let base = base.unwrap_or(project.base_language);
        let scene = project.scene_mut(scene_id).ok_or(StoreError::UnknownScene(scene_id))?;

        let report = self.engine.translate_scene_with_cancel(scene, base, cancel).await;
        self.store.record_translation(&project_name, scene_id, report.filled_slots());
        Ok(report)
    }

    /// Encode the current project as CSV
    pub fn export_current(&self) -> Result<Vec<u8>, ExportError> {
        ExportService::to_csv_bytes(self.store.current())
    }

    /// Write the current project to `output_dir` under its suggested file name
    pub fn export_current_to(&self, output_dir: &Path) -> Result<PathBuf> {
        FileManager::ensure_dir(output_dir)?;
        let output_path = output_dir.join(ExportService::suggested_file_name(self.store.current()));
        ExportService::write_csv(self.store.current(), &output_path)?;
        Ok(output_path)
    }

    /// Load a script file into a project and make it current.
    /// Returns the ids of the imported scenes. The store is left unchanged
    /// when the script or any referenced image cannot be read.
    pub fn import_script(&mut self, script_path: &Path) -> Result<Vec<u32>> {
        let script = FileManager::load_script(script_path)?;
        self.import_document(script_path, &script)
    }

    fn import_document(&mut self, script_path: &Path, script: &ScriptDocument) -> Result<Vec<u32>> {
        let name = script.project.trim();

        // Read and check every image before the first store mutation
        let mut images = Vec::with_capacity(script.scenes.len());
        for document in &script.scenes {
            let image = match &document.image {
                Some(image) => {
                    let image_path = FileManager::resolve_image_path(script_path, image);
                    let data = FileManager::read_bytes(&image_path)?;
                    let filename = FileManager::file_name_of(&image_path);
                    self.store.check_image(&filename, data.len())
                        .with_context(|| format!("Rejected image {:?}", image_path))?;
                    Some((filename, data))
                },
                None => None,
            };
            images.push(image);
        }

        if self.store.project(name).is_some() {
            self.store.switch_project(name)?;
        } else {
            self.store.create_project(name)?;
        }
        if let Some(base) = script.base_language {
            self.store.current_mut().base_language = base;
        }

        let mut ids = Vec::with_capacity(script.scenes.len());
        for (document, image) in script.scenes.iter().zip(images) {
            let id = self.store.add_scene();
            for field in SceneField::ALL {
                let block = match field {
                    SceneField::Outline => &document.outline,
                    SceneField::Visual => &document.visual,
                    SceneField::Dialogue => &document.dialogue,
                };
                for (language, text) in block.iter().filter(|(_, text)| !text.is_empty()) {
                    self.store.set_text(id, field, language, text)?;
                }
            }

            if let Some((filename, data)) = image {
                self.store.attach_image(id, &filename, data)?;
            }
            ids.push(id);
        }

        info!("Loaded {} scenes into project '{}'", ids.len(), self.store.current_name());
        Ok(ids)
    }

    /// Run the main workflow: import a script, translate every scene and
    /// export the result to `output_dir`
    pub async fn run(
        &mut self,
        script_path: &Path,
        output_dir: &Path,
        base: Option<LanguageCode>,
        force_overwrite: bool,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();

        if !FileManager::file_exists(script_path) {
            return Err(anyhow!("Script file does not exist: {:?}", script_path));
        }

        let script = FileManager::load_script(script_path)?;
        let output_path = output_dir.join(ExportService::file_name_for(script.project.trim()));
        if output_path.exists() && !force_overwrite {
            return Err(anyhow!("{} already exists (use -f to force overwrite)", output_path.display()));
        }

        let scene_ids = self.import_document(script_path, &script)?;

        info!("🎬 polyscript: {} - {}",
              self.config.translation.provider.display_name(),
              self.config.translation.get_model());

        let progress_bar = ProgressBar::new(scene_ids.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenes ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let mut summary = RunSummary {
            scenes: scene_ids.len(),
            ..RunSummary::default()
        };
        for scene_id in scene_ids {
            let report = self.translate_scene(scene_id, base).await?;
            summary.filled_slots += report.filled_slots();
            summary.warnings.extend(report.warnings);
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        if !summary.warnings.is_empty() {
            warn!("Translation completed with {} warnings, affected slots hold the source text",
                  summary.warnings.len());
            let log_path = output_dir.join("polyscript.issues.log");
            let context = format!("{} - {}",
                                  self.config.translation.provider.display_name(),
                                  self.config.translation.get_model());
            if let Err(e) = Self::write_warnings_to_file(&summary.warnings, &log_path, &context) {
                warn!("Failed to write warnings to file: {}", e);
            }
        }

        summary.output_path = self.export_current_to(output_dir)?;
        summary.elapsed = start_time.elapsed();

        info!("Success: {} ({} slots filled in {})",
              summary.output_path.display(),
              summary.filled_slots,
              Self::format_duration(summary.elapsed));
        Ok(summary)
    }

    /// Write a script file straight to CSV without translating
    pub fn export_script(&mut self, script_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        self.import_script(script_path)?;
        let output_path = self.export_current_to(output_dir)?;
        debug!("Exported {:?} without translation", script_path);
        Ok(output_path)
    }

    fn write_warnings_to_file(warnings: &[TranslationWarning], path: &Path, context: &str) -> Result<()> {
        FileManager::append_to_log_file(path, &format!("Translation warnings - {}", context))?;
        for warning in warnings {
            FileManager::append_to_log_file(path, &warning.to_string())?;
        }
        Ok(())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
