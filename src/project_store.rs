/*!
 * Project store: named projects, each an ordered list of scenes.
 *
 * The store is an explicit value owned by the caller. A default project
 * exists from construction on and is current until another project is
 * created or switched to. Scene ids come from a per-project counter that
 * only ever grows, so ids are never reused after a deletion.
 */

use bytes::Bytes;
use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::language_utils::LanguageCode;
use crate::scene::{ImageRef, Scene, SceneField};

/// Reference image extensions accepted by `attach_image`
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Direction for reordering a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start of the script
    Up,
    /// Towards the end of the script
    Down,
}

/// A named, ordered sequence of scenes
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    scenes: Vec<Scene>,
    next_id: u32,
    /// Preferred translation source for this project
    pub base_language: LanguageCode,
}

impl Project {
    /// Create an empty project. The first scene gets id 1.
    pub fn new(name: impl Into<String>, base_language: LanguageCode) -> Self {
        Self {
            name: name.into(),
            scenes: Vec::new(),
            next_id: 1,
            base_language,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenes in display (and export) order
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Id the next added scene will receive
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn scene(&self, id: u32) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id() == id)
    }

    pub fn scene_mut(&mut self, id: u32) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|scene| scene.id() == id)
    }

    /// Current position of a scene in the order list
    pub fn position_of(&self, id: u32) -> Option<usize> {
        self.scenes.iter().position(|scene| scene.id() == id)
    }

    /// Append an empty scene and return its id
    pub fn add_scene(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.scenes.push(Scene::new(id));
        id
    }

    /// Swap the scene at `index` with its neighbour in `direction`.
    ///
    /// Returns the new position, or `None` when the scene already sits at
    /// the boundary in that direction.
    pub fn move_scene(&mut self, index: usize, direction: MoveDirection) -> Result<Option<usize>, StoreError> {
        let len = self.scenes.len();
        if index >= len {
            return Err(StoreError::InvalidIndex { index, len });
        }

        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < len => index + 1,
            _ => return Ok(None),
        };

        self.scenes.swap(index, target);
        Ok(Some(target))
    }

    /// Remove the scene at `index`. Ids of the remaining scenes are untouched.
    pub fn delete_scene(&mut self, index: usize) -> Result<Scene, StoreError> {
        let len = self.scenes.len();
        if index >= len {
            return Err(StoreError::InvalidIndex { index, len });
        }
        Ok(self.scenes.remove(index))
    }
}

/// Notification emitted after every successful store mutation
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ProjectCreated { project: String },
    ProjectSwitched { project: String },
    SceneAdded { project: String, scene_id: u32 },
    SceneMoved { project: String, scene_id: u32, from: usize, to: usize },
    SceneDeleted { project: String, scene_id: u32, index: usize },
    SceneEdited { project: String, scene_id: u32, field: SceneField, language: LanguageCode },
    ImageAttached { project: String, scene_id: u32, filename: String },
    ImageCleared { project: String, scene_id: u32 },
    SceneTranslated { project: String, scene_id: u32, filled_slots: usize },
}

/// Receives store events, e.g. to let a UI decide when to redraw
pub trait StoreObserver: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

/// Collection of named projects with one current project
pub struct ProjectStore {
    /// Projects in creation order
    projects: Vec<Project>,
    /// Index of the current project
    current: usize,
    /// Language new projects start with
    default_base_language: LanguageCode,
    /// Upper bound for reference images, if any
    max_image_bytes: Option<usize>,
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl ProjectStore {
    /// Create a store holding one empty default project, which is current
    pub fn new(default_project_name: impl Into<String>) -> Self {
        Self::with_options(default_project_name, LanguageCode::Zh, None)
    }

    /// Create a store with an explicit base language for new projects and
    /// an optional reference image size limit
    pub fn with_options(
        default_project_name: impl Into<String>,
        default_base_language: LanguageCode,
        max_image_bytes: Option<usize>,
    ) -> Self {
        Self {
            projects: vec![Project::new(default_project_name, default_base_language)],
            current: 0,
            default_base_language,
            max_image_bytes,
            observers: Vec::new(),
        }
    }

    /// Register an observer for subsequent mutations
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: &StoreEvent) {
        debug!("Store event: {:?}", event);
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Project names in creation order
    pub fn project_names(&self) -> Vec<&str> {
        self.projects.iter().map(|project| project.name()).collect()
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.name == name)
    }

    fn index_of(&self, name: &str) -> Result<usize, StoreError> {
        self.projects
            .iter()
            .position(|project| project.name == name)
            .ok_or_else(|| StoreError::UnknownProject(name.to_string()))
    }

    /// Mutable access to a named project. Field edits made through this
    /// handle are not reported to observers.
    pub fn project_mut(&mut self, name: &str) -> Result<&mut Project, StoreError> {
        let index = self.index_of(name)?;
        Ok(&mut self.projects[index])
    }

    pub fn current(&self) -> &Project {
        &self.projects[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Project {
        &mut self.projects[self.current]
    }

    pub fn current_name(&self) -> &str {
        self.current().name()
    }

    /// Create an empty project under the trimmed `name` and make it current
    pub fn create_project(&mut self, name: &str) -> Result<StoreEvent, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyProjectName);
        }
        if self.project(name).is_some() {
            return Err(StoreError::DuplicateProjectName(name.to_string()));
        }

        self.projects.push(Project::new(name, self.default_base_language));
        self.current = self.projects.len() - 1;

        let event = StoreEvent::ProjectCreated { project: name.to_string() };
        self.notify(&event);
        Ok(event)
    }

    /// Make an existing project current
    pub fn switch_project(&mut self, name: &str) -> Result<StoreEvent, StoreError> {
        self.current = self.index_of(name)?;

        let event = StoreEvent::ProjectSwitched { project: name.to_string() };
        self.notify(&event);
        Ok(event)
    }

    /// Append an empty scene to the named project
    pub fn add_scene_to(&mut self, project: &str) -> Result<StoreEvent, StoreError> {
        let scene_id = self.project_mut(project)?.add_scene();

        let event = StoreEvent::SceneAdded { project: project.to_string(), scene_id };
        self.notify(&event);
        Ok(event)
    }

    /// Append an empty scene to the current project and return its id
    pub fn add_scene(&mut self) -> u32 {
        let project = self.current_name().to_string();
        let scene_id = self.current_mut().add_scene();
        self.notify(&StoreEvent::SceneAdded { project, scene_id });
        scene_id
    }

    /// Swap a scene with its neighbour in the named project.
    /// `Ok(None)` means the scene was already at that boundary.
    pub fn move_scene_in(
        &mut self,
        project: &str,
        index: usize,
        direction: MoveDirection,
    ) -> Result<Option<StoreEvent>, StoreError> {
        let target = self.project_mut(project)?;
        let Some(to) = target.move_scene(index, direction)? else {
            return Ok(None);
        };
        let scene_id = target.scenes[to].id();

        let event = StoreEvent::SceneMoved {
            project: project.to_string(),
            scene_id,
            from: index,
            to,
        };
        self.notify(&event);
        Ok(Some(event))
    }

    pub fn move_scene(&mut self, index: usize, direction: MoveDirection) -> Result<Option<StoreEvent>, StoreError> {
        let project = self.current_name().to_string();
        self.move_scene_in(&project, index, direction)
    }

    /// Remove the scene at `index` of the named project
    pub fn delete_scene_from(&mut self, project: &str, index: usize) -> Result<StoreEvent, StoreError> {
        let removed = self.project_mut(project)?.delete_scene(index)?;

        let event = StoreEvent::SceneDeleted {
            project: project.to_string(),
            scene_id: removed.id(),
            index,
        };
        self.notify(&event);
        Ok(event)
    }

    pub fn delete_scene(&mut self, index: usize) -> Result<StoreEvent, StoreError> {
        let project = self.current_name().to_string();
        self.delete_scene_from(&project, index)
    }

    /// Overwrite one text slot of a scene in the named project
    pub fn set_text_in(
        &mut self,
        project: &str,
        scene_id: u32,
        field: SceneField,
        language: LanguageCode,
        text: impl Into<String>,
    ) -> Result<StoreEvent, StoreError> {
        self.project_mut(project)?
            .scene_mut(scene_id)
            .ok_or(StoreError::UnknownScene(scene_id))?
            .set_text(field, language, text);

        let event = StoreEvent::SceneEdited {
            project: project.to_string(),
            scene_id,
            field,
            language,
        };
        self.notify(&event);
        Ok(event)
    }

    pub fn set_text(
        &mut self,
        scene_id: u32,
        field: SceneField,
        language: LanguageCode,
        text: impl Into<String>,
    ) -> Result<StoreEvent, StoreError> {
        let project = self.current_name().to_string();
        self.set_text_in(&project, scene_id, field, language, text)
    }

    /// Attach (or replace) the reference image of a scene in the named project
    pub fn attach_image_in(
        &mut self,
        project: &str,
        scene_id: u32,
        filename: &str,
        data: impl Into<Bytes>,
    ) -> Result<StoreEvent, StoreError> {
        let data = data.into();
        self.check_image(filename, data.len())?;

        self.project_mut(project)?
            .scene_mut(scene_id)
            .ok_or(StoreError::UnknownScene(scene_id))?
            .image = Some(ImageRef::new(filename, data));

        let event = StoreEvent::ImageAttached {
            project: project.to_string(),
            scene_id,
            filename: filename.to_string(),
        };
        self.notify(&event);
        Ok(event)
    }

    pub fn attach_image(
        &mut self,
        scene_id: u32,
        filename: &str,
        data: impl Into<Bytes>,
    ) -> Result<StoreEvent, StoreError> {
        let project = self.current_name().to_string();
        self.attach_image_in(&project, scene_id, filename, data)
    }

    /// Drop the reference image of a scene in the current project
    pub fn clear_image(&mut self, scene_id: u32) -> Result<StoreEvent, StoreError> {
        let project = self.current_name().to_string();
        self.current_mut()
            .scene_mut(scene_id)
            .ok_or(StoreError::UnknownScene(scene_id))?
            .image = None;

        let event = StoreEvent::ImageCleared { project, scene_id };
        self.notify(&event);
        Ok(event)
    }

    /// Report a finished translation of a scene to observers
    pub(crate) fn record_translation(&self, project: &str, scene_id: u32, filled_slots: usize) -> StoreEvent {
        let event = StoreEvent::SceneTranslated {
            project: project.to_string(),
            scene_id,
            filled_slots,
        };
        self.notify(&event);
        event
    }

    /// Whether an image of `size` bytes named `filename` would be accepted
    pub fn check_image(&self, filename: &str, size: usize) -> Result<(), StoreError> {
        let supported = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if !supported {
            return Err(StoreError::UnsupportedImage(filename.to_string()));
        }

        if let Some(limit) = self.max_image_bytes {
            if size > limit {
                return Err(StoreError::ImageTooLarge { size, limit });
            }
        }
        Ok(())
    }
}
