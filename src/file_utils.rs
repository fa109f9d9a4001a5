use anyhow::{Result, Context, anyhow};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::language_utils::LanguageCode;
use crate::scene::LanguageBlock;

// @module: File and directory utilities

/// A script file as written by hand or by another tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptDocument {
    /// Target project name
    pub project: String,

    /// Preferred translation source, config default when absent
    #[serde(default)]
    pub base_language: Option<LanguageCode>,

    #[serde(default)]
    pub scenes: Vec<SceneDocument>,
}

/// One scene of a script file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub outline: LanguageBlock,
    #[serde(default)]
    pub visual: LanguageBlock,
    #[serde(default)]
    pub dialogue: LanguageBlock,

    /// Reference image path, relative to the script file
    #[serde(default)]
    pub image: Option<String>,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read a binary file
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    // @loads: Script document from a JSON file
    pub fn load_script<P: AsRef<Path>>(path: P) -> Result<ScriptDocument> {
        let path = path.as_ref();
        let content = Self::read_to_string(path)?;
        let script: ScriptDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse script file: {:?}", path))?;

        if script.project.trim().is_empty() {
            return Err(anyhow!("Script {:?} has no project name", path));
        }
        Ok(script)
    }

    // @resolves: Image path of a scene relative to the script file
    pub fn resolve_image_path<P: AsRef<Path>>(script_path: P, image: &str) -> PathBuf {
        let image_path = Path::new(image);
        if image_path.is_absolute() {
            return image_path.to_path_buf();
        }

        script_path
            .as_ref()
            .parent()
            .map(|dir| dir.join(image_path))
            .unwrap_or_else(|| image_path.to_path_buf())
    }

    /// Bare file name of a path, used as the exported image name
    pub fn file_name_of<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
