/*!
 * Flat table export of a project.
 *
 * One row per scene in current display order. The CSV artifact starts with a
 * UTF-8 byte-order marker so spreadsheet tools pick the right encoding for
 * Chinese text.
 */

use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::errors::ExportError;
use crate::language_utils::LanguageCode;
use crate::project_store::Project;
use crate::scene::SceneField;

/// UTF-8 byte-order marker written before the header row
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row of the export artifact
pub const EXPORT_HEADERS: [&str; 12] = [
    "Project",
    "Scene No.",
    "Image",
    "Outline (Chinese)",
    "Outline (English)",
    "Outline (Indonesian)",
    "Visual (Chinese)",
    "Visual (English)",
    "Visual (Indonesian)",
    "Dialogue (Chinese)",
    "Dialogue (English)",
    "Dialogue (Indonesian)",
];

/// One exported scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub project: String,
    /// 1-based position in the current order, not the scene id
    pub scene_no: usize,
    /// Image file name, empty when none is attached
    pub image: String,
    /// Texts in header order: outline, visual, dialogue, each zh, en, id
    pub texts: [String; 9],
}

impl ExportRow {
    /// Text of one `(field, language)` column
    pub fn text(&self, field: SceneField, lang: LanguageCode) -> &str {
        let field_index = SceneField::ALL.iter().position(|f| *f == field).unwrap_or(0);
        let lang_index = LanguageCode::ALL.iter().position(|l| *l == lang).unwrap_or(0);
        &self.texts[field_index * LanguageCode::ALL.len() + lang_index]
    }

    /// All cells of the row in header order
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(EXPORT_HEADERS.len());
        cells.push(self.project.clone());
        cells.push(self.scene_no.to_string());
        cells.push(self.image.clone());
        cells.extend(self.texts.iter().cloned());
        cells
    }
}

pub struct ExportService;

impl ExportService {
    /// Flatten a project into rows. Scene state is only read.
    pub fn flatten(project: &Project) -> Vec<ExportRow> {
        project
            .scenes()
            .iter()
            .enumerate()
            .map(|(index, scene)| {
                let mut texts: [String; 9] = Default::default();
                let slots = SceneField::ALL
                    .into_iter()
                    .flat_map(|field| LanguageCode::ALL.into_iter().map(move |lang| (field, lang)));
                for (cell, (field, lang)) in texts.iter_mut().zip(slots) {
                    *cell = scene.text(field, lang).to_string();
                }

                ExportRow {
                    project: project.name().to_string(),
                    scene_no: index + 1,
                    image: scene.image_name().to_string(),
                    texts,
                }
            })
            .collect()
    }

    /// Encode a project as BOM-prefixed CSV
    pub fn to_csv_bytes(project: &Project) -> Result<Vec<u8>, ExportError> {
        let mut buffer = UTF8_BOM.to_vec();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            writer.write_record(EXPORT_HEADERS)?;
            for row in Self::flatten(project) {
                writer.write_record(row.cells())?;
            }
            writer.flush()?;
        }

        debug!("Encoded {} scenes of '{}' ({} bytes)", project.len(), project.name(), buffer.len());
        Ok(buffer)
    }

    /// File name offered for the artifact, e.g. `video_script_Demo.csv`
    pub fn suggested_file_name(project: &Project) -> String {
        Self::file_name_for(project.name())
    }

    /// Artifact file name for a project name, path separators replaced by `_`
    pub fn file_name_for(project_name: &str) -> String {
        let name: String = project_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
            .collect();
        format!("video_script_{}.csv", name)
    }

    /// Write the artifact to `path`
    pub fn write_csv<P: AsRef<Path>>(project: &Project, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        let bytes = Self::to_csv_bytes(project)?;
        fs::write(path, bytes)?;
        info!("Exported '{}' to {}", project.name(), path.display());
        Ok(())
    }
}
