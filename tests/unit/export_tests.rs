/*!
 * Tests for the CSV export
 */

use anyhow::Result;
use polyscript::export::{EXPORT_HEADERS, ExportService, UTF8_BOM};
use polyscript::language_utils::LanguageCode;
use polyscript::project_store::{MoveDirection, ProjectStore};
use polyscript::scene::SceneField;

use crate::common;

fn demo_store() -> ProjectStore {
    let mut store = ProjectStore::new("Default Project");
    store.create_project("Demo").unwrap();
    let first = store.add_scene();
    let second = store.add_scene();
    store.set_text(first, SceneField::Outline, LanguageCode::Zh, "开场").unwrap();
    store.set_text(second, SceneField::Dialogue, LanguageCode::Id, "Terima kasih").unwrap();
    store.attach_image(second, "closing.jpg", vec![0xFF, 0xD8]).unwrap();
    store
}

/// Rows follow display order and carry the 1-based position
#[test]
fn test_flatten_afterReorder_shouldFollowDisplayOrder() {
    let mut store = demo_store();
    store.move_scene(1, MoveDirection::Up).unwrap();

    let rows = ExportService::flatten(store.current());

    assert_eq!(rows.len(), store.current().len());
    assert_eq!(rows[0].scene_no, 1);
    assert_eq!(rows[0].image, "closing.jpg");
    assert_eq!(rows[0].text(SceneField::Dialogue, LanguageCode::Id), "Terima kasih");
    assert_eq!(rows[1].scene_no, 2);
    assert_eq!(rows[1].image, "");
    assert_eq!(rows[1].text(SceneField::Outline, LanguageCode::Zh), "开场");
    assert!(rows.iter().all(|row| row.project == "Demo"));
}

/// Untouched fields export as empty strings
#[test]
fn test_flatten_withUntouchedFields_shouldExportEmptyStrings() {
    let store = demo_store();
    let rows = ExportService::flatten(store.current());

    let filled = rows[0].texts.iter().filter(|text| !text.is_empty()).count();
    assert_eq!(filled, 1);
    assert_eq!(rows[0].text(SceneField::Visual, LanguageCode::En), "");
}

/// Export reads but never mutates the project
#[test]
fn test_flatten_shouldNotMutateScenes() {
    let store = demo_store();
    let before: Vec<_> = store.current().scenes().to_vec();

    ExportService::flatten(store.current());
    ExportService::to_csv_bytes(store.current()).unwrap();

    assert_eq!(store.current().scenes(), before.as_slice());
}

#[test]
fn test_flatten_withNoScenes_shouldReturnNoRows() {
    let store = ProjectStore::new("Default Project");
    assert!(ExportService::flatten(store.current()).is_empty());

    let bytes = ExportService::to_csv_bytes(store.current()).unwrap();
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    assert_eq!(text.lines().count(), 1);
}

/// The artifact is BOM-prefixed UTF-8 that a CSV reader parses back
#[test]
fn test_toCsvBytes_shouldParseBackWithHeaders() {
    let store = demo_store();
    let bytes = ExportService::to_csv_bytes(store.current()).unwrap();
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);

    let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, EXPORT_HEADERS.to_vec());

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "Demo");
    assert_eq!(&records[0][1], "1");
    assert_eq!(&records[0][3], "开场");
    assert_eq!(&records[1][2], "closing.jpg");
    assert_eq!(&records[1][11], "Terima kasih");
}

#[test]
fn test_writeCsv_shouldWriteSuggestedFile() -> Result<()> {
    let store = demo_store();
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join(ExportService::suggested_file_name(store.current()));

    ExportService::write_csv(store.current(), &path)?;

    assert!(path.ends_with("video_script_Demo.csv"));
    let bytes = std::fs::read(&path)?;
    assert!(bytes.starts_with(UTF8_BOM));
    assert_eq!(bytes, ExportService::to_csv_bytes(store.current())?);
    Ok(())
}
