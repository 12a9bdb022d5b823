/*!
 * Tests for file and directory utilities
 */

use std::fs;

use anyhow::Result;
use docxpolyglot::file_utils::FileManager;

use crate::common;

#[test]
fn test_translated_file_name_withDocxName_shouldInsertLanguage() {
    assert_eq!(FileManager::translated_file_name("report.docx", "es"), "report_translated_es.docx");
    assert_eq!(FileManager::translated_file_name("a.b.docx", "RU"), "a.b_translated_ru.docx");
    assert_eq!(FileManager::translated_file_name("", "fr"), "document_translated_fr.docx");
}

#[test]
fn test_generate_output_path_withOutputDir_shouldJoin() {
    let path = FileManager::generate_output_path("/in/notes.docx", "/out", "de");
    assert_eq!(path, std::path::PathBuf::from("/out/notes_translated_de.docx"));
}

#[test]
fn test_find_files_withLockFiles_shouldSkipThem() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let nested = dir.path().join("nested");
    fs::create_dir_all(&nested)?;

    fs::write(dir.path().join("b.docx"), b"x")?;
    fs::write(dir.path().join("A.DOCX"), b"x")?;
    fs::write(dir.path().join("~$b.docx"), b"x")?;
    fs::write(dir.path().join("notes.txt"), b"x")?;
    fs::write(nested.join("c.docx"), b"x")?;

    let files = FileManager::find_files(dir.path(), "docx")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(files.len(), 3);
    assert!(names.contains(&"A.DOCX".to_string()));
    assert!(names.contains(&"c.docx".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("~$")));
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("a/b/conf.json");

    FileManager::write_to_file(&path, "{}")?;
    assert_eq!(FileManager::read_to_string(&path)?, "{}");
    Ok(())
}

#[test]
fn test_append_to_log_file_shouldAppendTimestampedLines() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("issues.log");

    FileManager::append_to_log_file(&path, "first")?;
    FileManager::append_to_log_file(&path, "second")?;

    let content = FileManager::read_to_string(&path)?;
    assert_eq!(content.lines().count(), 2);
    assert!(content.lines().next().unwrap().ends_with("first"));
    Ok(())
}
