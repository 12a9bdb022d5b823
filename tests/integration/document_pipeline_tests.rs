/*!
 * Whole document translation tests, from package bytes to rebuilt package
 */

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use docxpolyglot::app_config::Config;
use docxpolyglot::errors::DocumentError;
use docxpolyglot::translation::{DocumentTranslator, TranslationOptions};
use docxpolyglot::DocxPackage;

use crate::common::mock_backends::{MockBackend, MockBehavior};
use crate::common::{self, build_archive, build_docx, content_of, document_xml, paragraphs, texts_of};

fn options(batch_size: usize, uniform_font: Option<&str>) -> TranslationOptions {
    TranslationOptions {
        batch_size,
        batch_delay: Duration::ZERO,
        uniform_font: uniform_font.map(str::to_string),
    }
}

fn translator(behavior: MockBehavior, options: TranslationOptions) -> DocumentTranslator {
    DocumentTranslator::new(Arc::new(MockBackend::new(behavior)), options)
}

#[tokio::test]
async fn test_translate_shouldReplaceEveryVisibleText() {
    common::init_logging();
    let source = build_docx(&paragraphs(&["Hello", "How are you?", "Bye"]));
    let translator = translator(MockBehavior::Prefix, options(2, None));

    let result = translator.translate(Bytes::from(source), "es", |_| {}).await.unwrap();

    assert_eq!(result.total_segments, 3);
    assert_eq!(result.usage.total_tokens, 20);
    assert_eq!(texts_of(&result.bytes), vec!["[es] Hello", "[es] How are you?", "[es] Bye"]);
}

#[tokio::test]
async fn test_translate_shouldKeepPackageStructure() {
    let source = build_docx(&paragraphs(&["Hello"]));
    let translator = translator(MockBehavior::Prefix, options(40, None));

    let result = translator.translate(Bytes::from(source.clone()), "de", |_| {}).await.unwrap();

    let mut before = DocxPackage::from_bytes(source).unwrap();
    let mut after = DocxPackage::from_bytes(result.bytes).unwrap();
    assert_eq!(before.entry_names().unwrap(), after.entry_names().unwrap());
}

#[tokio::test]
async fn test_translate_withUniformFont_shouldSetFontOnEveryRun() {
    let source = build_docx(&document_xml(
        r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Calibri"/></w:rPr><w:t>One</w:t></w:r><w:r><w:t>Two</w:t></w:r></w:p>"#,
    ));
    let translator = translator(MockBehavior::Prefix, options(40, Some("Times New Roman")));

    let result = translator.translate(Bytes::from(source), "fr", |_| {}).await.unwrap();
    let content = content_of(&result.bytes);

    assert!(!content.contains("Calibri"));
    assert_eq!(content.matches(r#"w:ascii="Times New Roman""#).count(), 2);
    assert_eq!(texts_of(&result.bytes), vec!["[fr] One", "[fr] Two"]);
}

#[tokio::test]
async fn test_translate_withoutUniformFont_shouldKeepFonts() {
    let source = build_docx(&document_xml(
        r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Calibri"/></w:rPr><w:t>One</w:t></w:r></w:p>"#,
    ));
    let translator = translator(MockBehavior::Prefix, options(40, None));

    let result = translator.translate(Bytes::from(source), "fr", |_| {}).await.unwrap();

    assert!(content_of(&result.bytes).contains(r#"<w:rFonts w:ascii="Calibri"/>"#));
}

#[tokio::test]
async fn test_translate_withNoText_shouldStillRebuild() {
    let xml = document_xml("<w:p/><w:p><w:r><w:t>   </w:t></w:r></w:p>");
    let backend = MockBackend::new(MockBehavior::Prefix);
    let tracker = backend.tracker();
    let translator = DocumentTranslator::new(Arc::new(backend), options(40, None));

    let mut events = Vec::new();
    let result = translator
        .translate(Bytes::from(build_docx(&xml)), "es", |progress| events.push(progress))
        .await
        .unwrap();

    assert_eq!(result.total_segments, 0);
    assert!(MockBackend::batch_sizes(&tracker).is_empty());
    assert_eq!(content_of(&result.bytes), xml);
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_translate_withFailingBackend_shouldReturnOriginalText() {
    let xml = paragraphs(&["Hello", "World"]);
    let translator = translator(MockBehavior::Fail, options(1, None));

    let result = translator.translate(Bytes::from(build_docx(&xml)), "es", |_| {}).await.unwrap();

    assert_eq!(result.usage.total_tokens, 0);
    assert_eq!(content_of(&result.bytes), xml);
}

#[tokio::test]
async fn test_translate_withShortAnswers_shouldKeepMissingOriginals() {
    let source = build_docx(&paragraphs(&["a", "b", "c", "d"]));
    let translator = translator(MockBehavior::Short(1), options(2, None));

    let result = translator.translate(Bytes::from(source), "es", |_| {}).await.unwrap();

    assert_eq!(texts_of(&result.bytes), vec!["[es] a", "b", "[es] c", "d"]);
}

#[tokio::test]
async fn test_translate_withMarkupInTranslation_shouldEscapeIt() {
    let source = build_docx(&paragraphs(&["x &lt; y &amp; z"]));
    let translator = translator(MockBehavior::Prefix, options(40, None));

    let result = translator.translate(Bytes::from(source), "es", |_| {}).await.unwrap();

    assert!(content_of(&result.bytes).contains("[es] x &lt; y &amp; z"));
    assert_eq!(texts_of(&result.bytes), vec!["[es] x < y & z"]);
}

#[tokio::test]
async fn test_translate_withMalformedContent_shouldFail() {
    let source = build_archive(&[("word/document.xml", &b"<w:document><w:body></w:document>"[..])]);
    let translator = translator(MockBehavior::Prefix, options(40, None));

    let result = translator.translate(Bytes::from(source), "es", |_| {}).await;

    assert!(matches!(result, Err(DocumentError::MalformedContent(_))));
}

#[tokio::test]
async fn test_translate_withNonPackage_shouldFail() {
    let translator = translator(MockBehavior::Prefix, options(40, None));

    let result = translator.translate(Bytes::from_static(b"plain text"), "es", |_| {}).await;

    assert!(matches!(result, Err(DocumentError::InvalidPackage(_))));
}

#[test]
fn test_options_from_config_shouldFollowDocumentSettings() {
    let mut config = Config::default();
    config.translation.common.batch_size = 5;
    config.translation.common.batch_delay_ms = 0;

    let enabled = TranslationOptions::from_config(&config);
    assert_eq!(enabled.batch_size, 5);
    assert_eq!(enabled.batch_delay, Duration::ZERO);
    assert_eq!(enabled.uniform_font.as_deref(), Some("Times New Roman"));

    config.document.enforce_uniform_font = false;
    assert_eq!(TranslationOptions::from_config(&config).uniform_font, None);
}
