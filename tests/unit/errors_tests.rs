/*!
 * Tests for the error taxonomy
 */

use docxpolyglot::errors::{DocumentError, ProviderError, TranslationError};

#[test]
fn test_from_status_withAuthCodes_shouldBeAuthenticationError() {
    assert!(matches!(ProviderError::from_status(401, "no"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "no"), ProviderError::AuthenticationError(_)));
}

#[test]
fn test_from_status_with429_shouldBeRateLimit() {
    assert!(matches!(ProviderError::from_status(429, "slow down"), ProviderError::RateLimitExceeded(_)));
}

#[test]
fn test_from_status_withServerError_shouldKeepStatus() {
    let error = ProviderError::from_status(503, "busy");
    assert!(matches!(error, ProviderError::ApiError { status_code: 503, .. }));
    assert_eq!(error.to_string(), "API responded with error: 503 - busy");
}

#[test]
fn test_configuration_error_shouldDescribeProblem() {
    let error = TranslationError::Configuration("invalid endpoint URL: nope".to_string());
    assert_eq!(error.to_string(), "Configuration error: invalid endpoint URL: nope");
}

#[test]
fn test_document_error_conversions_shouldWrap() {
    let malformed = DocumentError::MalformedContent("bad".to_string());
    assert_eq!(malformed.to_string(), "Malformed document content: bad");

    let io: DocumentError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert!(matches!(io, DocumentError::Io(_)));
}

#[test]
fn test_zip_error_conversion_shouldBeArchiveError() {
    let error: DocumentError = zip::result::ZipError::FileNotFound.into();
    assert!(matches!(error, DocumentError::Archive(_)));
}
