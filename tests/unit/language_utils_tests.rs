/*!
 * Tests for language utility functions
 */

use docxpolyglot::language_utils::{
    get_language_name, normalize_to_part2t, prompt_language_name, supported_languages,
    validate_language_code, LanguageCodeType,
};

#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    assert_eq!(validate_language_code("ru").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);

    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("e").is_err());
}

#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("zho").unwrap(), "zho");
}

#[test]
fn test_get_language_name_withSupportedCodes_shouldReturnEnglishNames() {
    assert_eq!(get_language_name("ru").unwrap(), "Russian");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_supported_languages_shouldListTenValidCodes() {
    let languages = supported_languages();
    assert_eq!(languages.len(), 10);
    assert_eq!(languages[0].code, "ru");
    for language in languages {
        assert!(validate_language_code(language.code).is_ok(), "{} should be valid", language.code);
    }
}

#[test]
fn test_prompt_language_name_withUnknownCode_shouldReturnCode() {
    assert_eq!(prompt_language_name("zh"), "Chinese");
    assert_eq!(prompt_language_name("nld"), "Dutch");
    assert_eq!(prompt_language_name("klingon"), "klingon");
}
