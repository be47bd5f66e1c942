use isolang::Language;

use crate::error::{Result, SubtransError};

/// Resolve an ISO 639-1 (2-letter) or ISO 639-3 (3-letter) code to a language.
pub fn resolve(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    };

    language.ok_or_else(|| SubtransError::Language(code.to_string()))
}

/// English language name used in prompt text, uppercased so the target
/// language stands out from the surrounding instructions.
pub fn prompt_name(code: &str) -> Result<String> {
    let language = resolve(code)?;
    Ok(language.to_name().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_two_letter_code() {
        assert_eq!(resolve("en").unwrap(), Language::Eng);
        assert_eq!(resolve("fr").unwrap(), Language::Fra);
    }

    #[test]
    fn test_resolve_three_letter_code() {
        assert_eq!(resolve("eng").unwrap(), Language::Eng);
        assert_eq!(resolve("jpn").unwrap(), Language::Jpn);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve("ENG").unwrap(), Language::Eng);
        assert_eq!(resolve(" ita ").unwrap(), Language::Ita);
    }

    #[test]
    fn test_resolve_rejects_unknown_codes() {
        assert!(resolve("zz").is_err());
        assert!(resolve("zzz").is_err());
        assert!(resolve("english").is_err());
    }

    #[test]
    fn test_prompt_name_is_uppercase() {
        assert_eq!(prompt_name("eng").unwrap(), "ENGLISH");
        assert_eq!(prompt_name("it").unwrap(), "ITALIAN");
    }
}
