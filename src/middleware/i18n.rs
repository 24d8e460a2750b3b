// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::{I18nStore, DEFAULT_LANG};

// Language of the response messages, from Accept-Language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// First supported primary subtag of the header ("en-US" -> "en").
    pub fn from_header(value: &str, store: &I18nStore) -> Self {
        accept_language::parse(value)
            .iter()
            .map(|tag| tag.split('-').next().unwrap_or(tag.as_str()).to_lowercase())
            .find(|lang| store.supports(lang))
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(|value| Locale::from_header(value, I18nStore::shared()))
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        let store = I18nStore::new();
        assert_eq!(Locale::from_header("en-US,en;q=0.9", &store).0, "en");
        assert_eq!(Locale::from_header("fr-FR, en;q=0.5", &store).0, "en");
        assert_eq!(Locale::from_header("vi-VN", &store).0, "vi");
    }

    #[test]
    fn unsupported_or_empty_falls_back_to_vietnamese() {
        let store = I18nStore::new();
        assert_eq!(Locale::from_header("de-DE", &store), Locale::default());
        assert_eq!(Locale::from_header("", &store).0, "vi");
    }
}
