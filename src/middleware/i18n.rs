// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::NaiveDate;

const DEFAULT_LANG: &str = "pt";

// Idioma da requisição ("pt" ou "en"). Qualquer outro cai no padrão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first()
            // "pt-BR" -> "pt", "en" -> "en"
            .and_then(|tag| tag.split('-').next())
            .map(|lang| lang.to_lowercase())
            .filter(|lang| lang == "pt" || lang == "en")
            .map(Locale)
            .unwrap_or_default()
    }

    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    /// Escolhe a mensagem no idioma da requisição.
    pub fn pick<'a>(&self, pt: &'a str, en: &'a str) -> &'a str {
        if self.is_english() { en } else { pt }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        if self.is_english() {
            date.format("%Y-%m-%d").to_string()
        } else {
            date.format("%d/%m/%Y").to_string()
        }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}
