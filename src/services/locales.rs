use crate::error::{GatewayError, GatewayResult};
use moka::future::Cache;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "tr", "de", "fr", "es"];
pub const DEFAULT_LANGUAGE: &str = "en";

/// Serves locale files from a directory, falling back to English.
pub struct LocaleService {
    dir: PathBuf,
    cache: Cache<&'static str, Arc<Value>>,
}

impl LocaleService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        tracing::info!("Serving locales from {}", dir.display());

        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self { dir, cache }
    }

    /// Picks a supported language from an explicit query value, then the
    /// `Accept-Language` header, then the default.
    pub fn negotiate(query: Option<&str>, accept_language: Option<&str>) -> &'static str {
        query
            .and_then(supported)
            .or_else(|| accept_language.and_then(from_accept_language))
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Loads `{lang}.json`, or the English file when `lang` is unsupported or absent.
    pub async fn load(&self, lang: &str) -> GatewayResult<(&'static str, Arc<Value>)> {
        if let Some(lang) = supported(lang) {
            if let Some(locale) = self.read(lang).await? {
                return Ok((lang, locale));
            }
            if lang != DEFAULT_LANGUAGE {
                tracing::debug!("Locale {} not found, falling back to {}", lang, DEFAULT_LANGUAGE);
            }
        }

        match self.read(DEFAULT_LANGUAGE).await? {
            Some(locale) => Ok((DEFAULT_LANGUAGE, locale)),
            None => Err(GatewayError::NotFound(format!(
                "locale file {}.json",
                DEFAULT_LANGUAGE
            ))),
        }
    }

    async fn read(&self, lang: &'static str) -> GatewayResult<Option<Arc<Value>>> {
        if let Some(cached) = self.cache.get(&lang).await {
            tracing::debug!("Locale cache hit for {}", lang);
            return Ok(Some(cached));
        }

        let path = self.dir.join(format!("{}.json", lang));
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(GatewayError::Internal(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let locale: Value = serde_json::from_slice(&contents).map_err(|e| {
            GatewayError::Internal(format!("invalid locale file {}: {}", path.display(), e))
        })?;
        let locale = Arc::new(locale);
        self.cache.insert(lang, locale.clone()).await;

        Ok(Some(locale))
    }
}

/// Maps a language tag (`de`, `DE`, `de-AT`) to a supported language.
fn supported(tag: &str) -> Option<&'static str> {
    let primary = tag.trim().split(['-', '_']).next()?.to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|lang| *lang == primary)
}

fn from_accept_language(header: &str) -> Option<&'static str> {
    let mut candidates: Vec<(&str, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            (!tag.is_empty() && quality > 0.0).then_some((tag, quality))
        })
        .collect();

    // Stable sort keeps header order for equal weights.
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    candidates.into_iter().find_map(|(tag, _)| supported(tag))
}
