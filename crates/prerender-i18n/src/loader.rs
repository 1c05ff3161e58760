//! Locale resource loading.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::catalog::MessageCatalog;

/// Error type for locale resolution.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    #[error("missing locale resource '{key}' under {dir}")]
    Configuration { key: String, dir: String },

    #[error("failed reading locale resource '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed message catalog '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no supported locales found under {dir}")]
    NoSupportedLocales { dir: String },
}

/// Async seam to wherever locale resources are stored.
///
/// One message catalog exists per locale code; one locale-data script
/// exists per primary language subtag.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// List the supported locale codes.
    async fn list_locales(&self) -> Result<Vec<String>, LocaleError>;

    /// Load the message catalog for a locale code.
    async fn load_catalog(&self, locale: &str) -> Result<MessageCatalog, LocaleError>;

    /// Load the locale-formatting script for a primary language subtag.
    async fn load_locale_data(&self, lang: &str) -> Result<String, LocaleError>;
}

/// Loads locale resources from the filesystem.
///
/// Catalogs live as `<locale>.json` under the translations directory;
/// locale-data scripts as `<lang>.js` under the locale-data directory.
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    translations_dir: PathBuf,
    locale_data_dir: PathBuf,
}

impl FsResourceLoader {
    /// Create a loader over the two resource directories.
    pub fn new(translations_dir: impl Into<PathBuf>, locale_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            translations_dir: translations_dir.into(),
            locale_data_dir: locale_data_dir.into(),
        }
    }
}

#[async_trait]
impl ResourceLoader for FsResourceLoader {
    async fn list_locales(&self) -> Result<Vec<String>, LocaleError> {
        let dir = self.translations_dir.display().to_string();
        let mut entries =
            tokio::fs::read_dir(&self.translations_dir)
                .await
                .map_err(|source| LocaleError::Io {
                    key: "*".to_string(),
                    source,
                })?;

        let mut locales = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| LocaleError::Io {
            key: "*".to_string(),
            source,
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    locales.push(stem.to_string());
                }
            }
        }

        if locales.is_empty() {
            return Err(LocaleError::NoSupportedLocales { dir });
        }
        locales.sort();
        Ok(locales)
    }

    async fn load_catalog(&self, locale: &str) -> Result<MessageCatalog, LocaleError> {
        let path = self.translations_dir.join(format!("{}.json", locale));
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            missing_or_io(
                source,
                locale,
                self.translations_dir.display().to_string(),
            )
        })?;

        serde_json::from_slice(&bytes).map_err(|source| LocaleError::Parse {
            key: locale.to_string(),
            source,
        })
    }

    async fn load_locale_data(&self, lang: &str) -> Result<String, LocaleError> {
        let path = self.locale_data_dir.join(format!("{}.js", lang));
        tokio::fs::read_to_string(&path).await.map_err(|source| {
            missing_or_io(source, lang, self.locale_data_dir.display().to_string())
        })
    }
}

fn missing_or_io(source: std::io::Error, key: &str, dir: String) -> LocaleError {
    if source.kind() == std::io::ErrorKind::NotFound {
        LocaleError::Configuration {
            key: key.to_string(),
            dir,
        }
    } else {
        LocaleError::Io {
            key: key.to_string(),
            source,
        }
    }
}

/// In-memory loader for embedded resources and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceLoader {
    catalogs: HashMap<String, MessageCatalog>,
    locale_data: HashMap<String, String>,
}

impl StaticResourceLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locale's catalog and its language's data script.
    pub fn with_locale(
        mut self,
        locale: impl Into<String>,
        catalog: MessageCatalog,
        locale_data: impl Into<String>,
    ) -> Self {
        let locale = locale.into();
        let lang = locale
            .split('-')
            .next()
            .unwrap_or(locale.as_str())
            .to_string();
        self.catalogs.insert(locale, catalog);
        self.locale_data.insert(lang, locale_data.into());
        self
    }
}

#[async_trait]
impl ResourceLoader for StaticResourceLoader {
    async fn list_locales(&self) -> Result<Vec<String>, LocaleError> {
        if self.catalogs.is_empty() {
            return Err(LocaleError::NoSupportedLocales {
                dir: "<static>".to_string(),
            });
        }
        let mut locales: Vec<String> = self.catalogs.keys().cloned().collect();
        locales.sort();
        Ok(locales)
    }

    async fn load_catalog(&self, locale: &str) -> Result<MessageCatalog, LocaleError> {
        self.catalogs
            .get(locale)
            .cloned()
            .ok_or_else(|| LocaleError::Configuration {
                key: locale.to_string(),
                dir: "<static>".to_string(),
            })
    }

    async fn load_locale_data(&self, lang: &str) -> Result<String, LocaleError> {
        self.locale_data
            .get(lang)
            .cloned()
            .ok_or_else(|| LocaleError::Configuration {
                key: lang.to_string(),
                dir: "<static>".to_string(),
            })
    }
}
