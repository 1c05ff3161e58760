//! Locale resolution with process-wide resource caches.

use std::sync::Arc;

use crate::cache::SingleFlightCache;
use crate::catalog::MessageCatalog;
use crate::loader::{LocaleError, ResourceLoader};
use crate::negotiate::{LocaleHint, NegotiationStrategy};

/// The resolved locale context attached to a render request.
#[derive(Debug, Clone)]
pub struct LocaleContext {
    /// The negotiated locale code.
    pub locale: String,
    /// Message catalog for the locale.
    pub catalog: Arc<MessageCatalog>,
    /// Locale-formatting script for the locale's primary language.
    pub locale_data: Arc<String>,
}

impl LocaleContext {
    /// The primary language subtag of the locale.
    pub fn lang(&self) -> &str {
        primary_subtag(&self.locale)
    }
}

/// Resolves a locale for each request and caches its resources.
///
/// The supported set is discovered once at construction. Catalogs are
/// cached by full locale code; locale-data scripts by primary language
/// subtag. Both caches live for the process and are never evicted.
pub struct LocaleResolver {
    loader: Arc<dyn ResourceLoader>,
    strategy: Box<dyn NegotiationStrategy>,
    supported: Vec<String>,
    default_locale: String,
    catalogs: SingleFlightCache<MessageCatalog>,
    locale_data: SingleFlightCache<String>,
}

impl std::fmt::Debug for LocaleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleResolver")
            .field("supported", &self.supported)
            .field("default_locale", &self.default_locale)
            .finish_non_exhaustive()
    }
}

impl LocaleResolver {
    /// Discover supported locales and build a resolver.
    ///
    /// Fails if the default locale is not among the discovered set.
    pub async fn discover(
        loader: Arc<dyn ResourceLoader>,
        strategy: Box<dyn NegotiationStrategy>,
        default_locale: impl Into<String>,
    ) -> Result<Self, LocaleError> {
        let supported = loader.list_locales().await?;
        let default_locale = default_locale.into();

        if !supported.contains(&default_locale) {
            return Err(LocaleError::Configuration {
                key: default_locale,
                dir: "<supported locales>".to_string(),
            });
        }

        Ok(Self {
            loader,
            strategy,
            supported,
            default_locale,
            catalogs: SingleFlightCache::new(),
            locale_data: SingleFlightCache::new(),
        })
    }

    /// The discovered locale codes, sorted.
    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// Resolve the locale context for one request.
    ///
    /// Negotiation failures fall back to the default locale; a missing
    /// resource for a supported locale is a configuration error.
    pub async fn resolve(&self, hint: &LocaleHint) -> Result<LocaleContext, LocaleError> {
        let locale = self
            .strategy
            .negotiate(hint, &self.supported)
            .unwrap_or_else(|| self.default_locale.clone());
        let lang = primary_subtag(&locale).to_string();

        let catalog = self
            .catalogs
            .get_or_load(&locale, || self.loader.load_catalog(&locale))
            .await?;
        let locale_data = self
            .locale_data
            .get_or_load(&lang, || self.loader.load_locale_data(&lang))
            .await?;

        tracing::debug!(%locale, "locale resolved");
        Ok(LocaleContext {
            locale,
            catalog,
            locale_data,
        })
    }

    /// Whether a locale's catalog has been loaded already.
    pub fn is_catalog_cached(&self, locale: &str) -> bool {
        self.catalogs.is_populated(locale)
    }
}

fn primary_subtag(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}
