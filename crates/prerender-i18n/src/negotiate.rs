//! Locale negotiation strategies.

/// Request attributes negotiation can draw on.
#[derive(Debug, Clone, Default)]
pub struct LocaleHint {
    /// Raw Accept-Language header value, if the request carried one.
    pub accept_language: Option<String>,
}

impl LocaleHint {
    /// A hint with no attributes.
    pub fn none() -> Self {
        Self::default()
    }

    /// A hint from an Accept-Language header value.
    pub fn accept_language(value: impl Into<String>) -> Self {
        Self {
            accept_language: Some(value.into()),
        }
    }
}

/// Pluggable policy for choosing a locale from the supported set.
pub trait NegotiationStrategy: Send + Sync {
    /// Pick a supported locale for the request, or `None` to defer to the
    /// resolver's default.
    fn negotiate(&self, hint: &LocaleHint, supported: &[String]) -> Option<String>;
}

/// Always selects the configured locale when it is supported.
#[derive(Debug, Clone)]
pub struct FixedLocale(pub String);

impl NegotiationStrategy for FixedLocale {
    fn negotiate(&self, _hint: &LocaleHint, supported: &[String]) -> Option<String> {
        supported.iter().find(|l| **l == self.0).cloned()
    }
}

/// Matches the request's Accept-Language list against the supported set.
///
/// Entries are ranked by their q-values; an exact (case-insensitive) tag
/// match wins, then a primary-subtag match, then `*` falls back to the
/// first supported locale.
#[derive(Debug, Clone, Default)]
pub struct AcceptLanguage;

impl NegotiationStrategy for AcceptLanguage {
    fn negotiate(&self, hint: &LocaleHint, supported: &[String]) -> Option<String> {
        let header = hint.accept_language.as_deref()?;

        let mut ranked: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|entry| {
                let entry = entry.trim();
                if entry.is_empty() {
                    return None;
                }
                let mut parts = entry.split(';');
                let tag = parts.next()?.trim().to_string();
                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q=").map(str::to_string))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((tag, quality))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (tag, _) in &ranked {
            if tag == "*" {
                return supported.first().cloned();
            }
            if let Some(exact) = supported.iter().find(|l| l.eq_ignore_ascii_case(tag)) {
                return Some(exact.clone());
            }
            let primary = tag.split('-').next().unwrap_or(tag);
            if let Some(by_lang) = supported.iter().find(|l| {
                l.split('-')
                    .next()
                    .map(|p| p.eq_ignore_ascii_case(primary))
                    .unwrap_or(false)
            }) {
                return Some(by_lang.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<String> {
        vec!["en".to_string(), "es".to_string()]
    }

    #[test]
    fn test_fixed_locale() {
        let strategy = FixedLocale("es".to_string());
        assert_eq!(
            strategy.negotiate(&LocaleHint::none(), &supported()),
            Some("es".to_string())
        );

        let unsupported = FixedLocale("fr".to_string());
        assert_eq!(unsupported.negotiate(&LocaleHint::none(), &supported()), None);
    }

    #[test]
    fn test_accept_language_exact_match() {
        let hint = LocaleHint::accept_language("es,en;q=0.8");
        assert_eq!(
            AcceptLanguage.negotiate(&hint, &supported()),
            Some("es".to_string())
        );
    }

    #[test]
    fn test_accept_language_respects_quality() {
        let hint = LocaleHint::accept_language("es;q=0.5,en;q=0.9");
        assert_eq!(
            AcceptLanguage.negotiate(&hint, &supported()),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_accept_language_primary_subtag_fallback() {
        let hint = LocaleHint::accept_language("es-MX");
        assert_eq!(
            AcceptLanguage.negotiate(&hint, &supported()),
            Some("es".to_string())
        );
    }

    #[test]
    fn test_accept_language_wildcard() {
        let hint = LocaleHint::accept_language("fr;q=0.9,*;q=0.1");
        assert_eq!(
            AcceptLanguage.negotiate(&hint, &supported()),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_accept_language_no_match() {
        let hint = LocaleHint::accept_language("fr,de");
        assert_eq!(AcceptLanguage.negotiate(&hint, &supported()), None);
    }

    #[test]
    fn test_no_header_defers() {
        assert_eq!(AcceptLanguage.negotiate(&LocaleHint::none(), &supported()), None);
    }
}
