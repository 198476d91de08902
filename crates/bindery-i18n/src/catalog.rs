//! Text catalog with locale fallback for property captions and labels.
//!
//! Static string aspects (captions, tooltips, button labels) are written in
//! the source language of the view model. The catalog lets an application
//! replace them per locale without touching the model: every text is keyed by
//! the owning view-model type, the property and the aspect name.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: every lookup walks the chain exactly
//!    once, returning `None` if no locale provides the key.
//!
//! 2. **Fallback text is authoritative**: [`TextCatalog::localize`] returns
//!    the caller's fallback text unchanged when no locale provides the key.
//!
//! 3. **Thread safety**: `TextCatalog` is `Send + Sync` (all data is
//!    immutable after construction).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any locale | Fallback text returned |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Empty catalog | No locales loaded | All lookups fall back |

use std::collections::HashMap;
use std::fmt;

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"de"`).
pub type Locale = String;

/// Key of one localizable property text.
///
/// The canonical key format is `Owner_property_aspect`, e.g.
/// `PersonPmo_name_caption`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyTextKey<'a> {
    /// Short type name of the view model owning the property.
    pub owner_type: &'a str,
    /// Property name as bound.
    pub property: &'a str,
    /// Aspect name (`caption`, `tooltip`, ...).
    pub aspect: &'a str,
}

impl<'a> PropertyTextKey<'a> {
    /// Create a new key.
    #[must_use]
    pub fn new(owner_type: &'a str, property: &'a str, aspect: &'a str) -> Self {
        Self {
            owner_type: short_type_name(owner_type),
            property,
            aspect,
        }
    }

    /// Canonical string representation used by the catalog.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}_{}_{}", self.owner_type, self.property, self.aspect)
    }
}

impl fmt::Display for PropertyTextKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.owner_type, self.property, self.aspect)
    }
}

/// Strip the module path from a fully qualified type name.
///
/// `my_app::pmo::PersonPmo` becomes `PersonPmo`; generic arguments are kept.
#[must_use]
pub fn short_type_name(type_name: &str) -> &str {
    let base_end = type_name.find('<').unwrap_or(type_name.len());
    match type_name[..base_end].rfind("::") {
        Some(idx) => &type_name[idx + 2..],
        None => type_name,
    }
}

/// Texts for a single locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleTexts {
    texts: HashMap<String, String>,
}

impl LocaleTexts {
    /// Create an empty locale text set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text under a raw key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.texts.insert(key.into(), value.into());
    }

    /// Insert a text for a property aspect.
    pub fn insert_property(&mut self, key: &PropertyTextKey<'_>, value: impl Into<String>) {
        self.texts.insert(key.canonical(), value.into());
    }

    /// Look up a text by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the locale has no texts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Central text catalog with locale fallback.
///
/// # Example
///
/// ```
/// use bindery_i18n::catalog::{LocaleTexts, PropertyTextKey, TextCatalog};
///
/// let key = PropertyTextKey::new("PersonPmo", "name", "caption");
///
/// let mut de = LocaleTexts::new();
/// de.insert_property(&key, "Name (de)");
///
/// let mut catalog = TextCatalog::new();
/// catalog.add_locale("de", de);
/// catalog.set_fallback_chain(vec!["en".into()]);
///
/// assert_eq!(catalog.localize("de", &key, "Name"), "Name (de)");
/// assert_eq!(catalog.localize("fr", &key, "Name"), "Name");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextCatalog {
    locales: HashMap<Locale, LocaleTexts>,
    fallback_chain: Vec<Locale>,
}

impl TextCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add texts for a locale, replacing any previous set.
    pub fn add_locale(&mut self, locale: impl Into<String>, texts: LocaleTexts) {
        self.locales.insert(locale.into(), texts);
    }

    /// Set the fallback chain (tried in order when a key is missing).
    ///
    /// Example: `["de-CH", "de", "en"]`: try Swiss German, then generic
    /// German, then English.
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// Look up a text by raw key.
    ///
    /// Tries the specified locale, then its language-only prefix
    /// (`de-CH` → `de`), then walks the fallback chain.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        if let Some(text) = self.locales.get(locale).and_then(|lt| lt.get(key)) {
            return Some(text);
        }

        if let Some((language, _)) = locale.split_once('-')
            && let Some(text) = self.locales.get(language).and_then(|lt| lt.get(key))
        {
            return Some(text);
        }

        for fallback in &self.fallback_chain {
            if fallback == locale {
                continue; // Already tried
            }
            if let Some(text) = self
                .locales
                .get(fallback.as_str())
                .and_then(|lt| lt.get(key))
            {
                return Some(text);
            }
        }

        None
    }

    /// Localize a property text, returning `fallback` unchanged when no
    /// locale provides an override.
    #[must_use]
    pub fn localize<'a>(
        &'a self,
        locale: &str,
        key: &PropertyTextKey<'_>,
        fallback: &'a str,
    ) -> &'a str {
        self.get(locale, &key.canonical()).unwrap_or(fallback)
    }

    /// All registered locale tags.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }
}
