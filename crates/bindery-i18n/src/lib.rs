#![forbid(unsafe_code)]

//! Localization of static property texts for Bindery.
//!
//! - [`catalog`]: text catalog keyed by `(owner type, property, aspect)` with
//!   a locale fallback chain.
//! - [`locale`]: the active locale shared by an application or session.

pub mod catalog;
pub mod locale;

pub use catalog::{Locale, LocaleTexts, PropertyTextKey, TextCatalog, short_type_name};
pub use locale::LocaleContext;

use std::rc::Rc;

/// Catalog plus the locale it should be read in.
///
/// This is what the declarative dispatch layer consults when it returns a
/// static string aspect.
#[derive(Clone, Debug)]
pub struct Localizer {
    catalog: Rc<TextCatalog>,
    locale: LocaleContext,
}

impl Localizer {
    #[must_use]
    pub fn new(catalog: Rc<TextCatalog>, locale: LocaleContext) -> Self {
        Self { catalog, locale }
    }

    /// Localized text for a property aspect, or `fallback` unchanged.
    #[must_use]
    pub fn localize(&self, owner_type: &str, property: &str, aspect: &str, fallback: &str) -> String {
        let key = PropertyTextKey::new(owner_type, property, aspect);
        let locale = self.locale.current_locale();
        self.catalog.localize(&locale, &key, fallback).to_owned()
    }

    #[must_use]
    pub fn locale(&self) -> &LocaleContext {
        &self.locale
    }
}
