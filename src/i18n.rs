// src/i18n.rs

use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_LOCALE: &str = "en";

/// Locale -> nested key/value JSON, embedded at compile time from
/// `locales/*.json`. Lookup is by dot-path ("errors.not_found.inquiry") with
/// fallback to English, then to the key itself so a missing translation is
/// visible instead of crashing.
pub struct I18nStore {
    locales: HashMap<&'static str, Value>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut locales = HashMap::new();
        for (lang, raw) in [
            ("en", include_str!("../locales/en.json")),
            ("de", include_str!("../locales/de.json")),
            ("pt", include_str!("../locales/pt.json")),
            ("es", include_str!("../locales/es.json")),
        ] {
            let parsed: Value =
                serde_json::from_str(raw).unwrap_or_else(|e| panic!("locales/{lang}.json: {e}"));
            locales.insert(lang, parsed);
        }
        Self { locales }
    }

    pub fn translate(&self, locale: &str, key: &str) -> String {
        self.lookup(locale, key)
            .or_else(|| self.lookup(DEFAULT_LOCALE, key))
            .unwrap_or_else(|| key.to_string())
    }

    /// Same as [`translate`](Self::translate) but replaces `{name}`
    /// placeholders in the message.
    pub fn translate_with(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut message = self.translate(locale, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        let mut node = self.locales.get(locale)?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str().map(str::to_owned)
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_keys() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "errors.unauthorized"), "Unauthorized");
        assert_eq!(
            store.translate("de", "errors.unauthorized"),
            "Nicht autorisiert"
        );
    }

    #[test]
    fn falls_back_to_english_then_key() {
        let store = I18nStore::new();
        // Unknown locale -> English
        assert_eq!(store.translate("fr", "errors.unauthorized"), "Unauthorized");
        // Unknown key -> the key itself
        assert_eq!(store.translate("en", "errors.no_such_key"), "errors.no_such_key");
    }

    #[test]
    fn replaces_placeholders() {
        let store = I18nStore::new();
        let msg = store.translate_with(
            "en",
            "notifications.quote_ready.message",
            &[("no", "1042")],
        );
        assert!(msg.contains("1042"), "got: {msg}");
        assert!(!msg.contains("{no}"));
    }
}
