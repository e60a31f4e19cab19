// i18n/mod.rs
//
// Bilingual UI strings. Tables are embedded JSON trees addressed by dotted
// keys ("ui.labels.follow"); French falls back to English per key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{OrreryError, OrreryResult};

const EN_TABLE: &str = include_str!("../../locales/en.json");
const FR_TABLE: &str = include_str!("../../locales/fr.json");

/// Narrow no-break space, the French thousands separator.
const FR_GROUP_SEPARATOR: &str = "\u{202f}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Fr];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

impl FromStr for Locale {
    type Err = OrreryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(OrreryError::UnknownLocale(other.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Walk a dotted key through nested objects.
fn lookup<'a>(table: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(table, |node, segment| node.get(segment))
}

/// Replace `{name}` placeholders whose name is a word (`[A-Za-z0-9_]+`) and
/// has a value in `params`. Anything else is copied verbatim.
fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let value = if name_len > 0 && after[name_len..].starts_with('}') {
            let name = &after[..name_len];
            params.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
        } else {
            None
        };
        match value {
            Some(v) => {
                out.push_str(v);
                rest = &after[name_len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Translation lookup with a current locale.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    en: Value,
    fr: Value,
}

impl Translator {
    /// Translator over the tables shipped with the crate.
    pub fn embedded() -> OrreryResult<Self> {
        Ok(Self::from_tables(serde_json::from_str(EN_TABLE)?, serde_json::from_str(FR_TABLE)?))
    }

    pub fn from_tables(en: Value, fr: Value) -> Self {
        Self {
            locale: Locale::En,
            en,
            fr,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Switch by language code. Unknown codes leave the locale unchanged.
    pub fn set_language(&mut self, code: &str) -> bool {
        match code.parse() {
            Ok(locale) => {
                self.locale = locale;
                true
            }
            Err(_) => false,
        }
    }

    fn table(&self, locale: Locale) -> &Value {
        match locale {
            Locale::En => &self.en,
            Locale::Fr => &self.fr,
        }
    }

    /// Resolve `key` in the current locale, falling back to English, then to
    /// the key itself. Placeholders are filled from `params`.
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let found = lookup(self.table(self.locale), key).or_else(|| lookup(&self.en, key));
        match found.and_then(Value::as_str) {
            Some(text) if !text.is_empty() => {
                if params.is_empty() {
                    text.to_string()
                } else {
                    interpolate(text, params)
                }
            }
            _ => {
                if found.is_none() {
                    log::warn!("translation key \"{}\" not found in {} or en", key, self.locale);
                }
                key.to_string()
            }
        }
    }

    /// Fixed-decimal number with locale separators
    /// (en `1,234.5`, fr `1 234,5`).
    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let (group, point) = match self.locale {
            Locale::En => (",", "."),
            Locale::Fr => (FR_GROUP_SEPARATOR, ","),
        };

        let digits = format!("{:.*}", decimals, value.abs());
        let (int, frac) = match digits.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (digits.as_str(), None),
        };

        let mut out = String::with_capacity(digits.len() + int.len() / 3 * group.len() + 1);
        if value < 0.0 && digits.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
            out.push('-');
        }
        for (i, ch) in int.chars().enumerate() {
            if i > 0 && (int.len() - i) % 3 == 0 {
                out.push_str(group);
            }
            out.push(ch);
        }
        if let Some(frac) = frac {
            out.push_str(point);
            out.push_str(frac);
        }
        out
    }

    /// Whole number of `unit`s, e.g. "165 years". `years` and `days` are
    /// translated; other units are printed as given.
    pub fn format_time_period(&self, value: f64, unit: &str) -> String {
        let rounded = (value + 0.5).floor();
        let label = match unit {
            "years" => self.t("units.years", &[]),
            "days" => self.t("units.days", &[]),
            other => other.to_string(),
        };
        format!("{} {}", self.format_number(rounded, 0), label)
    }

    /// Label for the speed slider.
    pub fn speed_label(&self, speed: f64) -> String {
        if speed == 0.0 {
            self.t("ui.labels.realearthtime", &[])
        } else if speed < 1.0 {
            format!("{:.1}{}", speed, self.t("ui.labels.slowearthtime", &[]))
        } else {
            format!("{:.1}{}", speed, self.t("ui.labels.fastearthtime", &[]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn embedded() -> Translator {
        Translator::embedded().unwrap()
    }

    #[test]
    fn embedded_tables_parse() {
        let tr = embedded();
        assert_eq!(tr.locale(), Locale::En);
        assert_eq!(tr.t("units.years", &[]), "years");
    }

    #[test]
    fn french_lookup() {
        let mut tr = embedded();
        assert!(tr.set_language("fr"));
        assert_eq!(tr.t("units.years", &[]), "années");
        assert_eq!(tr.t("ui.labels.follow", &[]), "Suivre");
    }

    #[test]
    fn unknown_language_is_refused() {
        let mut tr = embedded();
        assert!(!tr.set_language("de"));
        assert_eq!(tr.locale(), Locale::En);
        assert!(matches!("de".parse::<Locale>(), Err(OrreryError::UnknownLocale(_))));
    }

    #[test]
    fn missing_key_returns_key() {
        let tr = embedded();
        assert_eq!(tr.t("ui.nonexistent.key", &[]), "ui.nonexistent.key");
    }

    #[test]
    fn interpolates_params() {
        let mut tr = embedded();
        assert_eq!(tr.t("messages.nowFollowing", &[("planet", "Mars")]), "Now following Mars");
        tr.set_locale(Locale::Fr);
        assert_eq!(
            tr.t("messages.nowFollowing", &[("planet", "Mars")]),
            "Maintenant en train de suivre Mars"
        );
    }

    #[test]
    fn missing_param_leaves_placeholder() {
        let tr = embedded();
        assert_eq!(tr.t("messages.nowFollowing", &[("other", "x")]), "Now following {planet}");
    }

    #[test]
    fn per_key_fallback_to_english() {
        let en = json!({ "a": { "b": "english b", "c": "english c" } });
        let fr = json!({ "a": { "b": "b français" } });
        let mut tr = Translator::from_tables(en, fr);
        tr.set_locale(Locale::Fr);
        assert_eq!(tr.t("a.b", &[]), "b français");
        assert_eq!(tr.t("a.c", &[]), "english c");
        assert_eq!(tr.t("a.d", &[]), "a.d");
    }

    #[test]
    fn non_string_or_empty_yields_key() {
        let en = json!({ "group": { "x": "1" }, "blank": "" });
        let tr = Translator::from_tables(en, json!({}));
        assert_eq!(tr.t("group", &[]), "group");
        assert_eq!(tr.t("blank", &[]), "blank");
    }

    #[test]
    fn interpolation_edge_cases() {
        assert_eq!(interpolate("{a}-{a}", &[("a", "x")]), "x-x");
        assert_eq!(interpolate("{not a word}", &[("not", "x")]), "{not a word}");
        assert_eq!(interpolate("{}{", &[]), "{}{");
        assert_eq!(interpolate("{{a}}", &[("a", "x")]), "{x}");
        assert_eq!(interpolate("tail {a", &[("a", "x")]), "tail {a");
    }

    #[test]
    fn number_formatting() {
        let mut tr = embedded();
        assert_eq!(tr.format_number(1234567.0, 0), "1,234,567");
        assert_eq!(tr.format_number(1234.5, 1), "1,234.5");
        assert_eq!(tr.format_number(-999.0, 0), "-999");
        assert_eq!(tr.format_number(-0.01, 1), "0.0");
        tr.set_locale(Locale::Fr);
        assert_eq!(tr.format_number(1234.5, 1), "1\u{202f}234,5");
        assert_eq!(tr.format_number(12.0, 2), "12,00");
    }

    #[test]
    fn time_periods() {
        let mut tr = embedded();
        assert_eq!(tr.format_time_period(164.79, "years"), "165 years");
        assert_eq!(tr.format_time_period(2.5, "hours"), "3 hours");
        tr.set_locale(Locale::Fr);
        assert_eq!(tr.format_time_period(1200.0, "days"), "1\u{202f}200 jours");
    }

    #[test]
    fn speed_labels() {
        let mut tr = embedded();
        assert_eq!(tr.speed_label(0.0), "0x Real Earth Time");
        assert_eq!(tr.speed_label(0.4), "0.4x Slow");
        assert_eq!(tr.speed_label(2.0), "2.0x Fast");
        tr.set_locale(Locale::Fr);
        assert_eq!(tr.speed_label(5.5), "5.5x Rapide");
    }
}
