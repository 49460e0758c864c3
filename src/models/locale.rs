use serde::{Deserialize, Serialize};

/// Display languages supported by the catalog. English is the mandatory
/// fallback for every localized field.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "fr")]
    Fr,
    #[serde(rename = "es")]
    Es,
}

impl Lang {
    /// Lenient parse for query parameters and stored booking records.
    /// Unknown codes fall back to English rather than erroring.
    pub fn from_code(code: &str) -> Lang {
        match code.trim().to_lowercase().as_str() {
            "fr" => Lang::Fr,
            "es" => Lang::Es,
            _ => Lang::En,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Fr => "fr",
            Lang::Es => "es",
        }
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::En
    }
}

/// A text field stored once per supported language. Documents are written
/// with at least the `en` entry; the others may be absent or empty.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LocalizedText {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es: Option<String>,
}

impl LocalizedText {
    /// Best available string for the requested language: the requested
    /// entry when present and non-empty, otherwise `en`, otherwise "".
    /// Pure and infallible so it can run on every field of every response.
    pub fn resolve(&self, lang: Lang) -> &str {
        let requested = match lang {
            Lang::En => Some(&self.en),
            Lang::Fr => self.fr.as_ref(),
            Lang::Es => self.es.as_ref(),
        };

        match requested {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                if self.en.trim().is_empty() {
                    ""
                } else {
                    &self.en
                }
            }
        }
    }

    /// Write-side validation: the English entry is required everywhere.
    pub fn has_english(&self) -> bool {
        !self.en.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(en: &str, fr: Option<&str>, es: Option<&str>) -> LocalizedText {
        LocalizedText {
            en: en.to_string(),
            fr: fr.map(String::from),
            es: es.map(String::from),
        }
    }

    #[test]
    fn resolve_prefers_requested_language() {
        let f = field("Desert", Some("Désert"), Some("Desierto"));
        assert_eq!(f.resolve(Lang::Fr), "Désert");
        assert_eq!(f.resolve(Lang::Es), "Desierto");
        assert_eq!(f.resolve(Lang::En), "Desert");
    }

    #[test]
    fn resolve_falls_back_to_english_when_missing_or_empty() {
        let f = field("Desert", Some(""), None);
        assert_eq!(f.resolve(Lang::Fr), "Desert");
        assert_eq!(f.resolve(Lang::Es), "Desert");

        let blank = field("   ", Some("  "), None);
        assert_eq!(blank.resolve(Lang::Fr), "");
        assert_eq!(blank.resolve(Lang::En), "");
    }

    #[test]
    fn lang_parsing_is_lenient() {
        assert_eq!(Lang::from_code("FR"), Lang::Fr);
        assert_eq!(Lang::from_code(" es "), Lang::Es);
        assert_eq!(Lang::from_code("de"), Lang::En);
        assert_eq!(Lang::from_code(""), Lang::En);
    }

    #[test]
    fn lang_codes_round_trip() {
        for lang in [Lang::En, Lang::Fr, Lang::Es] {
            assert_eq!(Lang::from_code(lang.as_code()), lang);
        }
    }
}
