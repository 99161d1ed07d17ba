//! Output languages and translated texts
//!
//! Drug models ship their own translations as [`Translatable`] maps. Texts
//! produced by the pipeline itself (warnings) come from a static table keyed by
//! [`TextKey`]. Both fall back to English when the requested language is missing.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, collections::HashMap, fmt};

/// Language of the generated report
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "en"),
            Language::French => write!(f, "fr"),
        }
    }
}

/// A text available in several languages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translatable(BTreeMap<Language, String>);

impl Translatable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the text for a language
    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.0.insert(language, text.into());
        self
    }

    /// Text in `language`, falling back to English
    pub fn get(&self, language: Language) -> Option<&str> {
        self.0
            .get(&language)
            .or_else(|| self.0.get(&Language::English))
            .map(String::as_str)
    }

    /// Whether a text exists in `language` or in English
    pub fn has_translation(&self, language: Language) -> bool {
        self.get(language).is_some()
    }
}

/// Keys of the texts generated by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    PopulationAbove,
    PopulationBelow,
    CovariateMissing,
    DoseBelowMinimum,
    DoseAboveMaximum,
}

lazy_static! {
    static ref TEXTS: HashMap<(TextKey, Language), &'static str> = {
        let mut m = HashMap::new();
        m.insert(
            (TextKey::PopulationAbove, Language::English),
            "{}% of the population is above this measure",
        );
        m.insert(
            (TextKey::PopulationAbove, Language::French),
            "{}% de la population est au-dessus de cette mesure",
        );
        m.insert(
            (TextKey::PopulationBelow, Language::English),
            "{}% of the population is below this measure",
        );
        m.insert(
            (TextKey::PopulationBelow, Language::French),
            "{}% de la population est en dessous de cette mesure",
        );
        m.insert(
            (TextKey::CovariateMissing, Language::English),
            "No value given, the default value is used: {}",
        );
        m.insert(
            (TextKey::CovariateMissing, Language::French),
            "Aucune valeur fournie, la valeur par défaut est utilisée : {}",
        );
        m.insert(
            (TextKey::DoseBelowMinimum, Language::English),
            "The dose is below the minimum recommended dose: {}",
        );
        m.insert(
            (TextKey::DoseBelowMinimum, Language::French),
            "La dose est inférieure à la dose minimale recommandée : {}",
        );
        m.insert(
            (TextKey::DoseAboveMaximum, Language::English),
            "The dose is above the maximum recommended dose: {}",
        );
        m.insert(
            (TextKey::DoseAboveMaximum, Language::French),
            "La dose est supérieure à la dose maximale recommandée : {}",
        );
        m
    };
}

/// Translate `key` into `language`, substituting `arg` for the placeholder
pub fn translate(key: TextKey, language: Language, arg: &str) -> String {
    let template = TEXTS
        .get(&(key, language))
        .or_else(|| TEXTS.get(&(key, Language::English)))
        .copied()
        .unwrap_or("{}");
    template.replacen("{}", arg, 1)
}
