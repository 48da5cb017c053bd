//! Seed values for new writing systems

/// Values copied into a fresh definition by `fill_with_defaults`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSeed {
    pub language: Option<&'static str>,
    pub script: &'static str,
    pub language_name: Option<&'static str>,
    pub abbreviation: Option<&'static str>,
}

const SEEDS: &[(&str, DefaultSeed)] = &[
    (
        "en-latn",
        DefaultSeed {
            language: Some("en"),
            script: "Latn",
            language_name: Some("English"),
            abbreviation: Some("eng"),
        },
    ),
    (
        "fr-latn",
        DefaultSeed {
            language: Some("fr"),
            script: "Latn",
            language_name: Some("French"),
            abbreviation: Some("fra"),
        },
    ),
    (
        "tpi-latn",
        DefaultSeed {
            language: Some("tpi"),
            script: "Latn",
            language_name: Some("Tok Pisin"),
            abbreviation: Some("tpi"),
        },
    ),
    (
        "ar-arab",
        DefaultSeed {
            language: Some("ar"),
            script: "Arab",
            language_name: Some("Arabic"),
            abbreviation: Some("ara"),
        },
    ),
    (
        "ru-cyrl",
        DefaultSeed {
            language: Some("ru"),
            script: "Cyrl",
            language_name: Some("Russian"),
            abbreviation: Some("rus"),
        },
    ),
];

const FALLBACK: DefaultSeed = DefaultSeed {
    language: None,
    script: "Latn",
    language_name: None,
    abbreviation: None,
};

/// Look up the seed for a short key such as `en-latn`. Unknown keys only
/// contribute the Latin script.
pub fn seed_for(key: &str) -> DefaultSeed {
    let key = key.trim().to_lowercase();
    SEEDS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, seed)| *seed)
        .unwrap_or(FALLBACK)
}

/// True when `key` names an entry of the seed table
pub fn has_seed(key: &str) -> bool {
    let key = key.trim().to_lowercase();
    SEEDS.iter().any(|(k, _)| *k == key)
}
