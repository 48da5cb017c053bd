//! Lookup tables for language, script and region subtags
//!
//! The tables are built once on first use and never mutated afterwards, so they
//! can be shared freely between definitions.

use std::collections::HashMap;
use std::sync::OnceLock;

/// An ISO 639 language entry. `code` is the shortest registered code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageCode {
    pub code: &'static str,
    pub iso639_3: &'static str,
    pub name: &'static str,
}

/// An ISO 15924 script entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptCode {
    pub code: &'static str,
    pub label: &'static str,
}

/// An ISO 3166 region entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionCode {
    pub code: &'static str,
    pub description: &'static str,
}

const LANGUAGES: &[(&str, &str, &str)] = &[
    ("aa", "aar", "Afar"),
    ("am", "amh", "Amharic"),
    ("ar", "ara", "Arabic"),
    ("bn", "ben", "Bengali"),
    ("cs", "ces", "Czech"),
    ("da", "dan", "Danish"),
    ("de", "deu", "German"),
    ("el", "ell", "Greek"),
    ("en", "eng", "English"),
    ("es", "spa", "Spanish"),
    ("fa", "fas", "Persian"),
    ("fi", "fin", "Finnish"),
    ("fr", "fra", "French"),
    ("ha", "hau", "Hausa"),
    ("he", "heb", "Hebrew"),
    ("hi", "hin", "Hindi"),
    ("hu", "hun", "Hungarian"),
    ("id", "ind", "Indonesian"),
    ("it", "ita", "Italian"),
    ("ja", "jpn", "Japanese"),
    ("km", "khm", "Khmer"),
    ("ko", "kor", "Korean"),
    ("lo", "lao", "Lao"),
    ("ms", "msa", "Malay"),
    ("my", "mya", "Burmese"),
    ("ne", "nep", "Nepali"),
    ("nl", "nld", "Dutch"),
    ("pl", "pol", "Polish"),
    ("pt", "por", "Portuguese"),
    ("ro", "ron", "Romanian"),
    ("ru", "rus", "Russian"),
    ("sv", "swe", "Swedish"),
    ("sw", "swa", "Swahili"),
    ("ta", "tam", "Tamil"),
    ("th", "tha", "Thai"),
    ("tpi", "tpi", "Tok Pisin"),
    ("tr", "tur", "Turkish"),
    ("uk", "ukr", "Ukrainian"),
    ("ur", "urd", "Urdu"),
    ("vi", "vie", "Vietnamese"),
    ("xh", "xho", "Xhosa"),
    ("yo", "yor", "Yoruba"),
    ("zh", "zho", "Chinese"),
    ("zu", "zul", "Zulu"),
    ("qaa", "qaa", "Language Not Listed"),
];

const SCRIPTS: &[(&str, &str)] = &[
    ("Arab", "Arabic"),
    ("Armn", "Armenian"),
    ("Beng", "Bengali"),
    ("Cyrl", "Cyrillic"),
    ("Deva", "Devanagari"),
    ("Ethi", "Ethiopic"),
    ("Geor", "Georgian"),
    ("Grek", "Greek"),
    ("Hang", "Hangul"),
    ("Hans", "Han (Simplified variant)"),
    ("Hant", "Han (Traditional variant)"),
    ("Hebr", "Hebrew"),
    ("Jpan", "Japanese"),
    ("Khmr", "Khmer"),
    ("Laoo", "Lao"),
    ("Latn", "Latin"),
    ("Mymr", "Myanmar"),
    ("Taml", "Tamil"),
    ("Thai", "Thai"),
    ("Zxxx", "Code for unwritten documents"),
    ("Zyyy", "Code for undetermined script"),
];

const REGIONS: &[(&str, &str)] = &[
    ("AU", "Australia"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CN", "China"),
    ("DE", "Germany"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("ET", "Ethiopia"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("ID", "Indonesia"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("JP", "Japan"),
    ("KE", "Kenya"),
    ("KH", "Cambodia"),
    ("MX", "Mexico"),
    ("NG", "Nigeria"),
    ("PG", "Papua New Guinea"),
    ("PT", "Portugal"),
    ("RU", "Russian Federation"),
    ("TH", "Thailand"),
    ("TZ", "Tanzania"),
    ("US", "United States"),
    ("ZA", "South Africa"),
    ("419", "Latin America and the Caribbean"),
];

struct Tables {
    languages: Vec<LanguageCode>,
    by_code: HashMap<&'static str, usize>,
    scripts: Vec<ScriptCode>,
    regions: Vec<RegionCode>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let languages: Vec<LanguageCode> = LANGUAGES
            .iter()
            .map(|&(code, iso639_3, name)| LanguageCode {
                code,
                iso639_3,
                name,
            })
            .collect();
        let mut by_code = HashMap::new();
        for (i, lang) in languages.iter().enumerate() {
            by_code.insert(lang.code, i);
            by_code.entry(lang.iso639_3).or_insert(i);
        }
        Tables {
            languages,
            by_code,
            scripts: SCRIPTS
                .iter()
                .map(|&(code, label)| ScriptCode { code, label })
                .collect(),
            regions: REGIONS
                .iter()
                .map(|&(code, description)| RegionCode { code, description })
                .collect(),
        }
    })
}

pub fn languages() -> &'static [LanguageCode] {
    &tables().languages
}

pub fn scripts() -> &'static [ScriptCode] {
    &tables().scripts
}

pub fn regions() -> &'static [RegionCode] {
    &tables().regions
}

/// Find a language by its short or three-letter code (case-insensitive)
pub fn find_language(code: &str) -> Option<&'static LanguageCode> {
    let t = tables();
    t.by_code
        .get(code.to_ascii_lowercase().as_str())
        .map(|&i| &t.languages[i])
}

pub fn find_script(code: &str) -> Option<&'static ScriptCode> {
    scripts()
        .iter()
        .find(|s| s.code.eq_ignore_ascii_case(code))
}

pub fn find_region(code: &str) -> Option<&'static RegionCode> {
    regions()
        .iter()
        .find(|r| r.code.eq_ignore_ascii_case(code))
}
