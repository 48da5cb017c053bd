//! Element names and canonical LDML element order

use std::cmp::Ordering;

/// Namespace of the vendor metadata carried in `special` blocks
pub const PALASO_NS: &str = "urn://palaso.org/ldmlExtensions/v1";
/// Prefix used when we declare the namespace ourselves
pub const PALASO_PREFIX: &str = "palaso";

pub const ABBREVIATION: &str = "abbreviation";
pub const DEFAULT_FONT_FAMILY: &str = "defaultFontFamily";
pub const DEFAULT_FONT_SIZE: &str = "defaultFontSize";
pub const DEFAULT_KEYBOARD: &str = "defaultKeyboard";
pub const IS_LEGACY_ENCODED: &str = "isLegacyEncoded";
pub const LANGUAGE_NAME: &str = "languageName";
pub const SORT_RULES_TYPE: &str = "sortRulesType";
pub const SPELL_CHECKING_ID: &str = "spellCheckingId";
pub const VERSION: &str = "version";

/// Sibling order from the LDML DTD. Names that share a parent keep their
/// relative DTD order, so one table serves every level we touch.
const ELEMENT_ORDER: &[&str] = &[
    "alias",
    "identity",
    "version",
    "generation",
    "language",
    "script",
    "territory",
    "variant",
    "localeDisplayNames",
    "layout",
    "orientation",
    "inList",
    "inText",
    "contextTransforms",
    "characters",
    "delimiters",
    "measurement",
    "dates",
    "numbers",
    "units",
    "listPatterns",
    "collations",
    "default",
    "collation",
    "base",
    "settings",
    "suppress_contractions",
    "optimize",
    "rules",
    "posix",
    "segmentations",
    "rbnf",
    "references",
    "special",
];

fn rank(name: &str) -> Option<usize> {
    ELEMENT_ORDER.iter().position(|n| *n == name)
}

/// Compare two sibling element names in canonical order. Unknown names sort
/// before every known one, so they are copied at the first anchor they meet.
pub fn compare_element_names(a: &str, b: &str) -> Ordering {
    match (rank(a), rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// True for the `type` of the collation a definition owns
pub fn is_standard_collation(collation_type: Option<&str>) -> bool {
    matches!(collation_type, None | Some("") | Some("standard"))
}
