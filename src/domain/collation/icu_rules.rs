//! Parser and printer for ICU collation rule text
//!
//! Supported syntax: resets (`&x`, `&[before 1]x`, `&[first regular]`),
//! relations (`<`, `<<`, `<<<`, `<<<<`, `=`, the legacy `;` and `,`, and the
//! starred list forms such as `<*abc`), options in brackets (`[strength 2]`),
//! quoting with `'...'`, backslash escapes and `#` comments. Contexts (`|`)
//! and expansions (`/`) are rejected.

use crate::error::{Result, WsError};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Identical,
}

impl Strength {
    pub fn ldml_name(self) -> &'static str {
        match self {
            Strength::Primary => "primary",
            Strength::Secondary => "secondary",
            Strength::Tertiary => "tertiary",
            Strength::Quaternary => "quaternary",
            Strength::Identical => "identical",
        }
    }

    pub fn from_ldml_name(name: &str) -> Option<Self> {
        match name {
            "primary" => Some(Strength::Primary),
            "secondary" => Some(Strength::Secondary),
            "tertiary" => Some(Strength::Tertiary),
            "quaternary" => Some(Strength::Quaternary),
            "identical" => Some(Strength::Identical),
            _ => None,
        }
    }

    fn icu_value(self) -> &'static str {
        match self {
            Strength::Primary => "1",
            Strength::Secondary => "2",
            Strength::Tertiary => "3",
            Strength::Quaternary => "4",
            Strength::Identical => "I",
        }
    }

    fn from_icu_value(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Strength::Primary),
            "2" => Some(Strength::Secondary),
            "3" => Some(Strength::Tertiary),
            "4" => Some(Strength::Quaternary),
            "I" | "i" => Some(Strength::Identical),
            _ => None,
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Strength::Primary => "<",
            Strength::Secondary => "<<",
            Strength::Tertiary => "<<<",
            Strength::Quaternary => "<<<<",
            Strength::Identical => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternate {
    Shifted,
    NonIgnorable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFirst {
    Upper,
    Lower,
    Off,
}

/// A bracketed setting such as `[strength 2]` or `[caseFirst upper]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcuOption {
    Strength(Strength),
    Alternate(Alternate),
    Backwards(bool),
    CaseLevel(bool),
    CaseFirst(CaseFirst),
    Normalization(bool),
    HiraganaQ(bool),
    Numeric(bool),
}

fn on_off(value: &str) -> Option<bool> {
    match value {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn on_off_str(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

impl IcuOption {
    fn parse(content: &str) -> Result<Self> {
        let mut words = content.split_whitespace();
        let key = words.next().unwrap_or("");
        let value = words.collect::<Vec<_>>().join(" ");
        let invalid = || WsError::InvalidRules(format!("Invalid option value: [{}]", content));

        let option = match key {
            "strength" => IcuOption::Strength(Strength::from_icu_value(&value).ok_or_else(invalid)?),
            "alternate" => IcuOption::Alternate(match value.as_str() {
                "shifted" => Alternate::Shifted,
                "non-ignorable" => Alternate::NonIgnorable,
                _ => return Err(invalid()),
            }),
            "backwards" => match value.as_str() {
                "2" => IcuOption::Backwards(true),
                _ => return Err(invalid()),
            },
            "caseLevel" => IcuOption::CaseLevel(on_off(&value).ok_or_else(invalid)?),
            "caseFirst" => IcuOption::CaseFirst(match value.as_str() {
                "upper" => CaseFirst::Upper,
                "lower" => CaseFirst::Lower,
                "off" => CaseFirst::Off,
                _ => return Err(invalid()),
            }),
            "normalization" => IcuOption::Normalization(on_off(&value).ok_or_else(invalid)?),
            "hiraganaQ" => IcuOption::HiraganaQ(on_off(&value).ok_or_else(invalid)?),
            "numeric" => IcuOption::Numeric(on_off(&value).ok_or_else(invalid)?),
            _ => {
                return Err(WsError::InvalidRules(format!(
                    "Unknown option: [{}]",
                    content
                )))
            }
        };
        Ok(option)
    }

    fn to_rule_text(self) -> String {
        match self {
            IcuOption::Strength(s) => format!("[strength {}]", s.icu_value()),
            IcuOption::Alternate(Alternate::Shifted) => "[alternate shifted]".to_string(),
            IcuOption::Alternate(Alternate::NonIgnorable) => {
                "[alternate non-ignorable]".to_string()
            }
            IcuOption::Backwards(_) => "[backwards 2]".to_string(),
            IcuOption::CaseLevel(v) => format!("[caseLevel {}]", on_off_str(v)),
            IcuOption::CaseFirst(CaseFirst::Upper) => "[caseFirst upper]".to_string(),
            IcuOption::CaseFirst(CaseFirst::Lower) => "[caseFirst lower]".to_string(),
            IcuOption::CaseFirst(CaseFirst::Off) => "[caseFirst off]".to_string(),
            IcuOption::Normalization(v) => format!("[normalization {}]", on_off_str(v)),
            IcuOption::HiraganaQ(v) => format!("[hiraganaQ {}]", on_off_str(v)),
            IcuOption::Numeric(v) => format!("[numeric {}]", on_off_str(v)),
        }
    }
}

/// Logical positions a reset can refer to instead of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAnchor {
    FirstTertiaryIgnorable,
    LastTertiaryIgnorable,
    FirstSecondaryIgnorable,
    LastSecondaryIgnorable,
    FirstPrimaryIgnorable,
    LastPrimaryIgnorable,
    FirstVariable,
    LastVariable,
    FirstRegular,
    LastRegular,
    FirstTrailing,
    LastTrailing,
}

const ANCHORS: &[(SpecialAnchor, &str, &str)] = &[
    (SpecialAnchor::FirstTertiaryIgnorable, "first tertiary ignorable", "first_tertiary_ignorable"),
    (SpecialAnchor::LastTertiaryIgnorable, "last tertiary ignorable", "last_tertiary_ignorable"),
    (SpecialAnchor::FirstSecondaryIgnorable, "first secondary ignorable", "first_secondary_ignorable"),
    (SpecialAnchor::LastSecondaryIgnorable, "last secondary ignorable", "last_secondary_ignorable"),
    (SpecialAnchor::FirstPrimaryIgnorable, "first primary ignorable", "first_primary_ignorable"),
    (SpecialAnchor::LastPrimaryIgnorable, "last primary ignorable", "last_primary_ignorable"),
    (SpecialAnchor::FirstVariable, "first variable", "first_variable"),
    (SpecialAnchor::LastVariable, "last variable", "last_variable"),
    (SpecialAnchor::FirstRegular, "first regular", "first_non_ignorable"),
    (SpecialAnchor::LastRegular, "last regular", "last_non_ignorable"),
    (SpecialAnchor::FirstTrailing, "first trailing", "first_trailing"),
    (SpecialAnchor::LastTrailing, "last trailing", "last_trailing"),
];

impl SpecialAnchor {
    pub fn icu_name(self) -> &'static str {
        ANCHORS
            .iter()
            .find(|(a, _, _)| *a == self)
            .map(|(_, icu, _)| *icu)
            .unwrap_or_default()
    }

    /// Element name used inside an LDML `reset`
    pub fn ldml_name(self) -> &'static str {
        ANCHORS
            .iter()
            .find(|(a, _, _)| *a == self)
            .map(|(_, _, ldml)| *ldml)
            .unwrap_or_default()
    }

    pub fn from_icu_name(name: &str) -> Option<Self> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        ANCHORS.iter().find(|(_, icu, _)| *icu == name).map(|(a, _, _)| *a)
    }

    pub fn from_ldml_name(name: &str) -> Option<Self> {
        ANCHORS.iter().find(|(_, _, ldml)| *ldml == name).map(|(a, _, _)| *a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTarget {
    Text(String),
    Anchor(SpecialAnchor),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reset {
    pub before: Option<Strength>,
    pub target: ResetTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub strength: Strength,
    pub text: String,
    /// `<*abc` form: every character is its own relation
    pub star: bool,
}

impl Relation {
    /// The collation elements this relation places, in order
    pub fn elements(&self) -> Vec<String> {
        if self.star {
            self.text.chars().map(String::from).collect()
        } else {
            vec![self.text.clone()]
        }
    }
}

/// A reset followed by the relations anchored to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleChain {
    pub reset: Reset,
    pub relations: Vec<Relation>,
}

/// Parsed ICU rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcuRules {
    pub options: Vec<IcuOption>,
    pub chains: Vec<RuleChain>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Reset,
    Relation(Strength, bool),
    Bracket(String),
    Text(String),
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    tokens: Vec<Token>,
    text: Option<String>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            tokens: Vec::new(),
            text: None,
        }
    }

    fn flush(&mut self) {
        if let Some(text) = self.text.take() {
            self.tokens.push(Token::Text(text));
        }
    }

    fn literal(&mut self, c: char) {
        self.text.get_or_insert_with(String::new).push(c);
    }

    fn push(&mut self, token: Token) {
        self.flush();
        self.tokens.push(token);
    }

    fn star(&mut self) -> bool {
        if self.chars.peek() == Some(&'*') {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char> {
        let hex: String = (0..digits).filter_map(|_| self.chars.next()).collect();
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|_| hex.len() == digits)
            .and_then(char::from_u32)
            .ok_or_else(|| WsError::InvalidRules(format!("Invalid escape sequence: \\u{}", hex)))
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.chars.next() {
            match c {
                c if c.is_whitespace() => self.flush(),
                '#' => {
                    self.flush();
                    for c in self.chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                '&' => self.push(Token::Reset),
                '<' => {
                    let mut count = 1;
                    while count < 4 && self.chars.peek() == Some(&'<') {
                        self.chars.next();
                        count += 1;
                    }
                    let strength = match count {
                        1 => Strength::Primary,
                        2 => Strength::Secondary,
                        3 => Strength::Tertiary,
                        _ => Strength::Quaternary,
                    };
                    let star = self.star();
                    self.push(Token::Relation(strength, star));
                }
                ';' => self.push(Token::Relation(Strength::Secondary, false)),
                ',' => self.push(Token::Relation(Strength::Tertiary, false)),
                '=' => {
                    let star = self.star();
                    self.push(Token::Relation(Strength::Identical, star));
                }
                '[' => {
                    let mut depth = 1;
                    let mut content = String::new();
                    for c in self.chars.by_ref() {
                        match c {
                            '[' => depth += 1,
                            ']' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                        content.push(c);
                    }
                    if depth != 0 {
                        return Err(WsError::InvalidRules("Unterminated '['".to_string()));
                    }
                    self.push(Token::Bracket(content.trim().to_string()));
                }
                '\'' => {
                    if self.chars.peek() == Some(&'\'') {
                        self.chars.next();
                        self.literal('\'');
                        continue;
                    }
                    let mut closed = false;
                    while let Some(q) = self.chars.next() {
                        if q == '\'' {
                            if self.chars.peek() == Some(&'\'') {
                                self.chars.next();
                                self.literal('\'');
                            } else {
                                closed = true;
                                break;
                            }
                        } else {
                            self.literal(q);
                        }
                    }
                    if !closed {
                        return Err(WsError::InvalidRules("Unterminated quote".to_string()));
                    }
                }
                '\\' => match self.chars.next() {
                    Some('u') => {
                        let c = self.hex_escape(4)?;
                        self.literal(c);
                    }
                    Some('U') => {
                        let c = self.hex_escape(8)?;
                        self.literal(c);
                    }
                    Some(c) => self.literal(c),
                    None => {
                        return Err(WsError::InvalidRules(
                            "Rules end with a dangling '\\'".to_string(),
                        ))
                    }
                },
                '|' | '/' => {
                    return Err(WsError::InvalidRules(format!(
                        "'{}' contexts and expansions are not supported",
                        c
                    )))
                }
                ']' | '*' | '!' | '@' => {
                    return Err(WsError::InvalidRules(format!(
                        "Unexpected '{}'; quote it to use it as a character",
                        c
                    )))
                }
                c => self.literal(c),
            }
        }
        self.flush();
        Ok(self.tokens)
    }
}

fn parse_before(content: &str) -> Option<Strength> {
    let mut words = content.split_whitespace();
    if words.next() != Some("before") {
        return None;
    }
    match words.next() {
        Some("1") => Some(Strength::Primary),
        Some("2") => Some(Strength::Secondary),
        Some("3") => Some(Strength::Tertiary),
        _ => None,
    }
}

impl IcuRules {
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = Lexer::new(source).run()?;
        let mut rules = IcuRules::default();
        let mut tokens = tokens.into_iter().peekable();

        while let Some(token) = tokens.next() {
            match token {
                Token::Bracket(content) => rules.options.push(IcuOption::parse(&content)?),
                Token::Reset => {
                    let mut before = None;
                    if let Some(Token::Bracket(content)) = tokens.peek() {
                        if content.starts_with("before") {
                            before = Some(parse_before(content).ok_or_else(|| {
                                WsError::InvalidRules(format!("Invalid reset: [{}]", content))
                            })?);
                            tokens.next();
                        }
                    }
                    let target = match tokens.next() {
                        Some(Token::Text(text)) => ResetTarget::Text(text),
                        Some(Token::Bracket(content)) => ResetTarget::Anchor(
                            SpecialAnchor::from_icu_name(&content).ok_or_else(|| {
                                WsError::InvalidRules(format!(
                                    "Unknown reset position: [{}]",
                                    content
                                ))
                            })?,
                        ),
                        _ => {
                            return Err(WsError::InvalidRules(
                                "A reset '&' must be followed by a character or position"
                                    .to_string(),
                            ))
                        }
                    };
                    rules.chains.push(RuleChain {
                        reset: Reset { before, target },
                        relations: Vec::new(),
                    });
                }
                Token::Relation(strength, star) => {
                    let text = match tokens.next() {
                        Some(Token::Text(text)) => text,
                        _ => {
                            return Err(WsError::InvalidRules(format!(
                                "Relation '{}' has no characters after it",
                                strength.operator()
                            )))
                        }
                    };
                    let chain = rules.chains.last_mut().ok_or_else(|| {
                        WsError::InvalidRules(
                            "Rules must start with a reset '&' before any relation".to_string(),
                        )
                    })?;
                    chain.relations.push(Relation {
                        strength,
                        text,
                        star,
                    });
                }
                Token::Text(text) => {
                    return Err(WsError::InvalidRules(format!(
                        "Unexpected characters '{}' without a relation",
                        text
                    )))
                }
            }
        }
        Ok(rules)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.chains.is_empty()
    }

    /// Print the rules back as ICU text, one option or chain per line
    pub fn to_rule_text(&self) -> String {
        let mut lines: Vec<String> = self.options.iter().map(|o| o.to_rule_text()).collect();
        for chain in &self.chains {
            let mut line = String::from("&");
            if let Some(before) = chain.reset.before {
                let _ = write!(line, "[before {}]", before.icu_value());
            }
            match &chain.reset.target {
                ResetTarget::Text(text) => line.push_str(&quote(text)),
                ResetTarget::Anchor(anchor) => {
                    let _ = write!(line, "[{}]", anchor.icu_name());
                }
            }
            for relation in &chain.relations {
                let _ = write!(
                    line,
                    " {}{} {}",
                    relation.strength.operator(),
                    if relation.star { "*" } else { "" },
                    quote(&relation.text)
                );
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

/// Escape `text` so the lexer reads it back as a single literal
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\'' {
            out.push_str("''");
        } else if c.is_ascii_alphanumeric()
            || (!c.is_ascii() && !c.is_whitespace() && !c.is_control())
        {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Check ICU rule text, returning the parser's message on failure
pub fn validate(source: &str) -> Result<()> {
    IcuRules::parse(source).map(|_| ())
}
