//! Token model for the sequence diagram language
//!
//! Tokens are plain values: a [`TokenKind`], an optional literal and the
//! position where the lexeme starts.

use serde::Serialize;
use std::fmt;

/// Kind of a lexical unit
///
/// Discriminants are grouped so that classification is a range check:
/// keywords live in `100..=114`, arrow and activation operators in
/// `200..=232`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum TokenKind {
    Identifier = 1,
    Text = 3,
    Colon = 4,
    Comma = 5,

    KwTitle = 100,
    KwParticipant = 101,
    KwAs = 102,
    KwNote = 103,
    KwOver = 104,
    KwLeft = 105,
    KwRight = 106,
    KwOf = 107,
    KwOpt = 108,
    KwAlt = 109,
    KwElse = 110,
    KwEnd = 111,
    KwActivate = 112,
    KwDeactivate = 113,
    KwDestroy = 114,

    /// `-`
    ArrowBody = 200,
    /// `--`
    ArrowBodyDotted = 201,
    /// `<`
    ArrowLeft = 210,
    /// `<<`
    ArrowLeftOpen = 211,
    /// `>`
    ArrowRight = 220,
    /// `>>`
    ArrowRightOpen = 221,
    /// `+` directly after a right arrowhead
    Activate = 230,
    /// `-` directly after a right arrowhead
    Deactivate = 231,
    /// `*`
    Create = 232,

    EndOfStream = 1000,
}

const MIN_KEYWORD: u16 = TokenKind::KwTitle as u16;
const MAX_KEYWORD: u16 = TokenKind::KwDestroy as u16;
const MIN_OPERATOR: u16 = TokenKind::ArrowBody as u16;
const MAX_OPERATOR: u16 = TokenKind::Create as u16;

/// Keyword table, in discriminant order
pub const KEYWORDS: [(&str, TokenKind); 15] = [
    ("title", TokenKind::KwTitle),
    ("participant", TokenKind::KwParticipant),
    ("as", TokenKind::KwAs),
    ("note", TokenKind::KwNote),
    ("over", TokenKind::KwOver),
    ("left", TokenKind::KwLeft),
    ("right", TokenKind::KwRight),
    ("of", TokenKind::KwOf),
    ("opt", TokenKind::KwOpt),
    ("alt", TokenKind::KwAlt),
    ("else", TokenKind::KwElse),
    ("end", TokenKind::KwEnd),
    ("activate", TokenKind::KwActivate),
    ("deactivate", TokenKind::KwDeactivate),
    ("destroy", TokenKind::KwDestroy),
];

impl TokenKind {
    /// Look up a keyword by its exact (case-sensitive) spelling
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(literal, _)| *literal == ident)
            .map(|(_, kind)| *kind)
    }

    pub fn is_keyword(self) -> bool {
        (MIN_KEYWORD..=MAX_KEYWORD).contains(&(self as u16))
    }

    pub fn is_operator(self) -> bool {
        (MIN_OPERATOR..=MAX_OPERATOR).contains(&(self as u16))
    }

    /// Right arrowheads make the following position eligible for `+`/`-`
    pub fn is_arrow_right(self) -> bool {
        matches!(self, TokenKind::ArrowRight | TokenKind::ArrowRightOpen)
    }

    /// Keywords whose line continues as free text on following lines
    pub fn starts_multiline_text(self) -> bool {
        matches!(self, TokenKind::KwNote)
    }

    /// Keywords whose remaining line is free text
    pub fn starts_inline_text(self) -> bool {
        matches!(self, TokenKind::KwTitle)
    }

    /// Stable human-readable name, used in grammar error messages
    pub fn name(self) -> &'static str {
        if self.is_keyword() {
            return KEYWORDS
                .iter()
                .find(|(_, kind)| *kind == self)
                .map(|(literal, _)| *literal)
                .unwrap_or("keyword");
        }
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Text => "text",
            TokenKind::Colon => "colon",
            TokenKind::Comma => "comma",
            TokenKind::ArrowBody => "arrowbody",
            TokenKind::ArrowBodyDotted => "arrowbodydotted",
            TokenKind::ArrowLeft => "arrowleft",
            TokenKind::ArrowLeftOpen => "arrowleftopen",
            TokenKind::ArrowRight => "arrowright",
            TokenKind::ArrowRightOpen => "arrowrightopen",
            TokenKind::Activate => "activate",
            TokenKind::Deactivate => "deactivate",
            TokenKind::Create => "create",
            TokenKind::EndOfStream => "end of stream",
            _ => "keyword",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Start of a lexeme in the source, 1-based line and column (in characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A lexical unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<String>,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self {
            kind,
            value: None,
            position,
        }
    }

    pub fn with_value(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            position,
        }
    }

    pub fn end_of_stream(position: Position) -> Self {
        Self::new(TokenKind::EndOfStream, position)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.kind == TokenKind::EndOfStream
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({})", self.kind, value),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_is_case_sensitive() {
        assert_eq!(TokenKind::keyword("alt"), Some(TokenKind::KwAlt));
        assert_eq!(TokenKind::keyword("Alt"), None);
        assert_eq!(TokenKind::keyword("alternative"), None);
    }

    #[test]
    fn test_keyword_range_covers_table() {
        for (literal, kind) in KEYWORDS {
            assert!(kind.is_keyword(), "{literal} should be a keyword");
            assert!(!kind.is_operator());
            assert_eq!(kind.name(), literal);
        }
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(!TokenKind::ArrowBody.is_keyword());
        assert!(!TokenKind::EndOfStream.is_keyword());
    }

    #[test]
    fn test_operator_range() {
        assert!(TokenKind::ArrowLeftOpen.is_operator());
        assert!(TokenKind::Create.is_operator());
        assert!(!TokenKind::Colon.is_operator());
    }

    #[test]
    fn test_arrow_right_predicate() {
        assert!(TokenKind::ArrowRight.is_arrow_right());
        assert!(TokenKind::ArrowRightOpen.is_arrow_right());
        assert!(!TokenKind::ArrowLeft.is_arrow_right());
    }

    #[test]
    fn test_only_title_starts_inline_text() {
        assert!(TokenKind::KwTitle.starts_inline_text());
        assert!(!TokenKind::KwOpt.starts_inline_text());
        assert!(!TokenKind::KwAlt.starts_inline_text());
        assert!(!TokenKind::KwElse.starts_inline_text());
    }

    #[test]
    fn test_display() {
        let token = Token::with_value(TokenKind::Identifier, "Alice", Position::new(1, 1));
        assert_eq!(token.to_string(), "identifier(Alice)");
        let token = Token::new(TokenKind::ArrowRightOpen, Position::new(1, 4));
        assert_eq!(token.to_string(), "arrowrightopen");
        assert_eq!(Position::new(3, 7).to_string(), "line 3, column 7");
    }
}
