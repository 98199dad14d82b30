//! Core error types for diagram processing
//!
//! The front end knows exactly two failure modes: the lexer rejects a
//! character, or the parser rejects a token. Both stop their stage on the
//! spot and surface as a single [`DiagramError`].

use thiserror::Error;

use crate::sequence::Token;

/// Core error types for diagram processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    #[error("Lexical error: {message} at line {line}, column {column}")]
    LexError {
        message: String,
        line: usize,
        column: usize,
        /// Full text of the offending line
        source_line: String,
    },

    #[error("Grammar error: {message}{}", found_suffix(.found))]
    GrammarError {
        message: String,
        /// The token that did not fit, if the stream had one
        found: Option<Token>,
    },
}

fn found_suffix(found: &Option<Token>) -> String {
    match found {
        Some(token) if token.is_end_of_stream() => ", found end of input".to_string(),
        Some(token) => format!(", found {} at {}", token, token.position),
        None => String::new(),
    }
}

impl DiagramError {
    /// Create a new lexical error
    pub fn lex_error(
        message: impl Into<String>,
        line: usize,
        column: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self::LexError {
            message: message.into(),
            line,
            column,
            source_line: source_line.into(),
        }
    }

    /// Create a new grammar error
    pub fn grammar_error(message: impl Into<String>, found: Option<Token>) -> Self {
        Self::GrammarError {
            message: message.into(),
            found,
        }
    }

    pub fn is_lex_error(&self) -> bool {
        matches!(self, Self::LexError { .. })
    }

    pub fn is_grammar_error(&self) -> bool {
        matches!(self, Self::GrammarError { .. })
    }

    /// Source line of the error, 1-based
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::LexError { line, .. } => Some(*line),
            Self::GrammarError { found, .. } => found
                .as_ref()
                .filter(|token| !token.is_end_of_stream())
                .map(|token| token.position.line),
        }
    }

    /// Source column of the error, 1-based
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::LexError { column, .. } => Some(*column),
            Self::GrammarError { found, .. } => found
                .as_ref()
                .filter(|token| !token.is_end_of_stream())
                .map(|token| token.position.column),
        }
    }

    /// Offending line followed by a caret under the offending column
    ///
    /// Only lexical errors keep the line text; grammar errors return `None`.
    ///
    /// ```
    /// use seqdiagram::tokenize;
    ///
    /// let err = tokenize("A -> 9").unwrap_err();
    /// assert_eq!(err.snippet().unwrap(), "A -> 9\n     ^");
    /// ```
    pub fn snippet(&self) -> Option<String> {
        match self {
            Self::LexError {
                column,
                source_line,
                ..
            } => {
                let padding = " ".repeat(column.saturating_sub(1));
                Some(format!("{source_line}\n{padding}^"))
            }
            Self::GrammarError { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Position, TokenKind};

    #[test]
    fn test_lex_error() {
        let error = DiagramError::lex_error("Unexpected character", 5, 10, "A -> B");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Lexical error"));
        assert!(error_msg.contains("Unexpected character"));
        assert!(error_msg.contains("line 5"));
        assert!(error_msg.contains("column 10"));
        assert!(error.is_lex_error());
    }

    #[test]
    fn test_grammar_error_with_token() {
        let token = Token::with_value(TokenKind::Identifier, "B", Position::new(2, 6));
        let error = DiagramError::grammar_error("Expected arrowbody", Some(token));
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Grammar error"));
        assert!(error_msg.contains("Expected arrowbody"));
        assert!(error_msg.contains("identifier(B)"));
        assert!(error_msg.contains("line 2, column 6"));
        assert_eq!(error.line(), Some(2));
        assert_eq!(error.column(), Some(6));
    }

    #[test]
    fn test_grammar_error_at_end_of_input() {
        let token = Token::end_of_stream(Position::new(3, 1));
        let error = DiagramError::grammar_error("Expected end", Some(token));
        assert!(format!("{}", error).ends_with("found end of input"));
        assert_eq!(error.line(), None);
    }

    #[test]
    fn test_grammar_error_without_token() {
        let error = DiagramError::grammar_error("Arrow has neither head nor tail", None);
        assert_eq!(
            format!("{}", error),
            "Grammar error: Arrow has neither head nor tail"
        );
        assert!(error.snippet().is_none());
    }

    #[test]
    fn test_snippet_points_at_column() {
        let error = DiagramError::lex_error("Unexpected character", 1, 3, "A ? B");
        assert_eq!(error.snippet().unwrap(), "A ? B\n  ^");
    }
}
