//! Line-oriented lexer for the sequence diagram language
//!
//! The lexer is fed one line at a time and carries a [`LexerMode`] between
//! lines. Most lines are statements and are tokenized from scratch; after a
//! `note` line the lexer switches to multi-line text and passes lines through
//! verbatim until a line starting with `end`.
//!
//! ```
//! use seqdiagram::sequence::{Lexer, LexerMode, TokenKind};
//!
//! let mut lexer = Lexer::new();
//! let tokens = lexer.tokenize_line("Alice -> Bob: hi").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Identifier,
//!         TokenKind::ArrowBody,
//!         TokenKind::ArrowRight,
//!         TokenKind::Identifier,
//!         TokenKind::Colon,
//!         TokenKind::Text,
//!     ]
//! );
//! assert!(lexer.finish().is_some());
//! assert_eq!(lexer.mode(), LexerMode::Done);
//! ```

use std::collections::VecDeque;

use tracing::{debug, span, trace, Level};

use super::token::{Position, Token, TokenKind};
use crate::core::{DiagramError, Result};

/// State carried by the lexer from one line to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexerMode {
    /// Lines are statements
    #[default]
    Normal,
    /// Lines are raw text until a line starting with `end`
    MultilineText,
    /// A lexical error occurred; remaining input is ignored
    Error,
    /// End of input was reached
    Done,
}

/// Incremental, single-use lexer
#[derive(Debug, Default)]
pub struct Lexer {
    mode: LexerMode,
    line_number: usize,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Tokenize the next line of input
    ///
    /// Lines handed in after an error or after [`finish`](Self::finish) are
    /// ignored and yield no tokens.
    pub fn tokenize_line(&mut self, line: &str) -> Result<Vec<Token>> {
        match self.mode {
            LexerMode::Error | LexerMode::Done => {
                debug!(mode = ?self.mode, "Lexer stopped, ignoring line");
                return Ok(Vec::new());
            }
            LexerMode::Normal | LexerMode::MultilineText => {}
        }

        self.line_number += 1;
        trace!(line_number = self.line_number, mode = ?self.mode, "Tokenizing line");

        let result = match self.mode {
            LexerMode::MultilineText => self.read_multiline_text(line),
            _ => self.tokenize_statement(line),
        };

        if let Err(err) = &result {
            debug!(error = %err, "Lexical error, stopping");
            self.mode = LexerMode::Error;
        }
        result
    }

    /// Signal end of input
    ///
    /// Returns the end-of-stream token, or `None` when the lexer already
    /// failed or was finished before.
    pub fn finish(&mut self) -> Option<Token> {
        match self.mode {
            LexerMode::Error | LexerMode::Done => None,
            LexerMode::Normal | LexerMode::MultilineText => {
                self.mode = LexerMode::Done;
                trace!(line_number = self.line_number, "End of input");
                Some(Token::end_of_stream(Position::new(self.line_number + 1, 1)))
            }
        }
    }

    /// Turn the lexer into a lazy token stream over `lines`
    pub fn tokens<I, S>(self, lines: I) -> Tokens<I::IntoIter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Tokens {
            lexer: self,
            lines: lines.into_iter(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn read_multiline_text(&mut self, line: &str) -> Result<Vec<Token>> {
        if is_end_line(line) {
            debug!(line_number = self.line_number, "Multi-line text closed");
            self.mode = LexerMode::Normal;
            return self.tokenize_statement(line);
        }
        let token = Token::with_value(TokenKind::Text, line, Position::new(self.line_number, 1));
        trace!(token = %token, "Token");
        Ok(vec![token])
    }

    fn tokenize_statement(&mut self, line: &str) -> Result<Vec<Token>> {
        let mut scanner = LineScanner::new(line, self.line_number);
        let mut tokens: Vec<Token> = Vec::new();
        let mut read_inline_text = false;
        let mut keyword_text = false;
        let mut check_for_activator = false;

        loop {
            scanner.skip_whitespace();
            if scanner.at_end() {
                break;
            }
            if read_inline_text {
                tokens.push(scanner.read_inline_text());
                break;
            }
            if keyword_text {
                keyword_text = false;
                if scanner.peek() != Some(':') {
                    tokens.push(scanner.read_inline_text());
                    break;
                }
            }

            let token = if check_for_activator {
                check_for_activator = false;
                scanner.read_activator_or_statement_token()?
            } else {
                scanner.read_statement_token()?
            };
            trace!(token = %token, "Token");

            if token.kind == TokenKind::Colon {
                read_inline_text = true;
            } else if token.kind.is_arrow_right() {
                check_for_activator = true;
            } else if tokens.is_empty() && token.kind.starts_inline_text() {
                keyword_text = true;
            }
            tokens.push(token);
        }

        let starts_multiline = tokens
            .first()
            .is_some_and(|token| token.kind.starts_multiline_text());
        if starts_multiline && !read_inline_text {
            debug!(line_number = self.line_number, "Multi-line text opened");
            self.mode = LexerMode::MultilineText;
        }
        Ok(tokens)
    }
}

/// Lazy token stream produced by [`Lexer::tokens`]
///
/// Yields every token in order, then the end-of-stream token. A lexical
/// error is yielded once and ends the stream.
pub struct Tokens<I> {
    lexer: Lexer,
    lines: I,
    pending: VecDeque<Token>,
    finished: bool,
}

impl<I> Tokens<I> {
    pub fn mode(&self) -> LexerMode {
        self.lexer.mode()
    }
}

impl<I, S> Iterator for Tokens<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            match self.lines.next() {
                Some(line) => match self.lexer.tokenize_line(line.as_ref()) {
                    Ok(tokens) => self.pending.extend(tokens),
                    Err(err) => {
                        self.finished = true;
                        return Some(Err(err));
                    }
                },
                None => {
                    self.finished = true;
                    return self.lexer.finish().map(Ok);
                }
            }
        }
    }
}

/// Tokenize a sequence of lines to completion
pub fn tokenize_lines<I, S>(lines: I) -> Result<Vec<Token>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokenize_span = span!(Level::INFO, "tokenize");
    let _enter = tokenize_span.enter();

    let tokens = Lexer::new().tokens(lines).collect::<Result<Vec<_>>>()?;
    debug!(token_count = tokens.len(), "Tokenization completed");
    Ok(tokens)
}

/// Tokenize a whole source text
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    tokenize_lines(source.lines())
}

/// `true` when the first word of the line is `end`, ignoring case
fn is_end_line(line: &str) -> bool {
    let word: String = line
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    word.eq_ignore_ascii_case("end")
}

fn is_whitespace_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | ',' | '*' | '+' | '-')
}

fn is_identifier_start_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Cursor over the characters of a single line
struct LineScanner<'a> {
    line: &'a str,
    chars: Vec<char>,
    offset: usize,
    line_number: usize,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str, line_number: usize) -> Self {
        Self {
            line,
            chars: line.chars().collect(),
            offset: 0,
            line_number,
        }
    }

    fn at_end(&self) -> bool {
        self.offset >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    /// Move past the current character and return the next one
    fn advance(&mut self) -> Option<char> {
        if self.offset < self.chars.len() {
            self.offset += 1;
        }
        self.peek()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace_char) {
            self.offset += 1;
        }
    }

    fn position_at(&self, offset: usize) -> Position {
        Position::new(self.line_number, offset + 1)
    }

    fn fail(&self, message: impl Into<String>) -> DiagramError {
        DiagramError::lex_error(message, self.line_number, self.offset + 1, self.line)
    }

    fn read_statement_token(&mut self) -> Result<Token> {
        match self.peek() {
            Some(c) if is_operator_char(c) => self.read_operator(c),
            Some(c) if is_identifier_start_char(c) => Ok(self.read_identifier()),
            Some(c) => Err(self.fail(format!("Unexpected character '{c}'"))),
            None => Err(self.fail("Unexpected end of line")),
        }
    }

    fn read_activator_or_statement_token(&mut self) -> Result<Token> {
        let offset = self.offset;
        match self.peek() {
            Some('+') => {
                self.advance();
                Ok(self.emit(TokenKind::Activate, "+", offset))
            }
            Some('-') => {
                self.advance();
                Ok(self.emit(TokenKind::Deactivate, "-", offset))
            }
            _ => self.read_statement_token(),
        }
    }

    /// The rest of the line, verbatim from the current position
    fn read_inline_text(&mut self) -> Token {
        let offset = self.offset;
        let text: String = self.chars[offset..].iter().collect();
        self.offset = self.chars.len();
        self.emit(TokenKind::Text, text, offset)
    }

    fn read_operator(&mut self, c: char) -> Result<Token> {
        match c {
            '<' => Ok(self.read_doubled('<', TokenKind::ArrowLeft, TokenKind::ArrowLeftOpen)),
            '-' => Ok(self.read_doubled('-', TokenKind::ArrowBody, TokenKind::ArrowBodyDotted)),
            '>' => Ok(self.read_doubled('>', TokenKind::ArrowRight, TokenKind::ArrowRightOpen)),
            '*' => Ok(self.read_char(c, TokenKind::Create)),
            ':' => Ok(self.read_char(c, TokenKind::Colon)),
            ',' => Ok(self.read_char(c, TokenKind::Comma)),
            _ => Err(self.fail(format!("Unexpected operator '{c}'"))),
        }
    }

    /// Read `c` or `cc`
    fn read_doubled(&mut self, c: char, single: TokenKind, double: TokenKind) -> Token {
        let offset = self.offset;
        if self.advance() == Some(c) {
            self.advance();
            self.emit(double, format!("{c}{c}"), offset)
        } else {
            self.emit(single, c.to_string(), offset)
        }
    }

    fn read_char(&mut self, c: char, kind: TokenKind) -> Token {
        let offset = self.offset;
        self.advance();
        self.emit(kind, c.to_string(), offset)
    }

    fn read_identifier(&mut self) -> Token {
        let offset = self.offset;
        let mut ident = String::new();
        let mut next = self.peek();
        while let Some(c) = next.filter(|c| is_identifier_char(*c)) {
            ident.push(c);
            next = self.advance();
        }
        let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Identifier);
        self.emit(kind, ident, offset)
    }

    fn emit(&self, kind: TokenKind, value: impl Into<String>, offset: usize) -> Token {
        Token::with_value(kind, value, self.position_at(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn last_before_eos(source: &str) -> Token {
        let mut tokens = tokenize(source).unwrap();
        assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::EndOfStream));
        tokens.pop().expect("at least one token before end of stream")
    }

    #[test]
    fn test_identifier() {
        let tokens = tokenize("alpha123").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].value(), Some("alpha123"));
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert!(tokens[1].is_end_of_stream());
    }

    #[test]
    fn test_identifier_starting_with_digit_fails() {
        let err = tokenize("123alpha").unwrap_err();
        assert!(err.is_lex_error());
        assert_eq!(err.line(), Some(1));
        assert_eq!(err.column(), Some(1));
    }

    #[test]
    fn test_keywords() {
        for (literal, kind) in crate::sequence::KEYWORDS {
            assert_eq!(kinds(literal), vec![kind, TokenKind::EndOfStream], "{literal}");
        }
    }

    #[test]
    fn test_arrow_parts() {
        assert_eq!(kinds(">")[0], TokenKind::ArrowRight);
        assert_eq!(kinds(">>")[0], TokenKind::ArrowRightOpen);
        assert_eq!(kinds("-")[0], TokenKind::ArrowBody);
        assert_eq!(kinds("--")[0], TokenKind::ArrowBodyDotted);
        assert_eq!(kinds("<")[0], TokenKind::ArrowLeft);
        assert_eq!(kinds("<<")[0], TokenKind::ArrowLeftOpen);
    }

    #[test]
    fn test_composed_arrow() {
        assert_eq!(
            kinds("A <<-->> B"),
            vec![
                TokenKind::Identifier,
                TokenKind::ArrowLeftOpen,
                TokenKind::ArrowBodyDotted,
                TokenKind::ArrowRightOpen,
                TokenKind::Identifier,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_other_operators() {
        assert_eq!(kinds(",")[0], TokenKind::Comma);
        assert_eq!(kinds(":")[0], TokenKind::Colon);
        assert_eq!(kinds("*")[0], TokenKind::Create);
    }

    #[test]
    fn test_activators_follow_right_head() {
        assert_eq!(last_before_eos(">+").kind, TokenKind::Activate);
        assert_eq!(last_before_eos(">-").kind, TokenKind::Deactivate);
        assert_eq!(
            kinds("A ->+ B")[3..],
            [TokenKind::Activate, TokenKind::Identifier, TokenKind::EndOfStream]
        );
    }

    #[test]
    fn test_plus_outside_activator_position_fails() {
        let err = tokenize("A + B").unwrap_err();
        assert!(err.is_lex_error());
        assert_eq!(err.column(), Some(3));
    }

    #[test]
    fn test_inline_text() {
        let token = last_before_eos("A -> B: This is some text");
        assert_eq!(token.kind, TokenKind::Text);
        assert_eq!(token.value(), Some("This is some text"));

        let token = last_before_eos("test: loop note as opt right");
        assert_eq!(token.value(), Some("loop note as opt right"));
    }

    #[test]
    fn test_inline_text_keeps_trailing_whitespace() {
        let token = last_before_eos("  :  Another test  ");
        assert_eq!(token.value(), Some("Another test  "));
        assert_eq!(token.position, Position::new(1, 6));
    }

    #[test]
    fn test_colon_at_end_of_line_gives_no_text() {
        assert_eq!(
            kinds("A -> B:"),
            vec![
                TokenKind::Identifier,
                TokenKind::ArrowBody,
                TokenKind::ArrowRight,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::EndOfStream,
            ]
        );
        assert_eq!(kinds("A -> B: \t").last(), Some(&TokenKind::EndOfStream));
        assert_eq!(kinds("A -> B: \t").len(), 6);
    }

    #[test]
    fn test_title_takes_rest_of_line() {
        assert_eq!(
            kinds("title My first diagram"),
            vec![TokenKind::KwTitle, TokenKind::Text, TokenKind::EndOfStream]
        );
        assert_eq!(
            last_before_eos("title   My 1st diagram").value(),
            Some("My 1st diagram")
        );
        assert_eq!(
            kinds("title: Demo"),
            vec![
                TokenKind::KwTitle,
                TokenKind::Colon,
                TokenKind::Text,
                TokenKind::EndOfStream
            ]
        );
    }

    #[test]
    fn test_block_keywords_take_conditions_after_colon() {
        assert_eq!(
            kinds("alt: x > 1"),
            vec![
                TokenKind::KwAlt,
                TokenKind::Colon,
                TokenKind::Text,
                TokenKind::EndOfStream
            ]
        );
        assert_eq!(last_before_eos("opt: user is 42").value(), Some("user is 42"));
        assert_eq!(kinds("else"), vec![TokenKind::KwElse, TokenKind::EndOfStream]);
        assert_eq!(
            kinds("opt ready"),
            vec![TokenKind::KwOpt, TokenKind::Identifier, TokenKind::EndOfStream]
        );
    }

    #[test]
    fn test_block_keyword_line_is_still_scanned() {
        let err = tokenize("opt 9lives").unwrap_err();
        assert!(err.is_lex_error());
        assert_eq!(err.column(), Some(5));
        assert!(tokenize("else x").is_ok());
        assert!(tokenize("alt 1 < 2").is_err());
    }

    #[test]
    fn test_inline_text_keyword_only_at_line_start() {
        assert_eq!(
            kinds("A -> title"),
            vec![
                TokenKind::Identifier,
                TokenKind::ArrowBody,
                TokenKind::ArrowRight,
                TokenKind::KwTitle,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_multiline_note() {
        let source = "note over A\nfirst line\n  second: 2 > 1\nEND\nA -> B";
        let tokens = tokenize(source).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::KwNote,
                TokenKind::KwOver,
                TokenKind::Identifier,
                TokenKind::Text,
                TokenKind::Text,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::ArrowBody,
                TokenKind::ArrowRight,
                TokenKind::Identifier,
                TokenKind::EndOfStream,
            ]
        );
        assert_eq!(tokens[4].value(), Some("  second: 2 > 1"));
        assert_eq!(tokens[5].value(), Some("END"));
    }

    #[test]
    fn test_note_with_inline_text_stays_normal() {
        let mut lexer = Lexer::new();
        lexer.tokenize_line("note over A: short").unwrap();
        assert_eq!(lexer.mode(), LexerMode::Normal);
    }

    #[test]
    fn test_end_prefix_does_not_close_note() {
        let mut lexer = Lexer::new();
        lexer.tokenize_line("note left of A").unwrap();
        assert_eq!(lexer.mode(), LexerMode::MultilineText);
        let tokens = lexer.tokenize_line("endpoint").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(lexer.mode(), LexerMode::MultilineText);
        let tokens = lexer.tokenize_line("   end").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::KwEnd);
        assert_eq!(tokens[0].position, Position::new(3, 4));
        assert_eq!(lexer.mode(), LexerMode::Normal);
    }

    #[test]
    fn test_error_stops_lexer() {
        let mut lexer = Lexer::new();
        let err = lexer.tokenize_line("A -> B ?").unwrap_err();
        assert_eq!(err.column(), Some(8));
        assert_eq!(lexer.mode(), LexerMode::Error);
        assert!(lexer.tokenize_line("A -> B").unwrap().is_empty());
        assert!(lexer.finish().is_none());
        assert_eq!(lexer.mode(), LexerMode::Error);
    }

    #[test]
    fn test_finish_once() {
        let mut lexer = Lexer::new();
        lexer.tokenize_line("A").unwrap();
        let eos = lexer.finish().unwrap();
        assert_eq!(eos.position, Position::new(2, 1));
        assert!(lexer.finish().is_none());
        assert!(lexer.tokenize_line("B").unwrap().is_empty());
    }

    #[test]
    fn test_token_stream_yields_error_once() {
        let mut stream = Lexer::new().tokens(["A -> B", "9", "C -> D"]);
        let mut kinds = Vec::new();
        let mut errors = 0;
        for item in stream.by_ref() {
            match item {
                Ok(token) => kinds.push(token.kind),
                Err(_) => errors += 1,
            }
        }
        assert_eq!(errors, 1);
        assert_eq!(kinds.len(), 4);
        assert!(!kinds.contains(&TokenKind::EndOfStream));
        assert_eq!(stream.mode(), LexerMode::Error);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfStream]);
    }

    #[test]
    fn test_columns_count_characters() {
        let tokens = tokenize("A -> B: héllo\nC").unwrap();
        assert_eq!(tokens[3].position, Position::new(1, 6));
        assert_eq!(tokens[6].position, Position::new(2, 1));
    }
}
