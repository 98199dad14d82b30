//! Recursive-descent parser for sequence diagrams
//!
//! Consumes tokens strictly forward with one token of lookahead and builds a
//! [`Diagram`]. The first token that does not fit ends parsing with a grammar
//! error; there is no recovery.
//!
//! Grammar:
//!
//! ```text
//! diagram     := (title | participant | statement)* EOS
//! title       := "title" [":"] TEXT
//! participant := "participant" IDENT ["as" IDENT]
//! statement   := opt | alt | signal
//! opt         := "opt" [[":"] TEXT] statement* "end"
//! alt         := "alt" [[":"] TEXT] ("else" [[":"] TEXT])* "end"
//! signal      := IDENT ["<" | "<<"] ("-" | "--") [">" | ">>"] IDENT [":" TEXT]
//! ```
//!
//! `opt` blocks nest at most [`MAX_NESTING_DEPTH`] levels deep.

use tracing::{debug, span, trace, Level};

use super::ast::{Adornment, AltGroup, BlockLabel, ConditionalBlock, Diagram, Sequence, Signal, Statement};
use super::token::{Position, Token, TokenKind};
use crate::core::{DiagramError, Result};

/// Deepest `opt` nesting accepted before parsing fails
pub const MAX_NESTING_DEPTH: usize = 256;

/// Single-use parser over a token stream
///
/// The stream does not need to end with an end-of-stream token; running out
/// of tokens is treated the same way.
pub struct Parser<I> {
    tokens: I,
    current: Token,
    depth: usize,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Token>,
{
    pub fn new<T>(tokens: T) -> Self
    where
        T: IntoIterator<Item = Token, IntoIter = I>,
    {
        let mut parser = Self {
            tokens: tokens.into_iter(),
            current: Token::end_of_stream(Position::default()),
            depth: 0,
        };
        parser.advance();
        parser
    }

    /// Parse the whole token stream into a diagram
    pub fn parse(mut self) -> Result<Diagram> {
        let parse_span = span!(Level::INFO, "parse");
        let _enter = parse_span.enter();

        let mut diagram = Diagram::new();
        while !self.test(TokenKind::EndOfStream) {
            if self.accept(TokenKind::KwTitle) {
                self.parse_title(&mut diagram)?;
            } else if self.accept(TokenKind::KwParticipant) {
                self.parse_participant(&mut diagram)?;
            } else {
                let statement = self.parse_statement(&mut diagram)?;
                diagram.push_statement(statement);
            }
        }

        debug!(
            statement_count = diagram.statement_count(),
            participant_count = diagram.participant_count(),
            "Parsing completed"
        );
        Ok(diagram)
    }

    fn parse_title(&mut self, diagram: &mut Diagram) -> Result<()> {
        self.accept(TokenKind::Colon);
        let title = self.read(TokenKind::Text)?;
        trace!(title = %title, "Title");
        diagram.set_title(title);
        Ok(())
    }

    fn parse_participant(&mut self, diagram: &mut Diagram) -> Result<()> {
        let name = self.read(TokenKind::Identifier)?;
        diagram.add_participant(name.as_str());
        if self.accept(TokenKind::KwAs) {
            let alias = self.read(TokenKind::Identifier)?;
            diagram.add_alias(alias, name);
        }
        Ok(())
    }

    /// Statements shared by the root sequence and nested blocks
    fn parse_statement(&mut self, diagram: &mut Diagram) -> Result<Statement> {
        if self.test(TokenKind::KwOpt) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(self.unexpected(format!(
                    "Blocks nested deeper than {MAX_NESTING_DEPTH} levels"
                )));
            }
            self.advance();
            self.depth += 1;
            let block = self.parse_opt(diagram);
            self.depth -= 1;
            Ok(block?.into())
        } else if self.accept(TokenKind::KwAlt) {
            Ok(self.parse_alt()?.into())
        } else if self.test(TokenKind::Identifier) {
            Ok(self.parse_signal(diagram)?.into())
        } else {
            Err(self.unexpected("Unexpected token in statement"))
        }
    }

    fn parse_opt(&mut self, diagram: &mut Diagram) -> Result<ConditionalBlock> {
        let mut block = ConditionalBlock::new(BlockLabel::Opt);
        block.condition = self.parse_condition()?;
        trace!(condition = ?block.condition, "Opt block");

        while !self.accept(TokenKind::KwEnd) {
            if self.test(TokenKind::EndOfStream) {
                return Err(self.unexpected("Expected end to close opt block"));
            }
            let statement = self.parse_statement(diagram)?;
            block.push_statement(statement);
        }
        Ok(block)
    }

    // Blocks of an alt group carry a condition only, never statements.
    fn parse_alt(&mut self) -> Result<AltGroup> {
        let mut group = AltGroup::new(self.parse_condition()?);
        loop {
            if self.accept(TokenKind::KwElse) {
                group.push_else(self.parse_condition()?);
            } else if self.accept(TokenKind::KwEnd) {
                break;
            } else {
                return Err(self.unexpected("Expected else or end in alt block"));
            }
        }
        trace!(block_count = group.len(), "Alt group");
        Ok(group)
    }

    fn parse_condition(&mut self) -> Result<Option<String>> {
        let colon = self.accept(TokenKind::Colon);
        if colon || self.test(TokenKind::Text) {
            return self.read(TokenKind::Text).map(Some);
        }
        Ok(None)
    }

    fn parse_signal(&mut self, diagram: &mut Diagram) -> Result<Signal> {
        let from = self.read(TokenKind::Identifier)?;
        let mut signal = Signal::new(from, String::new());

        if self.accept(TokenKind::ArrowLeft) {
            signal.tail = Some(Adornment::Closed);
        } else if self.accept(TokenKind::ArrowLeftOpen) {
            signal.tail = Some(Adornment::Open);
        }

        if self.accept(TokenKind::ArrowBodyDotted) {
            signal.dotted = true;
        } else {
            self.expect(TokenKind::ArrowBody)?;
        }

        if self.accept(TokenKind::ArrowRight) {
            signal.head = Some(Adornment::Closed);
        } else if self.accept(TokenKind::ArrowRightOpen) {
            signal.head = Some(Adornment::Open);
        }

        if signal.head.is_none() && signal.tail.is_none() {
            return Err(self.unexpected("Arrow has neither head nor tail"));
        }

        signal.to = self.read(TokenKind::Identifier)?;

        if self.accept(TokenKind::Colon) {
            signal.message = Some(self.read(TokenKind::Text)?);
        }

        diagram.ensure_participant(&signal.from);
        diagram.ensure_participant(&signal.to);
        trace!(from = %signal.from, to = %signal.to, dotted = signal.dotted, "Signal");
        Ok(signal)
    }

    fn advance(&mut self) {
        let position = self.current.position;
        self.current = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::end_of_stream(position));
    }

    fn test(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.test(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        self.assert(kind)?;
        self.advance();
        Ok(())
    }

    /// Consume a token of `kind` and return its literal
    fn read(&mut self, kind: TokenKind) -> Result<String> {
        self.assert(kind)?;
        let value = self.current.value.take().unwrap_or_default();
        self.advance();
        Ok(value)
    }

    fn assert(&self, kind: TokenKind) -> Result<()> {
        if self.test(kind) {
            return Ok(());
        }
        Err(self.unexpected(format!("Expected {kind}")))
    }

    fn unexpected(&self, message: impl Into<String>) -> DiagramError {
        DiagramError::grammar_error(message, Some(self.current.clone()))
    }
}

/// Parse a token sequence into a diagram
pub fn parse_tokens<T>(tokens: T) -> Result<Diagram>
where
    T: IntoIterator<Item = Token>,
{
    Parser::new(tokens).parse()
}
