//! Sequence diagram front end and layout
//!
//! Source text flows through [`Lexer`] into [`Parser`], which builds a
//! [`Diagram`]; [`SequenceLayoutEngine`] turns that into a [`Layout`].

mod ast;
pub(crate) mod lexer;
mod layout;
mod parser;
mod token;

pub use ast::{
    Adornment, AltGroup, BlockLabel, ConditionalBlock, Diagram, Sequence, Signal, Statement,
    DEFAULT_ROLE,
};
pub use layout::{
    ActivationBox, Anchor, Arrow, BoxId, Layout, LayoutConfig, Lifeline, LifelineId,
    SequenceLayoutEngine,
};
pub use lexer::{tokenize, tokenize_lines, Lexer, LexerMode, Tokens};
pub use parser::{parse_tokens, Parser, MAX_NESTING_DEPTH};
pub use token::{Position, Token, TokenKind, KEYWORDS};
