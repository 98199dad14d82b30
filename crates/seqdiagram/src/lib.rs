//! seqdiagram - text-to-sequence-diagram front end
//!
//! Turns a small line-oriented diagram language into a laid out sequence
//! diagram: lifelines, activation boxes and arrows with vertical coordinates.
//! Drawing is left to a [`Renderer`](crate::core::Renderer).
//!
//! # Quick Start
//!
//! ```rust
//! use seqdiagram::layout;
//!
//! let layout = layout("participant Alice as A\nA -> Bob: hello\nBob --> A").unwrap();
//! let names: Vec<_> = layout.lifelines().iter().map(|l| l.name()).collect();
//! assert_eq!(names, vec!["Alice", "Bob"]);
//! assert_eq!(layout.arrows().len(), 2);
//! assert_eq!(layout.arrows()[0].label.as_deref(), Some("hello"));
//! ```
//!
//! # Advanced Usage
//!
//! Each stage can be driven on its own:
//!
//! ```rust
//! use seqdiagram::prelude::*;
//!
//! let tokens = tokenize("title Demo\nA ->> B").unwrap();
//! let diagram = Parser::new(tokens).parse().unwrap();
//! assert_eq!(diagram.title(), Some("Demo"));
//! assert_eq!(diagram.signals().count(), 1);
//!
//! let config = LayoutConfig { font_size: 10.0, ..LayoutConfig::default() };
//! let layout = SequenceLayoutEngine::with_config(config).layout(&diagram);
//! assert_eq!(layout.arrows()[0].head, Some(Adornment::Open));
//! assert_eq!(layout.height(), 22.5);
//! ```

pub mod core;
pub mod sequence;

pub use crate::core::{DiagramError, Renderer, Result};
pub use crate::sequence::{tokenize, tokenize_lines};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{DiagramError, Renderer};
    pub use crate::sequence::{
        tokenize, Adornment, Anchor, Arrow, Diagram, Layout, LayoutConfig, Lexer, LexerMode,
        Lifeline, Parser, Sequence, SequenceLayoutEngine, Signal, Statement, Token, TokenKind,
    };
}

use crate::sequence::{Diagram, Layout, LayoutConfig, Parser, SequenceLayoutEngine};

/// Lex and parse diagram source
///
/// # Example
/// ```rust
/// use seqdiagram::parse;
///
/// let diagram = parse("participant A\nA -> B: hi").unwrap();
/// let names: Vec<_> = diagram.participants().collect();
/// assert_eq!(names, vec!["A", "B"]);
/// ```
pub fn parse(input: &str) -> anyhow::Result<Diagram> {
    let tokens = tokenize(input)?;
    Ok(Parser::new(tokens).parse()?)
}

/// Lex, parse and lay out diagram source with the default configuration
pub fn layout(input: &str) -> anyhow::Result<Layout> {
    layout_with_config(input, LayoutConfig::default())
}

/// Lex, parse and lay out diagram source
pub fn layout_with_config(input: &str, config: LayoutConfig) -> anyhow::Result<Layout> {
    let diagram = parse(input)?;
    Ok(SequenceLayoutEngine::with_config(config).layout(&diagram))
}

/// Run the full pipeline and hand the layout to `renderer`
pub fn render<R: Renderer>(input: &str, renderer: &R) -> anyhow::Result<R::Output> {
    let layout = layout(input)?;
    renderer.render(&layout)
}
