//! Diagram tree for sequence diagrams
//!
//! The parser builds a [`Diagram`] once; consumers only read it afterwards.
//! Statements are a closed sum type so the layout engine can match on them
//! exhaustively.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Role assigned to a participant on first mention
pub const DEFAULT_ROLE: &str = "entity";

/// Arrow end decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Adornment {
    /// `<` or `>`
    Closed,
    /// `<<` or `>>`
    Open,
}

/// A directed message between two participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub from: String,
    pub to: String,
    pub tail: Option<Adornment>,
    pub head: Option<Adornment>,
    pub dotted: bool,
    pub message: Option<String>,
    /// Open an activation box on `to` when the signal arrives
    pub activate: bool,
    /// Close the top activation box of `from` when the signal leaves
    pub deactivate: bool,
}

impl Signal {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            tail: None,
            head: None,
            dotted: false,
            message: None,
            activate: false,
            deactivate: false,
        }
    }

    pub fn with_head(mut self, head: Adornment) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_tail(mut self, tail: Adornment) -> Self {
        self.tail = Some(tail);
        self
    }

    pub fn dotted(mut self) -> Self {
        self.dotted = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn activating(mut self) -> Self {
        self.activate = true;
        self
    }

    pub fn deactivating(mut self) -> Self {
        self.deactivate = true;
        self
    }

    pub fn is_self_signal(&self) -> bool {
        self.from == self.to
    }
}

/// Label of a conditional block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockLabel {
    Opt,
    Alt,
    Else,
}

impl BlockLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockLabel::Opt => "opt",
            BlockLabel::Alt => "alt",
            BlockLabel::Else => "else",
        }
    }
}

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled block with an optional condition and a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalBlock {
    pub label: BlockLabel,
    pub condition: Option<String>,
    statements: Vec<Statement>,
}

impl ConditionalBlock {
    pub fn new(label: BlockLabel) -> Self {
        Self {
            label,
            condition: None,
            statements: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// One `alt` / `else` / `end` construct
///
/// Never empty: the first block is labelled `alt`, the others `else`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AltGroup {
    blocks: Vec<ConditionalBlock>,
}

impl AltGroup {
    /// Start a group with its `alt` block
    pub fn new(condition: Option<String>) -> Self {
        Self {
            blocks: vec![ConditionalBlock {
                label: BlockLabel::Alt,
                condition,
                statements: Vec::new(),
            }],
        }
    }

    /// Append an `else` block
    pub fn push_else(&mut self, condition: Option<String>) {
        self.blocks.push(ConditionalBlock {
            label: BlockLabel::Else,
            condition,
            statements: Vec::new(),
        });
    }

    pub fn blocks(&self) -> &[ConditionalBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; present for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Anything that can appear in a statement sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Signal(Signal),
    Conditional(ConditionalBlock),
    Alt(AltGroup),
}

impl From<Signal> for Statement {
    fn from(signal: Signal) -> Self {
        Statement::Signal(signal)
    }
}

impl From<ConditionalBlock> for Statement {
    fn from(block: ConditionalBlock) -> Self {
        Statement::Conditional(block)
    }
}

impl From<AltGroup> for Statement {
    fn from(group: AltGroup) -> Self {
        Statement::Alt(group)
    }
}

/// An ordered list of statements
///
/// Implemented by the root diagram and by conditional blocks so the parser
/// can share one statement grammar between them.
pub trait Sequence {
    fn statements(&self) -> &[Statement];

    fn push_statement(&mut self, statement: Statement);

    /// Signals directly in this sequence, skipping nested blocks
    fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.statements().iter().filter_map(|statement| match statement {
            Statement::Signal(signal) => Some(signal),
            _ => None,
        })
    }
}

impl Sequence for ConditionalBlock {
    fn statements(&self) -> &[Statement] {
        &self.statements
    }

    fn push_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }
}

/// Root of the diagram tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagram {
    title: Option<String>,
    statements: Vec<Statement>,
    /// Participant name to role, in first-seen order
    participants: IndexMap<String, String>,
    /// Alias to canonical participant name
    aliases: HashMap<String, String>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Role of a participant, if it has been registered
    pub fn participant(&self, name: &str) -> Option<&str> {
        self.participants.get(name).map(String::as_str)
    }

    /// Participant names in first-seen order
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.participants.keys().map(String::as_str)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Register (or re-register) a participant with the default role
    ///
    /// A repeated declaration keeps the participant's original position.
    pub fn add_participant(&mut self, name: impl Into<String>) {
        self.add_participant_with_role(name, DEFAULT_ROLE);
    }

    pub fn add_participant_with_role(&mut self, name: impl Into<String>, role: impl Into<String>) {
        let name = name.into();
        trace!(participant = %name, "Registering participant");
        self.participants.insert(name, role.into());
    }

    /// Register a participant mentioned by a signal, unless it is known
    /// already, directly or as an alias
    pub fn ensure_participant(&mut self, name: &str) {
        if self.aliases.contains_key(name) || self.participants.contains_key(name) {
            return;
        }
        self.add_participant(name);
    }

    /// Canonical name an alias refers to
    pub fn alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Bind `alias` to `name`; a later binding of the same alias wins
    pub fn add_alias(&mut self, alias: impl Into<String>, name: impl Into<String>) {
        let alias = alias.into();
        let name = name.into();
        trace!(alias = %alias, participant = %name, "Registering alias");
        self.aliases.insert(alias, name);
    }

    /// Resolve a name through the alias table, one step
    ///
    /// Aliases do not chain: an alias bound to another alias resolves to
    /// that alias, not further.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.alias(name).unwrap_or(name)
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }
}

impl Sequence for Diagram {
    fn statements(&self) -> &[Statement] {
        &self.statements
    }

    fn push_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }
}
