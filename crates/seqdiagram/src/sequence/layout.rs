//! Sequence diagram layout engine
//!
//! Walks the top-level statements of a [`Diagram`] in document order and
//! assigns vertical coordinates. Every lifeline shares one vertical cursor,
//! so all of them stay in sync even when a signal only touches two.
//!
//! Horizontal placement of lifelines is left to the renderer; the layout only
//! fixes box widths and insets relative to each lifeline's center.

use serde::Serialize;
use tracing::{debug, span, trace, Level};

use super::ast::{Adornment, Diagram, Sequence, Signal, Statement};

/// Numeric constants driving the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    /// Text size unit; all vertical margins scale with it
    pub font_size: f64,
    /// Width of an activation box
    pub lifeline_width: f64,
    /// Horizontal inset per nesting level of activation boxes
    pub lifeline_inset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            lifeline_width: 32.0,
            lifeline_inset: 8.0,
        }
    }
}

impl LayoutConfig {
    /// Vertical space above a signal's start anchor
    pub fn top_margin(&self) -> f64 {
        self.font_size * 1.25
    }

    /// Distance between the anchors of a signal sent to its own lifeline
    pub fn self_signal_height(&self) -> f64 {
        self.font_size
    }

    /// Vertical space below a signal's end anchor
    pub fn bottom_margin(&self) -> f64 {
        self.font_size
    }
}

/// Index of a lifeline in [`Layout::lifelines`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LifelineId(pub usize);

/// Index of a box in [`Lifeline::activation_boxes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoxId(pub usize);

/// A span of activity on a lifeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationBox {
    start: f64,
    width: f64,
    height: f64,
    inset: f64,
}

impl ActivationBox {
    fn new(start: f64, width: f64, inset: f64) -> Self {
        Self {
            start,
            width,
            height: 0.0,
            inset,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Horizontal offset from the lifeline's center
    pub fn inset(&self) -> f64 {
        self.inset
    }

    pub fn end(&self) -> f64 {
        self.start + self.height
    }

    fn grow_by(&mut self, height: f64) {
        self.height += height;
    }
}

/// The timeline of one participant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lifeline {
    name: String,
    activation_boxes: Vec<ActivationBox>,
    #[serde(skip)]
    active: Vec<BoxId>,
}

impl Lifeline {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activation_boxes: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Canonical participant name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Boxes in creation order
    pub fn activation_boxes(&self) -> &[ActivationBox] {
        &self.activation_boxes
    }

    pub fn activation_box(&self, id: BoxId) -> Option<&ActivationBox> {
        self.activation_boxes.get(id.0)
    }

    /// Innermost box still open at the end of the pass
    pub fn active_box(&self) -> Option<BoxId> {
        self.active.last().copied()
    }

    /// Vertical extent: the lowest box end, or 0 without boxes
    pub fn extent(&self) -> f64 {
        self.activation_boxes
            .iter()
            .map(ActivationBox::end)
            .fold(0.0, f64::max)
    }

    fn activate(&mut self, start: f64, config: &LayoutConfig) -> BoxId {
        let inset = self.active.len() as f64 * config.lifeline_inset;
        let id = BoxId(self.activation_boxes.len());
        self.activation_boxes
            .push(ActivationBox::new(start, config.lifeline_width, inset));
        self.active.push(id);
        trace!(lifeline = %self.name, box_id = id.0, start, inset, "Activation box opened");
        id
    }

    fn deactivate(&mut self) {
        if let Some(id) = self.active.pop() {
            trace!(lifeline = %self.name, box_id = id.0, "Activation box closed");
        }
    }

    // Every open box spans the same time range from here on.
    fn grow_by(&mut self, height: f64) {
        for id in &self.active {
            self.activation_boxes[id.0].grow_by(height);
        }
    }
}

/// A resolved arrow end
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub lifeline: LifelineId,
    pub activation_box: Option<BoxId>,
    pub y: f64,
}

/// A laid out signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    pub start: Anchor,
    pub end: Anchor,
    pub label: Option<String>,
    pub dotted: bool,
    pub head: Option<Adornment>,
    pub tail: Option<Adornment>,
}

/// Result of a layout pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    lifelines: Vec<Lifeline>,
    arrows: Vec<Arrow>,
    height: f64,
}

impl Layout {
    /// Lifelines in first-seen order
    pub fn lifelines(&self) -> &[Lifeline] {
        &self.lifelines
    }

    /// Arrows in document order
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Total height of the diagram body
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn lifeline(&self, id: LifelineId) -> Option<&Lifeline> {
        self.lifelines.get(id.0)
    }

    pub fn lifeline_by_name(&self, name: &str) -> Option<(LifelineId, &Lifeline)> {
        self.lifelines
            .iter()
            .enumerate()
            .find(|(_, lifeline)| lifeline.name == name)
            .map(|(index, lifeline)| (LifelineId(index), lifeline))
    }

    /// Look up the lifeline and box an anchor refers to
    pub fn resolve(&self, anchor: &Anchor) -> Option<(&Lifeline, Option<&ActivationBox>)> {
        let lifeline = self.lifeline(anchor.lifeline)?;
        match anchor.activation_box {
            Some(id) => Some((lifeline, Some(lifeline.activation_box(id)?))),
            None => Some((lifeline, None)),
        }
    }
}

/// Sequence diagram layout engine
#[derive(Debug, Clone, Default)]
pub struct SequenceLayoutEngine {
    config: LayoutConfig,
}

impl SequenceLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out the diagram's top-level signals
    ///
    /// Statements nested in `opt` and `alt` blocks are not laid out.
    pub fn layout(&self, diagram: &Diagram) -> Layout {
        let layout_span = span!(
            Level::INFO,
            "layout_sequence",
            statement_count = diagram.statement_count(),
            participant_count = diagram.participant_count()
        );
        let _enter = layout_span.enter();

        let mut pass = LayoutPass::new(&self.config, diagram);
        for statement in diagram.statements() {
            match statement {
                Statement::Signal(signal) => pass.layout_signal(signal),
                Statement::Conditional(block) => {
                    trace!(label = %block.label, "Skipping conditional block");
                }
                Statement::Alt(group) => {
                    trace!(block_count = group.len(), "Skipping alt group");
                }
            }
        }
        let layout = pass.finish();

        debug!(
            lifeline_count = layout.lifelines.len(),
            arrow_count = layout.arrows.len(),
            height = layout.height,
            "Layout completed"
        );
        layout
    }
}

/// Mutable state of one layout pass
struct LayoutPass<'a> {
    config: &'a LayoutConfig,
    diagram: &'a Diagram,
    lifelines: Vec<Lifeline>,
    arrows: Vec<Arrow>,
    body_height: f64,
}

impl<'a> LayoutPass<'a> {
    fn new(config: &'a LayoutConfig, diagram: &'a Diagram) -> Self {
        Self {
            config,
            diagram,
            lifelines: Vec::new(),
            arrows: Vec::new(),
            body_height: 0.0,
        }
    }

    fn finish(self) -> Layout {
        Layout {
            lifelines: self.lifelines,
            arrows: self.arrows,
            height: self.body_height,
        }
    }

    fn layout_signal(&mut self, signal: &Signal) {
        let diagram = self.diagram;
        let from = self.lifeline(diagram.resolve(&signal.from));
        let to = self.lifeline(diagram.resolve(&signal.to));
        trace!(from = %signal.from, to = %signal.to, "Laying out signal");

        self.grow_by(self.config.top_margin());
        let start = self.anchor(from);
        if signal.deactivate {
            self.lifelines[from.0].deactivate();
        }

        // Decided on the names as written, before alias resolution
        let height = if signal.is_self_signal() {
            self.config.self_signal_height()
        } else {
            0.0
        };
        self.grow_by(height);

        if signal.activate {
            let y = self.body_height;
            self.lifelines[to.0].activate(y, self.config);
        }
        let end = self.anchor(to);

        self.grow_by(self.config.bottom_margin());

        self.arrows.push(Arrow {
            start,
            end,
            label: signal.message.clone(),
            dotted: signal.dotted,
            head: signal.head,
            tail: signal.tail,
        });
    }

    /// Fetch a lifeline by canonical name, creating it on first sight
    fn lifeline(&mut self, name: &str) -> LifelineId {
        if let Some(index) = self.lifelines.iter().position(|l| l.name == name) {
            return LifelineId(index);
        }
        debug!(lifeline = %name, index = self.lifelines.len(), "Lifeline created");
        self.lifelines.push(Lifeline::new(name));
        LifelineId(self.lifelines.len() - 1)
    }

    fn anchor(&self, id: LifelineId) -> Anchor {
        Anchor {
            lifeline: id,
            activation_box: self.lifelines[id.0].active_box(),
            y: self.body_height,
        }
    }

    fn grow_by(&mut self, height: f64) {
        if height == 0.0 {
            return;
        }
        for lifeline in &mut self.lifelines {
            lifeline.grow_by(height);
        }
        self.body_height += height;
    }
}
