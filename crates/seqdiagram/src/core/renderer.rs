//! Renderer boundary
//!
//! Drawing is left to consumers. A renderer receives a finished [`Layout`]
//! and turns it into whatever output it targets; lifeline horizontal spacing
//! and text measurement are its business.

use anyhow::Result;

use crate::sequence::Layout;

/// Core trait for diagram renderers
pub trait Renderer: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render a laid out diagram
    fn render(&self, layout: &Layout) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
