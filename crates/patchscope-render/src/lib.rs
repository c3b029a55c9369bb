//! Patchscope Render: drawing a laid-out routing graph

pub mod dot;
pub mod label;
pub mod palette;

use chrono::{DateTime, Local};
use patchscope_core::{Graph, Layout};

pub use dot::{DotRenderer, render_dot};
pub use label::{node_text, short_label, wrap_label};

/// Everything needed to draw one refresh.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub graph: &'a Graph,
    pub layout: &'a Layout,
    pub updated_at: DateTime<Local>,
}

/// A drawing surface. Each call replaces whatever was drawn before.
pub trait Renderer: Send {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        (**self).render(frame)
    }
}
