use std::cell::RefCell;
use std::rc::Rc;

use layers::RenderableLayer;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("rendering context is lost")]
    ContextLost,
    #[error("renderer rejected layer `{layer_id}`: {reason}")]
    Rejected { layer_id: String, reason: String },
    #[error("renderer has been destroyed")]
    Destroyed,
}

/// Declarative layer renderer.
///
/// The engine's only obligation is to hand over a stable, ordered list.
/// Layers that are `Rc::ptr_eq` to the previous submission are unchanged
/// and may skip re-upload.
pub trait Renderer {
    fn set_layers(&mut self, layers: &[Rc<RenderableLayer>]) -> Result<(), RenderError>;
}

#[derive(Debug, Default)]
struct Recorded {
    submissions: Vec<Vec<Rc<RenderableLayer>>>,
    fail_next: Option<RenderError>,
}

/// Renderer that keeps every submitted list. Clones share the record, so a
/// test can keep a handle while the engine owns the boxed renderer.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    inner: Rc<RefCell<Recorded>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> usize {
        self.inner.borrow().submissions.len()
    }

    pub fn last(&self) -> Option<Vec<Rc<RenderableLayer>>> {
        self.inner.borrow().submissions.last().cloned()
    }

    pub fn last_ids(&self) -> Vec<String> {
        self.last()
            .map(|ls| ls.iter().map(|l| l.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn nth(&self, index: usize) -> Option<Vec<Rc<RenderableLayer>>> {
        self.inner.borrow().submissions.get(index).cloned()
    }

    /// Make the next `set_layers` call fail with `err`.
    pub fn fail_next(&self, err: RenderError) {
        self.inner.borrow_mut().fail_next = Some(err);
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().submissions.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn set_layers(&mut self, layers: &[Rc<RenderableLayer>]) -> Result<(), RenderError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        inner.submissions.push(layers.to_vec());
        Ok(())
    }
}
