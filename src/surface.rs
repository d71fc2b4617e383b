//! Chart surface lifecycle
//!
//! A surface shows one thing at a time: nothing, a loading marker, a text
//! placeholder, an inline error, or a chart. Starting a new load tears the
//! previous content down and bumps a generation counter; results carrying an
//! older generation are discarded so a slow query cannot draw over a newer
//! selection.

use crate::ir::ChartScene;
use crate::runtime::RenderOutcome;
use crate::tooltip::SharedTooltip;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceState {
    Blank,
    Loading { use_case: String },
    Placeholder(String),
    Error(String),
    Chart(ChartScene),
}

/// Proof that a load was started; only the newest ticket may present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    use_case: String,
}

impl LoadTicket {
    pub fn use_case(&self) -> &str {
        &self.use_case
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct ChartSurface {
    generation: u64,
    state: SurfaceState,
    tooltip: SharedTooltip,
    hovered: Option<usize>,
}

impl ChartSurface {
    pub fn new(tooltip: SharedTooltip) -> Self {
        Self {
            generation: 0,
            state: SurfaceState::Blank,
            tooltip,
            hovered: None,
        }
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn scene(&self) -> Option<&ChartScene> {
        match &self.state {
            SurfaceState::Chart(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn tooltip(&self) -> &SharedTooltip {
        &self.tooltip
    }

    /// Tear down whatever is shown and start a load for `use_case`
    pub fn begin(&mut self, use_case: &str) -> LoadTicket {
        self.teardown();
        self.generation += 1;
        self.state = SurfaceState::Loading { use_case: use_case.to_string() };
        LoadTicket { generation: self.generation, use_case: use_case.to_string() }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Show a render outcome. Returns false when the ticket is stale.
    pub fn present(&mut self, ticket: &LoadTicket, outcome: RenderOutcome) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.state = match outcome {
            RenderOutcome::Rendered(scene) => SurfaceState::Chart(scene),
            RenderOutcome::Empty => SurfaceState::Placeholder(outcome_text(&RenderOutcome::Empty)),
            failed @ RenderOutcome::Failed(_) => SurfaceState::Error(outcome_text(&failed)),
        };
        true
    }

    /// Show a plain message (e.g. no visualization configured)
    pub fn present_placeholder(&mut self, ticket: &LoadTicket, text: impl Into<String>) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.state = SurfaceState::Placeholder(text.into());
        true
    }

    /// Show an inline error outside the render pipeline (e.g. unknown use case)
    pub fn present_error(&mut self, ticket: &LoadTicket, text: impl Into<String>) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.state = SurfaceState::Error(text.into());
        true
    }

    fn accept(&self, ticket: &LoadTicket) -> bool {
        if self.is_current(ticket) {
            return true;
        }
        tracing::debug!(
            use_case = %ticket.use_case,
            stale = ticket.generation,
            current = self.generation,
            "discarding stale response"
        );
        false
    }

    fn teardown(&mut self) {
        self.state = SurfaceState::Blank;
        self.hovered = None;
        self.tooltip.lock().reset();
    }

    // -------------------------------------------------------------------------
    // Hover interaction
    // -------------------------------------------------------------------------

    /// Mark currently under the pointer, if any
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Hover-enter on mark `idx`; `page` is the pointer in page coordinates
    pub fn hover_enter(&mut self, idx: usize, page: (f64, f64)) {
        let Some(mark) = self.scene().and_then(|s| s.mark(idx)) else {
            return;
        };
        let content = mark.tooltip.clone();
        self.tooltip.lock().show(content, page);
        self.hovered = Some(idx);
    }

    pub fn hover_leave(&mut self, idx: usize) {
        if self.scene().and_then(|s| s.mark(idx)).is_none() {
            return;
        }
        self.tooltip.lock().hide();
        if self.hovered == Some(idx) {
            self.hovered = None;
        }
    }

    /// Pointer moved to `local` (surface coordinates); emits enter/leave as
    /// the mark under the pointer changes.
    pub fn pointer_moved(&mut self, local: (f64, f64), page: (f64, f64)) {
        let target = self.scene().and_then(|s| s.mark_at(local));
        match (self.hovered, target) {
            (Some(prev), Some(next)) if prev == next => {}
            (prev, next) => {
                if let Some(prev) = prev {
                    self.hover_leave(prev);
                }
                if let Some(next) = next {
                    self.hover_enter(next, page);
                }
            }
        }
    }

    pub fn pointer_left(&mut self) {
        if let Some(prev) = self.hovered {
            self.hover_leave(prev);
        }
    }
}

fn outcome_text(outcome: &RenderOutcome) -> String {
    outcome.placeholder().unwrap_or_default()
}
