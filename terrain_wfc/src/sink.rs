use crate::{category::Category, engine::RunOutcome, grid::GridPos};

/// Receiver of engine progress, typically a display.
///
/// `on_cell_collapsed` fires exactly once per cell, at the moment its domain
/// becomes a singleton, whether through a random draw, propagation or a pin.
pub trait RenderSink {
    fn on_cell_collapsed(&mut self, pos: GridPos, category: Category);

    /// Called under [`crate::ContradictionPolicy::ReportAndStop`] so a display
    /// can mark the failing cell.
    fn on_contradiction(&mut self, _pos: GridPos) {}

    fn on_run_finished(&mut self, _outcome: &RunOutcome) {}
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn on_cell_collapsed(&mut self, pos: GridPos, category: Category) {
        (**self).on_cell_collapsed(pos, category);
    }

    fn on_contradiction(&mut self, pos: GridPos) {
        (**self).on_contradiction(pos);
    }

    fn on_run_finished(&mut self, outcome: &RunOutcome) {
        (**self).on_run_finished(outcome);
    }
}

/// Sink that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn on_cell_collapsed(&mut self, _pos: GridPos, _category: Category) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Collapsed { pos: GridPos, category: Category },
    Contradiction { pos: GridPos },
    Finished(RunOutcome),
}

/// Sink that keeps every notification in arrival order.
#[derive(Debug, Default, Clone)]
pub struct CollapseLog {
    pub events: Vec<SinkEvent>,
}

impl CollapseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collapses(&self) -> impl Iterator<Item = (GridPos, Category)> + '_ {
        self.events.iter().filter_map(|event| match *event {
            SinkEvent::Collapsed { pos, category } => Some((pos, category)),
            _ => None,
        })
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.events.iter().rev().find_map(|event| match *event {
            SinkEvent::Finished(outcome) => Some(outcome),
            _ => None,
        })
    }
}

impl RenderSink for CollapseLog {
    fn on_cell_collapsed(&mut self, pos: GridPos, category: Category) {
        self.events.push(SinkEvent::Collapsed { pos, category });
    }

    fn on_contradiction(&mut self, pos: GridPos) {
        self.events.push(SinkEvent::Contradiction { pos });
    }

    fn on_run_finished(&mut self, outcome: &RunOutcome) {
        self.events.push(SinkEvent::Finished(*outcome));
    }
}
