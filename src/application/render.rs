// Chart renderer seam consumed by the orchestrator
use crate::domain::chart::{ChartData, ChartTarget};

/// Chart drawing keyed by named render targets. A draw replaces the
/// previous chart instance for the target outright; instances are never
/// mutated in place.
pub trait ChartRenderer: Send + Sync {
    /// Whether the surface for this target is currently attached.
    fn target_ready(&self, target: ChartTarget) -> bool;

    /// Replace the chart for `target`. Returns `false` when the target is
    /// not attached and nothing was drawn.
    fn draw(&self, target: ChartTarget, chart: ChartData) -> bool;

    /// Drop the chart instance for `target`, keeping the target attached.
    fn destroy(&self, target: ChartTarget);
}
