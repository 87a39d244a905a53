// Chart panel - named render targets behind the ChartRenderer seam
use crate::application::render::ChartRenderer;
use crate::domain::chart::{ChartData, ChartTarget};
use std::collections::HashMap;
use std::sync::Mutex;

/// Holds the last drawn chart per attached target. A target exists only
/// while its view is mounted; draws against unmounted targets are
/// rejected so the orchestrator can tell the draw did not land.
#[derive(Default)]
pub struct ChartPanel {
    targets: Mutex<HashMap<ChartTarget, Option<ChartData>>>,
}

impl ChartPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a target. Attaching twice keeps the existing chart.
    pub fn attach(&self, target: ChartTarget) {
        self.targets.lock().unwrap().entry(target).or_insert(None);
    }

    /// Unmount a target, dropping its chart instance with it.
    pub fn detach(&self, target: ChartTarget) {
        self.targets.lock().unwrap().remove(&target);
    }

    pub fn chart(&self, target: ChartTarget) -> Option<ChartData> {
        self.targets.lock().unwrap().get(&target).cloned().flatten()
    }
}

impl ChartRenderer for ChartPanel {
    fn target_ready(&self, target: ChartTarget) -> bool {
        self.targets.lock().unwrap().contains_key(&target)
    }

    fn draw(&self, target: ChartTarget, chart: ChartData) -> bool {
        let mut targets = self.targets.lock().unwrap();
        match targets.get_mut(&target) {
            Some(slot) => {
                // replace the previous instance outright
                *slot = Some(chart);
                true
            }
            None => false,
        }
    }

    fn destroy(&self, target: ChartTarget) {
        if let Some(slot) = self.targets.lock().unwrap().get_mut(&target) {
            *slot = None;
        }
    }
}
