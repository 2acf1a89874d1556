use anyhow::{Result, ensure};

use crate::panel::{Panel, PanelProducer};
use crate::weather::WeatherSnapshot;

/// Ordered panel producers. The leading baseline slots are fixed; everything
/// after them is appended by the sports refresh and wiped only by `reset`.
pub struct PanelRegistry {
    producers: Vec<PanelProducer>,
    baseline: usize,
}

impl PanelRegistry {
    pub fn new(baseline: Vec<PanelProducer>) -> Result<Self> {
        ensure!(!baseline.is_empty(), "panel registry needs a baseline producer");
        Ok(Self {
            baseline: baseline.len(),
            producers: baseline,
        })
    }

    pub fn reset(&mut self) {
        self.producers.truncate(self.baseline);
    }

    pub fn add_screen(&mut self, producer: PanelProducer) {
        self.producers.push(producer);
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    pub fn baseline_len(&self) -> usize {
        self.baseline
    }

    pub fn produce(&self, index: usize, snapshot: &WeatherSnapshot) -> Option<Panel> {
        self.producers.get(index).and_then(|producer| producer(snapshot))
    }
}

impl std::fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelRegistry")
            .field("len", &self.producers.len())
            .field("baseline", &self.baseline)
            .finish()
    }
}
