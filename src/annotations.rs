use serde::Serialize;
use crate::types::Rgb;

/// A family of evenly spaced frequency lines at k × spacing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HarmonicSet {
    pub id: u32,
    pub spacing: f64,
    pub color: Rgb,
}

/// Incremental change to the harmonic collection, so views can patch one row
/// instead of rebuilding the whole list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HarmonicChange {
    Added(u32),
    Updated(u32),
    Removed(u32),
}

/// Ordered harmonic sets; insertion order is display order.
#[derive(Clone, Debug, Default)]
pub struct HarmonicCollection {
    sets: Vec<HarmonicSet>,
    next_id: u32,
    changes: Vec<HarmonicChange>,
}

impl HarmonicCollection {
    /// Returns the new id, or `None` if `spacing` is not a positive frequency.
    pub fn add(&mut self, spacing: f64, color: Rgb) -> Option<u32> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return None;
        }
        self.next_id += 1;
        let id = self.next_id;
        self.sets.push(HarmonicSet { id, spacing, color });
        self.record(HarmonicChange::Added(id));
        log::info!("harmonic set {id} added, spacing {spacing:.2} Hz");
        Some(id)
    }

    pub fn update_spacing(&mut self, id: u32, spacing: f64) -> bool {
        if !spacing.is_finite() || spacing <= 0.0 {
            return false;
        }
        let Some(set) = self.sets.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if set.spacing == spacing {
            return false;
        }
        set.spacing = spacing;
        self.record(HarmonicChange::Updated(id));
        true
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let Some(idx) = self.sets.iter().position(|s| s.id == id) else {
            log::warn!("remove of unknown harmonic set {id}");
            return false;
        };
        self.sets.remove(idx);
        self.record(HarmonicChange::Removed(id));
        log::info!("harmonic set {id} removed");
        true
    }

    pub fn get(&self, id: u32) -> Option<&HarmonicSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HarmonicSet> {
        self.sets.iter()
    }

    pub fn as_slice(&self) -> &[HarmonicSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Changes since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<HarmonicChange> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, change: HarmonicChange) {
        // Repeated live updates of the same set collapse into one entry
        if self.changes.last() == Some(&change) {
            return;
        }
        self.changes.push(change);
    }
}
