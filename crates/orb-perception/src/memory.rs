//! State the agent carries between ticks.

use std::collections::{BTreeMap, VecDeque};

use orb_core::{IVec3, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Edge length of a visit-tracking region in world units.
pub const REGION_SIZE: f32 = 10.0;
pub const DEFAULT_INTERACTION_CAP: usize = 50;

/// Interaction kind reported when the player places a block.
pub const PLACE_BLOCK: &str = "place_block";

/// Packed `(x, y, z) / REGION_SIZE` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RegionKey(pub u64);

impl RegionKey {
    pub fn of(position: Vec3) -> Self {
        Self(Self::cell(position).pack())
    }

    pub fn cell(position: Vec3) -> IVec3 {
        (position * (1.0 / REGION_SIZE)).floor()
    }

    /// World-space centre of the region.
    pub fn center(self) -> Vec3 {
        IVec3::unpack(self.0).center() * REGION_SIZE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionVisit {
    pub count: u32,
    pub last_visit_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interaction {
    pub kind: String,
    pub position: Option<Vec3>,
    pub data: Option<String>,
    pub timestamp_ms: u64,
}

impl Interaction {
    pub fn new(kind: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            kind: kind.into(),
            position: None,
            data: None,
            timestamp_ms,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mood {
    #[default]
    Curious,
    Helpful,
    Contemplative,
}

/// Visit history, recent interactions and the agent's drives.
///
/// Mood has no setter: it is only ever derived by [`OrbMemory::update_mood`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbMemory {
    visited_regions: BTreeMap<RegionKey, RegionVisit>,
    interactions: VecDeque<Interaction>,
    interaction_cap: usize,
    curiosity: f32,
    energy: f32,
    mood: Mood,
}

impl Default for OrbMemory {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl OrbMemory {
    pub fn new(curiosity: f32) -> Self {
        Self {
            visited_regions: BTreeMap::new(),
            interactions: VecDeque::new(),
            interaction_cap: DEFAULT_INTERACTION_CAP,
            curiosity: curiosity.clamp(0.0, 1.0),
            energy: 1.0,
            mood: Mood::default(),
        }
    }

    pub fn with_interaction_cap(mut self, cap: usize) -> Self {
        self.interaction_cap = cap.max(1);
        self.trim_interactions();
        self
    }

    pub fn curiosity(&self) -> f32 {
        self.curiosity
    }

    pub fn set_curiosity(&mut self, value: f32) {
        self.curiosity = value.clamp(0.0, 1.0);
    }

    /// Adds `delta` and clamps to `[floor, 1]`.
    pub fn adjust_curiosity(&mut self, delta: f32, floor: f32) {
        self.curiosity = (self.curiosity + delta).clamp(floor.clamp(0.0, 1.0), 1.0);
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn adjust_energy(&mut self, delta: f32) {
        self.energy = (self.energy + delta).clamp(0.0, 1.0);
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// First matching rule wins: helpful near the player, curious when
    /// curiosity is high, contemplative while idling. No match keeps the
    /// previous mood.
    pub fn update_mood(&mut self, player_distance: f32, idling: bool) -> Mood {
        if player_distance < 10.0 {
            self.mood = Mood::Helpful;
        } else if self.curiosity > 0.7 {
            self.mood = Mood::Curious;
        } else if idling {
            self.mood = Mood::Contemplative;
        }
        self.mood
    }

    pub fn record_visit(&mut self, position: Vec3, now_ms: u64) -> RegionKey {
        let key = RegionKey::of(position);
        let visit = self.visited_regions.entry(key).or_default();
        visit.count = visit.count.saturating_add(1);
        visit.last_visit_ms = now_ms;
        key
    }

    pub fn visit(&self, key: RegionKey) -> Option<RegionVisit> {
        self.visited_regions.get(&key).copied()
    }

    pub fn visit_at(&self, position: Vec3) -> Option<RegionVisit> {
        self.visit(RegionKey::of(position))
    }

    pub fn visited_regions(&self) -> impl Iterator<Item = (RegionKey, RegionVisit)> + '_ {
        self.visited_regions.iter().map(|(k, v)| (*k, *v))
    }

    pub fn region_count(&self) -> usize {
        self.visited_regions.len()
    }

    pub fn record_interaction(&mut self, interaction: Interaction) {
        self.interactions.push_back(interaction);
        self.trim_interactions();
    }

    /// Oldest first.
    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> + '_ {
        self.interactions.iter()
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    fn trim_interactions(&mut self) {
        while self.interactions.len() > self.interaction_cap {
            self.interactions.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_buckets_are_ten_units() {
        let a = RegionKey::of(Vec3::new(0.5, 0.5, 9.9));
        let b = RegionKey::of(Vec3::new(9.0, 3.0, 0.0));
        let c = RegionKey::of(Vec3::new(10.0, 3.0, 0.0));
        let d = RegionKey::of(Vec3::new(-0.1, 3.0, 0.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.center(), Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn interaction_log_drops_oldest() {
        let mut memory = OrbMemory::default().with_interaction_cap(3);
        for t in 0..5 {
            memory.record_interaction(Interaction::new(PLACE_BLOCK, t));
        }
        let stamps: Vec<u64> = memory.interactions().map(|i| i.timestamp_ms).collect();
        assert_eq!(stamps, vec![2, 3, 4]);
    }
}
