use std::fmt;

use orb_core::Vec3;
use orb_perception::BlockInfo;
use serde_json::{Map, Value};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MAX_PRIORITY: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GoalId(pub Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GoalKind {
    FollowPlayer,
    Explore,
    Build,
    Gather,
    Observe,
    Idle,
    Investigate,
}

impl GoalKind {
    pub const ALL: [GoalKind; 7] = [
        GoalKind::FollowPlayer,
        GoalKind::Explore,
        GoalKind::Build,
        GoalKind::Gather,
        GoalKind::Observe,
        GoalKind::Idle,
        GoalKind::Investigate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GoalKind::FollowPlayer => "follow_player",
            GoalKind::Explore => "explore",
            GoalKind::Build => "build",
            GoalKind::Gather => "gather",
            GoalKind::Observe => "observe",
            GoalKind::Idle => "idle",
            GoalKind::Investigate => "investigate",
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `Suspended` is accepted on input but nothing in the engine produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GoalStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Failed,
    Suspended,
}

impl GoalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Goal {
    pub id: GoalId,
    pub kind: GoalKind,
    /// Base priority in `0..=MAX_PRIORITY` as set by whoever created the goal.
    pub priority: u8,
    /// Base priority plus the current tick's situational nudges, clamped.
    pub effective_priority: u8,
    pub description: String,
    pub target_position: Option<Vec3>,
    pub target_entity_id: Option<String>,
    pub target_blocks: Option<Vec<BlockInfo>>,
    pub progress: f32,
    pub status: GoalStatus,
    pub created_at_ms: u64,
    pub expires_at_ms: Option<u64>,
    pub metadata: Map<String, Value>,
}

impl Goal {
    pub fn new(kind: GoalKind, priority: u8, created_at_ms: u64) -> Self {
        let priority = priority.min(MAX_PRIORITY);
        Self {
            id: GoalId::new(),
            kind,
            priority,
            effective_priority: priority,
            description: kind.name().replace('_', " "),
            target_position: None,
            target_entity_id: None,
            target_blocks: None,
            progress: 0.0,
            status: GoalStatus::Pending,
            created_at_ms,
            expires_at_ms: None,
            metadata: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_target_position(mut self, target: Vec3) -> Self {
        self.target_position = Some(target);
        self
    }

    pub fn with_target_entity(mut self, id: impl Into<String>) -> Self {
        self.target_entity_id = Some(id.into());
        self
    }

    pub fn with_target_blocks(mut self, blocks: Vec<BlockInfo>) -> Self {
        self.target_blocks = Some(blocks);
        self
    }

    pub fn expiring_at(mut self, expires_at_ms: u64) -> Self {
        self.expires_at_ms = Some(expires_at_ms);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_some_and(|at| now_ms >= at)
    }

    /// Still eligible for selection: not finished and not expired.
    pub fn is_live(&self, now_ms: u64) -> bool {
        !self.status.is_terminal() && !self.is_expired(now_ms)
    }

    pub fn total_blocks(&self) -> usize {
        self.target_blocks.as_ref().map_or(0, Vec::len)
    }

    /// Index of the next block to place for a build goal.
    ///
    /// The small bias keeps `k / n` progress values from flooring to `k - 1`.
    pub fn next_block_index(&self) -> usize {
        let total = self.total_blocks();
        if total == 0 {
            return 0;
        }
        let done = (self.progress.clamp(0.0, 1.0) * total as f32 + 1e-4).floor() as usize;
        done.min(total)
    }

    /// Merges every field set in `patch` into this goal, keeping its id.
    pub fn apply(&mut self, patch: GoalPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority.min(MAX_PRIORITY);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(target) = patch.target_position {
            self.target_position = Some(target);
        }
        if let Some(id) = patch.target_entity_id {
            self.target_entity_id = Some(id);
        }
        if let Some(blocks) = patch.target_blocks {
            self.target_blocks = Some(blocks);
        }
        if let Some(progress) = patch.progress {
            self.progress = progress.clamp(0.0, 1.0);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(expires_at_ms) = patch.expires_at_ms {
            self.expires_at_ms = Some(expires_at_ms);
        }
        self.metadata.extend(patch.metadata);
    }
}

/// Partial goal carried by [`crate::OrbAction::SetGoal`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GoalPatch {
    pub kind: Option<GoalKind>,
    pub priority: Option<u8>,
    pub description: Option<String>,
    pub target_position: Option<Vec3>,
    pub target_entity_id: Option<String>,
    pub target_blocks: Option<Vec<BlockInfo>>,
    pub progress: Option<f32>,
    pub status: Option<GoalStatus>,
    pub expires_at_ms: Option<u64>,
    pub metadata: Map<String, Value>,
}

impl GoalPatch {
    pub fn kind(kind: GoalKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
