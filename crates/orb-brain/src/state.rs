use orb_core::Vec3;
use orb_goals::{Goal, GoalId, GoalKind};
use orb_nav::PathFollower;
use orb_perception::{OrbMemory, PerceptionData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbMode {
    #[default]
    Idle,
    Thinking,
    Acting,
    Scanning,
    Following,
    Listening,
    Speaking,
}

pub fn mode_for_goal(kind: GoalKind) -> OrbMode {
    match kind {
        GoalKind::FollowPlayer => OrbMode::Following,
        GoalKind::Explore | GoalKind::Investigate | GoalKind::Observe => OrbMode::Scanning,
        GoalKind::Build | GoalKind::Gather => OrbMode::Acting,
        GoalKind::Idle => OrbMode::Idle,
    }
}

/// The agent's complete state. Owned by [`crate::OrbBrain`]; everyone else
/// sees clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbState {
    pub mode: OrbMode,
    pub position: Vec3,
    pub autonomy: bool,
    pub perception: PerceptionData,
    /// Evaluated order, highest effective priority first.
    pub goals: Vec<Goal>,
    pub active_goal: Option<GoalId>,
    pub path: PathFollower,
    /// Speed for moves that do not name one.
    pub movement_speed: f32,
    /// Last position an observe action looked at.
    pub look_target: Option<Vec3>,
    pub memory: OrbMemory,
    pub tick_count: u64,
    pub last_tick_ms: Option<u64>,
    pub last_perception_ms: Option<u64>,
    pub last_speech_ms: Option<u64>,
    pub pending_utterance: Option<String>,
}

impl OrbState {
    pub fn new(position: Vec3, speed: f32, memory: OrbMemory) -> Self {
        Self {
            mode: OrbMode::Idle,
            position,
            autonomy: true,
            perception: PerceptionData::default(),
            goals: Vec::new(),
            active_goal: None,
            path: PathFollower::new(speed),
            movement_speed: speed,
            look_target: None,
            memory,
            tick_count: 0,
            last_tick_ms: None,
            last_perception_ms: None,
            last_speech_ms: None,
            pending_utterance: None,
        }
    }

    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn goal_mut(&mut self, id: GoalId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    pub fn active(&self) -> Option<&Goal> {
        self.active_goal.and_then(|id| self.goal(id))
    }

    pub fn is_moving(&self) -> bool {
        self.path.is_moving()
    }
}
