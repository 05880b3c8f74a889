use campaign_core::error::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Inactive,
    Ingest,
    Profile,
    Segment,
    Campaign,
    Output,
    Complete,
    Error,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Inactive => "inactive",
            PipelineState::Ingest => "ingest",
            PipelineState::Profile => "profile",
            PipelineState::Segment => "segment",
            PipelineState::Campaign => "campaign",
            PipelineState::Output => "output",
            PipelineState::Complete => "complete",
            PipelineState::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Error)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes a single valid state transition for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: PipelineState,
    pub to: PipelineState,
    pub trigger: String,
}

/// Guards a run's lifecycle: stages advance strictly in sequence, and any
/// non-terminal stage may fail into `Error`.
#[derive(Debug, Clone)]
pub struct PipelineStateMachine {
    state: PipelineState,
    transitions: Vec<StateTransition>,
}

impl PipelineStateMachine {
    /// Creates a state machine in `Inactive` with the sequential stage
    /// transitions and the failure edges pre-configured.
    pub fn new() -> Self {
        let sequence = [
            (PipelineState::Inactive, PipelineState::Ingest, "start"),
            (PipelineState::Ingest, PipelineState::Profile, "customer_loaded"),
            (PipelineState::Profile, PipelineState::Segment, "profile_ready"),
            (PipelineState::Segment, PipelineState::Campaign, "segment_assigned"),
            (PipelineState::Campaign, PipelineState::Output, "campaign_ready"),
            (PipelineState::Output, PipelineState::Complete, "result_assembled"),
        ];

        let mut transitions: Vec<StateTransition> = sequence
            .iter()
            .map(|(from, to, trigger)| StateTransition {
                from: *from,
                to: *to,
                trigger: trigger.to_string(),
            })
            .collect();

        transitions.extend(sequence.iter().map(|(from, _, _)| StateTransition {
            from: *from,
            to: PipelineState::Error,
            trigger: "stage_failed".to_string(),
        }));

        Self {
            state: PipelineState::Inactive,
            transitions,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns `true` if the given transition is allowed.
    pub fn can_transition(&self, from: PipelineState, to: PipelineState) -> bool {
        self.transitions.iter().any(|t| t.from == from && t.to == to)
    }

    /// Attempts to move the state machine to `to`.
    pub fn transition(&mut self, to: PipelineState) -> CampaignResult<()> {
        if self.can_transition(self.state, to) {
            self.state = to;
            Ok(())
        } else {
            Err(CampaignError::StateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
