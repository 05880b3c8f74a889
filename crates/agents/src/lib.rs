//! Pipeline orchestration: drives one customer through
//! Ingest → Profile → Segment → Campaign → Output, recording an execution
//! log owned by the run.

pub mod enhancer;
pub mod log;
pub mod orchestrator;
pub mod outcome;
pub mod state_machine;

pub use enhancer::{
    build_enhancer, EnhancedMessage, MessageEnhancer, OpenAiEnhancer, TemplateOnlyEnhancer,
};
pub use log::{ExecutionLog, ExecutionLogEntry};
pub use orchestrator::PipelineOrchestrator;
pub use outcome::{FailureKind, PipelineFailure, PipelineOutcome, PipelineResult};
pub use state_machine::{PipelineState, PipelineStateMachine};
