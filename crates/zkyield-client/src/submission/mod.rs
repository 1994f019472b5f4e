mod events;
mod orchestrator;
mod state;

pub use events::{EventBus, SubmissionEvent};
pub use orchestrator::{ProofRequest, SubmissionOrchestrator};
pub use state::{
    RequestOutcome, RequestState, SubmissionIntent, SubmissionPhase, SubmissionSnapshot,
};
