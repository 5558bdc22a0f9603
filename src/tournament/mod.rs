//! Tournament orchestration: match persistence seam and the rating
//! workflow that reacts to finalized results

pub mod store;
pub mod workflow;

// Re-export commonly used types
pub use store::{InMemoryMatchStore, MatchStore};
pub use workflow::{AppliedRatings, CompletionOutcome, MatchCompletionWorkflow, SkipReason};
