//! Symptom triage core: fixed symptom table, keyword extraction,
//! reply composition, and the per-turn engine.

pub mod composer;
pub mod engine;
pub mod extraction;
pub mod table;
pub mod types;

pub use composer::ReplyTemplates;
pub use engine::{Resolution, TriageEngine};
pub use table::SymptomTable;
pub use types::{Guidance, Medicine, ReplyEnvelope, SymptomRecord};
