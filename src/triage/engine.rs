//! Turn-taking engine.
//!
//! One turn walks a fixed priority ladder: empty input is ignored, a
//! bare greeting gets the canned greeting, then extraction feeds the
//! session's symptom set, then follow-up routing, classifier lookup,
//! the pain heuristic, and finally the remote generation fallback.
//!
//! `resolve` is a pure function of (state, input) so callers decide
//! when and whether to commit the turn; `take_turn` is the convenience
//! wrapper that resolves, runs the fallback if needed, and commits.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::generation::{build_prompt, TextGenerator};
use crate::models::ConversationState;

use super::composer::ReplyTemplates;
use super::extraction;
use super::table::SymptomTable;
use super::types::ReplyEnvelope;

/// Outcome of resolving one utterance against the session state.
#[derive(Debug)]
pub enum Resolution {
    /// Blank input: no turn is produced, nothing changes.
    Ignored,
    /// A locally composed reply, plus the symptom keys this turn adds.
    Reply {
        reply: ReplyEnvelope,
        symptoms: BTreeSet<String>,
    },
    /// No local route matched; the caller should run the generation
    /// fallback with this prompt, then commit.
    Fallback {
        prompt: String,
        symptoms: BTreeSet<String>,
    },
}

/// The triage engine: symptom table plus the generation fallback seam.
pub struct TriageEngine {
    table: Arc<SymptomTable>,
    generator: Arc<dyn TextGenerator>,
}

impl TriageEngine {
    pub fn new(table: Arc<SymptomTable>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { table, generator }
    }

    pub fn table(&self) -> &SymptomTable {
        &self.table
    }

    /// Resolve one utterance without mutating anything.
    pub fn resolve(&self, state: &ConversationState, input: &str) -> Resolution {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Resolution::Ignored;
        }

        if extraction::is_greeting(trimmed) {
            return Resolution::Reply {
                reply: ReplyTemplates::greeting(),
                symptoms: BTreeSet::new(),
            };
        }

        let lower = trimmed.to_lowercase();
        let extracted = extraction::extract_symptoms(trimmed);

        // The symptom set the session will hold once this turn commits;
        // follow-up routing looks at it, not at the pre-turn set.
        let mut combined = state.recognized().clone();
        combined.extend(extracted.iter().cloned());

        if extraction::is_follow_up(trimmed, &combined) {
            // Cough/cold get a scoped reply; everything else gets the
            // overview of what has been recognized so far.
            for key in ["cough", "cold"] {
                if lower.contains(key) {
                    if let Some(record) = self.table.get(key) {
                        return Resolution::Reply {
                            reply: ReplyTemplates::follow_up_scoped(record),
                            symptoms: extracted,
                        };
                    }
                }
            }
            return Resolution::Reply {
                reply: ReplyTemplates::follow_up_overview(&combined),
                symptoms: extracted,
            };
        }

        if let Some(record) = self.table.lookup(trimmed) {
            return Resolution::Reply {
                reply: ReplyTemplates::structured(record),
                symptoms: extracted,
            };
        }

        if extraction::mentions_pain(trimmed) {
            if extraction::pain_points_to_leg(trimmed) {
                if let Some(record) = self.table.lookup("leg pain") {
                    return Resolution::Reply {
                        reply: ReplyTemplates::structured(record),
                        symptoms: extracted,
                    };
                }
            }
            return Resolution::Reply {
                reply: ReplyTemplates::pain_clarification(),
                symptoms: extracted,
            };
        }

        Resolution::Fallback {
            prompt: build_prompt(&combined, trimmed),
            symptoms: extracted,
        }
    }

    /// Run the generation fallback. Never fails: any backend error is
    /// recovered with the uniform clarifying reply.
    pub async fn run_fallback(&self, prompt: &str) -> ReplyEnvelope {
        match self.generator.generate(prompt).await {
            Ok(text) => ReplyTemplates::from_generated(text),
            Err(e) => {
                tracing::warn!(error = %e, "generation fallback failed, using clarifying reply");
                ReplyTemplates::connection_trouble()
            }
        }
    }

    /// Resolve, run the fallback if needed, and commit the turn.
    ///
    /// Returns `None` for blank input (no turn is produced).
    pub async fn take_turn(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Option<ReplyEnvelope> {
        match self.resolve(state, input) {
            Resolution::Ignored => None,
            Resolution::Reply { reply, symptoms } => {
                state.apply_turn(input.trim(), &reply.text, symptoms);
                Some(reply)
            }
            Resolution::Fallback { prompt, symptoms } => {
                tracing::debug!("no local route matched, consulting generation backend");
                let reply = self.run_fallback(&prompt).await;
                state.apply_turn(input.trim(), &reply.text, symptoms);
                Some(reply)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::generation::GenerationError;
    use crate::triage::composer::{CONNECTION_TROUBLE, CONTINUATION_INVITE};

    /// Generator returning a canned reply, counting calls.
    struct CannedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    /// Generator that always fails, counting calls.
    struct FailingGenerator {
        calls: AtomicUsize,
    }

    impl FailingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::Connect("http://test".into()))
        }
    }

    fn engine_with(generator: Arc<dyn TextGenerator>) -> TriageEngine {
        TriageEngine::new(Arc::new(SymptomTable::builtin()), generator)
    }

    fn failing_engine() -> (TriageEngine, Arc<FailingGenerator>) {
        let generator = Arc::new(FailingGenerator::new());
        (engine_with(generator.clone()), generator)
    }

    // ── Priority ladder ──

    #[tokio::test]
    async fn empty_input_produces_no_turn() {
        let (engine, generator) = failing_engine();
        let mut state = ConversationState::new();

        assert!(engine.take_turn(&mut state, "").await.is_none());
        assert!(engine.take_turn(&mut state, "   \t ").await.is_none());
        assert!(state.history().is_empty());
        assert!(state.recognized().is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn greeting_gets_canned_reply_without_symptom_mutation() {
        let (engine, _) = failing_engine();
        let mut state = ConversationState::new();

        let reply = engine.take_turn(&mut state, "hi").await.unwrap();
        assert!(reply.text.starts_with("Hello! I'm TriageCare AI"));
        assert!(state.recognized().is_empty());
        assert_eq!(state.history().len(), 2);
    }

    #[tokio::test]
    async fn headache_hits_classifier_with_full_structured_reply() {
        let (engine, generator) = failing_engine();
        let mut state = ConversationState::new();

        let reply = engine
            .take_turn(&mut state, "I have a bad headache")
            .await
            .unwrap();

        assert!(reply.text.starts_with("Severity: **LOW**"));
        assert!(reply.text.contains("- **Paracetamol**: 500mg, max 4 doses daily"));
        assert!(reply.text.contains("- **Ibuprofen**: 400mg, max 3 doses daily"));
        assert!(reply.text.ends_with(CONTINUATION_INVITE));
        assert!(reply.ends_with_question);
        assert!(state.recognized().contains("headache"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn leg_hurts_after_running_requeries_leg_pain() {
        let (engine, generator) = failing_engine();
        let mut state = ConversationState::new();

        let reply = engine
            .take_turn(&mut state, "my leg hurts after running")
            .await
            .unwrap();

        // Matches the leg pain record exactly, via the pain heuristic
        let expected = ReplyTemplates::structured(engine.table().get("leg pain").unwrap());
        assert_eq!(reply, expected);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn vague_pain_gets_clarifying_questions_without_fallback() {
        let (engine, generator) = failing_engine();
        let mut state = ConversationState::new();

        let reply = engine
            .take_turn(&mut state, "everything hurts so much")
            .await
            .unwrap();

        assert!(reply.text.contains("scale of 1 to 10"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn follow_up_cold_question_gets_cold_specific_reply() {
        let (engine, generator) = failing_engine();
        let mut state = ConversationState::new();

        engine
            .take_turn(&mut state, "I have a nasty cough")
            .await
            .unwrap();
        assert!(state.recognized().contains("cough"));

        let reply = engine
            .take_turn(&mut state, "what about cold medicine")
            .await
            .unwrap();

        assert!(reply.text.starts_with("About your **cold**:"));
        assert!(reply.text.contains("Cetirizine"));
        assert_eq!(
            generator.calls.load(Ordering::SeqCst),
            0,
            "follow-up path must not consult the fallback"
        );
    }

    #[tokio::test]
    async fn follow_up_without_cough_or_cold_lists_recognized_symptoms() {
        let (engine, _) = failing_engine();
        let mut state = ConversationState::new();

        engine.take_turn(&mut state, "I have a fever").await.unwrap();
        let reply = engine
            .take_turn(&mut state, "is there anything else I should watch?")
            .await
            .unwrap();

        assert!(reply.text.contains("So far you've mentioned: **fever**."));
        assert!(reply.ends_with_question);
    }

    /// A first-turn compound sentence already routes to follow-up:
    /// extraction unions into the symptom set before the follow-up
    /// check, and "and" is a continuation marker.
    #[tokio::test]
    async fn compound_first_sentence_routes_to_overview() {
        let (engine, _) = failing_engine();
        let mut state = ConversationState::new();

        let reply = engine
            .take_turn(&mut state, "I have a headache and fever")
            .await
            .unwrap();

        assert!(reply.text.contains("**fever, headache**"));
        assert!(state.recognized().contains("headache"));
        assert!(state.recognized().contains("fever"));
    }

    // ── Fallback ──

    #[tokio::test]
    async fn unmatched_input_reaches_the_generator() {
        let generator = Arc::new(CannedGenerator::new(
            "Thanks for sharing. How long has this been going on?",
        ));
        let engine = engine_with(generator.clone());
        let mut state = ConversationState::new();

        let reply = engine
            .take_turn(&mut state, "my ears are ringing constantly")
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(reply.text, "Thanks for sharing. How long has this been going on?");
        assert!(reply.ends_with_question);
    }

    #[tokio::test]
    async fn generator_failure_recovers_with_literal_clarifying_reply() {
        let (engine, generator) = failing_engine();
        let mut state = ConversationState::new();

        let reply = engine
            .take_turn(&mut state, "my ears are ringing constantly")
            .await
            .unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(reply.text, CONNECTION_TROUBLE);
        assert!(reply.ends_with_question);
        // The failed turn still commits to history
        assert_eq!(state.history().len(), 2);
    }

    #[tokio::test]
    async fn fallback_prompt_carries_accumulated_symptoms() {
        struct PromptCapture(std::sync::Mutex<String>);

        #[async_trait]
        impl TextGenerator for PromptCapture {
            async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
                *self.0.lock().unwrap() = prompt.to_string();
                Ok("ok".into())
            }
        }

        let capture = Arc::new(PromptCapture(std::sync::Mutex::new(String::new())));
        let engine = engine_with(capture.clone());
        let mut state = ConversationState::new();

        engine.take_turn(&mut state, "I have a cough").await.unwrap();
        engine
            .take_turn(&mut state, "it gets worse at night")
            .await
            .unwrap();

        let prompt = capture.0.lock().unwrap().clone();
        assert!(prompt.contains("Symptoms mentioned so far: cough."));
        assert!(prompt.contains("it gets worse at night"));
    }

    // ── Accumulation ──

    #[tokio::test]
    async fn recognized_symptoms_accumulate_across_turns() {
        let (engine, _) = failing_engine();
        let mut state = ConversationState::new();

        engine.take_turn(&mut state, "I have a headache").await.unwrap();
        engine.take_turn(&mut state, "I have a fever").await.unwrap();
        engine.take_turn(&mut state, "hello").await;

        assert!(state.recognized().contains("headache"));
        assert!(state.recognized().contains("fever"));
        assert_eq!(state.recognized().len(), 2);
    }

    #[tokio::test]
    async fn every_turn_appends_two_history_entries() {
        let (engine, _) = failing_engine();
        let mut state = ConversationState::new();

        engine.take_turn(&mut state, "I have a headache").await.unwrap();
        engine.take_turn(&mut state, "").await;
        engine.take_turn(&mut state, "what about cold medicine").await.unwrap();

        // Two completed turns, the blank one produced none
        assert_eq!(state.history().len(), 4);
    }
}
