use std::collections::BTreeSet;

use crate::models::Severity;

use super::types::{Guidance, ReplyEnvelope, SymptomRecord};

/// Closing line of every triage reply; keeps the conversation open.
pub const CONTINUATION_INVITE: &str = "Do you have any other symptoms or questions?";

/// Monitoring warning appended to medium-severity replies.
pub const MONITORING_WARNING: &str =
    "Please monitor your symptoms, and see a doctor if they get worse or last more than 48 hours.";

/// Opening message of a new chat session.
pub const GREETING: &str = "Hello! I'm TriageCare AI, your medical intake assistant. \
    Please describe your symptoms or health concerns, and I'll help guide you to the appropriate care.";

/// Uniform recovery reply when the generation backend is unreachable.
pub const CONNECTION_TROUBLE: &str = "I apologize, but I'm having trouble connecting right now. \
    Could you tell me a bit more about your symptoms, such as where it hurts, \
    how strong it is, and how long it has lasted?";

/// Reply template builder.
///
/// Output is plain text; `**bold**` markers and literal newlines are the
/// only formatting contract with the UI shell.
pub struct ReplyTemplates;

impl ReplyTemplates {
    /// Structured reply for a table record.
    ///
    /// Severe: severity banner, urgent action, advice. Low/medium:
    /// severity banner, condition, itemized medicines in record order,
    /// advice, plus the monitoring warning for medium.
    pub fn structured(record: &SymptomRecord) -> ReplyEnvelope {
        let mut lines = vec![format!("Severity: **{}**", record.severity().banner())];

        match &record.guidance {
            Guidance::Severe { action, advice } => {
                lines.push(action.clone());
                lines.push(advice.clone());
            }
            Guidance::NonSevere {
                severity,
                condition,
                medicines,
                advice,
            } => {
                lines.push(format!("This looks like {condition}."));
                lines.push("Recommended medicines:".to_string());
                for m in medicines {
                    lines.push(format!("- **{}**: {}, max {} daily", m.name, m.dose, m.max_daily));
                }
                lines.push(advice.clone());
                if *severity == Severity::Medium {
                    lines.push(MONITORING_WARNING.to_string());
                }
            }
        }

        lines.push(CONTINUATION_INVITE.to_string());
        ReplyEnvelope {
            text: lines.join("\n"),
            ends_with_question: true,
        }
    }

    /// Follow-up reply scoped to one record (the cough/cold path).
    pub fn follow_up_scoped(record: &SymptomRecord) -> ReplyEnvelope {
        match &record.guidance {
            // A severe record has no medication list to scope to.
            Guidance::Severe { .. } => Self::structured(record),
            Guidance::NonSevere { medicines, advice, .. } => {
                let mut lines = vec![
                    format!("About your **{}**:", record.key),
                    "Recommended medicines:".to_string(),
                ];
                for m in medicines {
                    lines.push(format!("- **{}**: {}, max {} daily", m.name, m.dose, m.max_daily));
                }
                lines.push(advice.clone());
                lines.push(CONTINUATION_INVITE.to_string());
                ReplyEnvelope {
                    text: lines.join("\n"),
                    ends_with_question: true,
                }
            }
        }
    }

    /// Generic follow-up reply listing everything recognized so far.
    pub fn follow_up_overview(recognized: &BTreeSet<String>) -> ReplyEnvelope {
        let listed = recognized.iter().cloned().collect::<Vec<_>>().join(", ");
        ReplyEnvelope {
            text: format!(
                "So far you've mentioned: **{listed}**.\nCould you tell me more about \
                 any of these, or is there a new symptom you'd like to discuss?"
            ),
            ends_with_question: true,
        }
    }

    /// Clarifying questions for pain without a recognizable location.
    pub fn pain_clarification() -> ReplyEnvelope {
        ReplyEnvelope {
            text: "I'd like to understand your pain a little better.\n\
                   - Where exactly is the pain?\n\
                   - How intense is it, on a scale of 1 to 10?\n\
                   - How long has it lasted?\n\
                   - Did anything in particular bring it on?"
                .to_string(),
            ends_with_question: true,
        }
    }

    /// Canned session-opening greeting.
    pub fn greeting() -> ReplyEnvelope {
        ReplyEnvelope {
            text: GREETING.to_string(),
            ends_with_question: false,
        }
    }

    /// Recovery reply for a failed generation call.
    pub fn connection_trouble() -> ReplyEnvelope {
        ReplyEnvelope {
            text: CONNECTION_TROUBLE.to_string(),
            ends_with_question: true,
        }
    }

    /// Wrap text returned by the generation backend.
    pub fn from_generated(text: String) -> ReplyEnvelope {
        let ends_with_question = text.trim_end().ends_with('?');
        ReplyEnvelope {
            text,
            ends_with_question,
        }
    }
}
