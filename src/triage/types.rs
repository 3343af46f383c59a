use serde::{Deserialize, Serialize};

use crate::models::Severity;

/// One over-the-counter medicine suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub dose: String,
    pub max_daily: String,
}

/// What the table recommends for a symptom.
///
/// Severe complaints carry an urgent action and no medication list;
/// everything else carries a condition label and a non-empty medication
/// list. The split is structural so a severe record cannot accidentally
/// hold medicines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Guidance {
    Severe {
        action: String,
        advice: String,
    },
    NonSevere {
        severity: Severity,
        condition: String,
        medicines: Vec<Medicine>,
        advice: String,
    },
}

/// One entry of the symptom table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRecord {
    pub key: String,
    pub guidance: Guidance,
}

impl SymptomRecord {
    pub fn severity(&self) -> Severity {
        match &self.guidance {
            Guidance::Severe { .. } => Severity::Severe,
            Guidance::NonSevere { severity, .. } => *severity,
        }
    }

    pub fn advice(&self) -> &str {
        match &self.guidance {
            Guidance::Severe { advice, .. } => advice,
            Guidance::NonSevere { advice, .. } => advice,
        }
    }

    pub fn medicines(&self) -> &[Medicine] {
        match &self.guidance {
            Guidance::Severe { .. } => &[],
            Guidance::NonSevere { medicines, .. } => medicines,
        }
    }
}

/// The composed output of one turn.
///
/// `text` is plain text; the only markup conventions are `**bold**`
/// markers and literal newlines, rendered by the UI shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub text: String,
    pub ends_with_question: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severe_record() -> SymptomRecord {
        SymptomRecord {
            key: "chest pain".into(),
            guidance: Guidance::Severe {
                action: "Please seek emergency care now.".into(),
                advice: "Do not drive yourself.".into(),
            },
        }
    }

    #[test]
    fn severe_record_has_no_medicines() {
        let record = severe_record();
        assert_eq!(record.severity(), Severity::Severe);
        assert!(record.medicines().is_empty());
    }

    #[test]
    fn non_severe_record_exposes_medicines() {
        let record = SymptomRecord {
            key: "headache".into(),
            guidance: Guidance::NonSevere {
                severity: Severity::Low,
                condition: "tension headache".into(),
                medicines: vec![Medicine {
                    name: "Paracetamol".into(),
                    dose: "500mg".into(),
                    max_daily: "4 doses".into(),
                }],
                advice: "Rest and hydrate.".into(),
            },
        };
        assert_eq!(record.severity(), Severity::Low);
        assert_eq!(record.medicines().len(), 1);
        assert_eq!(record.advice(), "Rest and hydrate.");
    }

    #[test]
    fn guidance_serializes_tagged() {
        let json = serde_json::to_string(&severe_record().guidance).unwrap();
        assert!(json.contains("\"kind\":\"severe\""));
        assert!(!json.contains("medicines"));
    }
}
