use std::collections::BTreeSet;

/// Fixed symptom keyword vocabulary scanned in every utterance.
const SYMPTOM_VOCABULARY: &[&str] = &[
    "headache",
    "fever",
    "cough",
    "cold",
    "stomach pain",
    "diarrhea",
    "back pain",
    "sore throat",
    "chest pain",
    "breathing",
    "nausea",
    "vomiting",
    "leg pain",
    "muscle pain",
];

/// Continuation markers that flag a turn as referring back to symptoms
/// already on the table. Single words match on word boundaries so that
/// "hand" or "standing" never counts as "and".
const CONTINUATION_MARKERS: &[&str] = &[
    "also",
    "and",
    "plus",
    "additionally",
    "more",
    "other",
    "else",
];

/// Pain-related vocabulary for the clarification heuristic.
const PAIN_WORDS: &[&str] = &["pain", "hurt", "ache"];

/// Inputs treated as a bare greeting. The whole message must be the
/// greeting; "hello, my head hurts" goes through normal triage.
const GREETINGS: &[&str] = &["hi", "hello", "hey", "hi there", "hello there"];

/// Scan an utterance for known symptom keywords plus compound heuristics.
///
/// Idempotent: the same utterance always yields the same set.
pub fn extract_symptoms(utterance: &str) -> BTreeSet<String> {
    let lower = utterance.to_lowercase();
    let mut found = BTreeSet::new();

    for keyword in SYMPTOM_VOCABULARY {
        if lower.contains(keyword) {
            found.insert((*keyword).to_string());
        }
    }

    // Compound phrasings the plain scan misses
    if lower.contains("pain in leg") || lower.contains("leg pain") {
        found.insert("leg pain".to_string());
    }
    if lower.contains("muscle") && lower.contains("pain") {
        found.insert("muscle pain".to_string());
    }
    if lower.contains("running") || lower.contains("exercise") {
        found.insert("exercise pain".to_string());
    }

    found
}

/// Is this turn a follow-up to symptoms already recognized?
///
/// True when the utterance carries a continuation marker AND the
/// recognized-symptom set is non-empty.
pub fn is_follow_up(utterance: &str, recognized: &BTreeSet<String>) -> bool {
    !recognized.is_empty() && has_continuation_marker(utterance)
}

fn has_continuation_marker(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    if lower.contains("what about") {
        return true;
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| CONTINUATION_MARKERS.contains(&word))
}

/// Is the whole input just a greeting?
pub fn is_greeting(utterance: &str) -> bool {
    let normalized: String = utterance
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    GREETINGS.contains(&normalized.trim())
}

/// Does the utterance use pain vocabulary at all?
pub fn mentions_pain(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    PAIN_WORDS.iter().any(|w| lower.contains(w))
}

/// Within a pain turn: does it point at the leg / activity strain?
pub fn pain_points_to_leg(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    lower.contains("leg") || lower.contains("running") || lower.contains("exercise")
}
