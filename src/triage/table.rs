use crate::models::Severity;

use super::types::{Guidance, Medicine, SymptomRecord};

/// Fixed symptom reference table.
///
/// Built once at process start and shared read-only by every chat
/// session. Keys are lowercase phrases matched as substrings of the
/// patient's utterance.
pub struct SymptomTable {
    records: Vec<SymptomRecord>,
}

fn medicine(name: &str, dose: &str, max_daily: &str) -> Medicine {
    Medicine {
        name: name.into(),
        dose: dose.into(),
        max_daily: max_daily.into(),
    }
}

fn non_severe(
    key: &str,
    severity: Severity,
    condition: &str,
    medicines: Vec<Medicine>,
    advice: &str,
) -> SymptomRecord {
    SymptomRecord {
        key: key.into(),
        guidance: Guidance::NonSevere {
            severity,
            condition: condition.into(),
            medicines,
            advice: advice.into(),
        },
    }
}

fn severe(key: &str, action: &str, advice: &str) -> SymptomRecord {
    SymptomRecord {
        key: key.into(),
        guidance: Guidance::Severe {
            action: action.into(),
            advice: advice.into(),
        },
    }
}

impl SymptomTable {
    /// The builtin table.
    pub fn builtin() -> Self {
        let records = vec![
            non_severe(
                "headache",
                Severity::Low,
                "a tension-type headache",
                vec![
                    medicine("Paracetamol", "500mg", "4 doses"),
                    medicine("Ibuprofen", "400mg", "3 doses"),
                ],
                "Rest in a quiet room, stay hydrated, and limit screen time.",
            ),
            non_severe(
                "fever",
                Severity::Medium,
                "a viral fever",
                vec![medicine("Paracetamol", "650mg", "4 doses")],
                "Drink plenty of fluids and rest. Check your temperature every few hours.",
            ),
            non_severe(
                "cough",
                Severity::Low,
                "an upper respiratory irritation",
                vec![medicine("Dextromethorphan syrup", "10ml", "4 doses")],
                "Warm fluids and honey can soothe the throat. Avoid cold drinks.",
            ),
            non_severe(
                "cold",
                Severity::Low,
                "a common cold",
                vec![
                    medicine("Cetirizine", "10mg", "1 dose"),
                    medicine("Paracetamol", "500mg", "4 doses"),
                ],
                "Rest, warm fluids, and steam inhalation usually help within a few days.",
            ),
            non_severe(
                "stomach pain",
                Severity::Medium,
                "gastric irritation",
                vec![
                    medicine("Omeprazole", "20mg", "1 dose"),
                    medicine("Simethicone", "40mg", "4 doses"),
                ],
                "Eat light meals and avoid spicy or oily food until it settles.",
            ),
            non_severe(
                "diarrhea",
                Severity::Medium,
                "acute diarrhea",
                vec![
                    medicine("Loperamide", "2mg", "4 doses"),
                    medicine("Oral rehydration salts", "1 sachet", "6 sachets"),
                ],
                "Keep drinking fluids with electrolytes. See a doctor if it lasts over two days.",
            ),
            non_severe(
                "back pain",
                Severity::Low,
                "muscular back strain",
                vec![
                    medicine("Ibuprofen", "400mg", "3 doses"),
                    medicine("Diclofenac gel", "apply thin layer", "4 applications"),
                ],
                "Gentle stretching and a warm compress help. Avoid heavy lifting.",
            ),
            non_severe(
                "sore throat",
                Severity::Low,
                "pharyngeal irritation",
                vec![medicine("Benzocaine lozenges", "1 lozenge", "8 lozenges")],
                "Gargle with warm salt water two or three times a day.",
            ),
            severe(
                "chest pain",
                "Please call emergency services or go to the nearest emergency room now.",
                "Do not drive yourself. Sit down, stay calm, and keep someone with you if possible.",
            ),
            severe(
                "breathing",
                "Difficulty breathing needs immediate medical attention. Please call emergency services now.",
                "Sit upright, loosen tight clothing, and avoid exertion while help is on the way.",
            ),
            non_severe(
                "nausea",
                Severity::Low,
                "transient nausea",
                vec![medicine("Domperidone", "10mg", "3 doses")],
                "Sip water slowly and prefer bland food like toast or rice.",
            ),
            non_severe(
                "vomiting",
                Severity::Medium,
                "acute vomiting",
                vec![medicine("Ondansetron", "4mg", "3 doses")],
                "Take small sips of an electrolyte drink. See a doctor if you cannot keep fluids down.",
            ),
            non_severe(
                "leg pain",
                Severity::Low,
                "a muscular leg strain",
                vec![
                    medicine("Ibuprofen", "400mg", "3 doses"),
                    medicine("Paracetamol", "500mg", "4 doses"),
                ],
                "Rest the leg, apply ice for 15 minutes a few times a day, and keep it elevated.",
            ),
            non_severe(
                "muscle pain",
                Severity::Low,
                "general muscle soreness",
                vec![medicine("Naproxen", "250mg", "2 doses")],
                "Light movement and a warm bath ease soreness. Stay hydrated.",
            ),
            non_severe(
                "exercise pain",
                Severity::Low,
                "exercise-related muscle strain",
                vec![medicine("Ibuprofen", "400mg", "3 doses")],
                "Take a break from training for a day or two and stretch gently before resuming.",
            ),
        ];

        Self { records }
    }

    /// All records, in table order.
    pub fn records(&self) -> &[SymptomRecord] {
        &self.records
    }

    /// Exact-key fetch.
    pub fn get(&self, key: &str) -> Option<&SymptomRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Case-insensitive substring lookup.
    ///
    /// When several keys match the input, the longest key wins, so
    /// "leg pain" is never shadowed by a shorter overlapping entry;
    /// equal-length ties go to the lexicographically earlier key.
    pub fn lookup(&self, free_text: &str) -> Option<&SymptomRecord> {
        let lower = free_text.to_lowercase();
        self.records
            .iter()
            .filter(|r| lower.contains(&r.key))
            .max_by(|a, b| {
                a.key
                    .len()
                    .cmp(&b.key.len())
                    .then_with(|| b.key.cmp(&a.key))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::types::Guidance;

    #[test]
    fn lookup_is_case_insensitive() {
        let table = SymptomTable::builtin();
        let record = table.lookup("I have a terrible HEADACHE today").unwrap();
        assert_eq!(record.key, "headache");
    }

    #[test]
    fn lookup_prefers_longest_match() {
        let table = SymptomTable::builtin();
        // "stomach pain" also contains no shorter key, but "leg pain"
        // competes with nothing shorter here; craft an input matching two keys.
        let record = table.lookup("bad cough and sore throat since monday").unwrap();
        assert_eq!(record.key, "sore throat", "longer key should win");
    }

    #[test]
    fn lookup_no_match_returns_none() {
        let table = SymptomTable::builtin();
        assert!(table.lookup("my ears are ringing").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn get_fetches_exact_key_only() {
        let table = SymptomTable::builtin();
        assert!(table.get("leg pain").is_some());
        assert!(table.get("leg").is_none());
    }

    /// Table-wide invariant: severe entries carry an action and no
    /// medicines; everything else carries a condition and at least one
    /// medicine with all fields filled in.
    #[test]
    fn builtin_table_invariants() {
        let table = SymptomTable::builtin();
        assert!(!table.records().is_empty());

        for record in table.records() {
            assert_eq!(record.key, record.key.to_lowercase());
            match &record.guidance {
                Guidance::Severe { action, advice } => {
                    assert!(!action.trim().is_empty(), "{}: empty action", record.key);
                    assert!(!advice.trim().is_empty(), "{}: empty advice", record.key);
                }
                Guidance::NonSevere {
                    severity,
                    condition,
                    medicines,
                    advice,
                } => {
                    assert_ne!(
                        *severity,
                        crate::models::Severity::Severe,
                        "{}: severe must use the severe variant",
                        record.key
                    );
                    assert!(!condition.trim().is_empty(), "{}: empty condition", record.key);
                    assert!(!medicines.is_empty(), "{}: no medicines", record.key);
                    assert!(!advice.trim().is_empty(), "{}: empty advice", record.key);
                    for m in medicines {
                        assert!(!m.name.is_empty() && !m.dose.is_empty() && !m.max_daily.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn builtin_table_keys_are_unique() {
        let table = SymptomTable::builtin();
        let mut keys: Vec<&str> = table.records().iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), table.records().len());
    }
}
