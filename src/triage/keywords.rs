//! Symptom keyword sets. Matching is case-insensitive substring search
//! against the free-text symptom description.

/// Symptoms that warrant immediate attention.
pub static CRITICAL_SYMPTOMS: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "severe bleeding",
    "unconscious",
    "difficulty breathing",
    "cardiac arrest",
    "severe trauma",
    "poisoning",
    "severe burns",
    "anaphylaxis",
    "seizure",
    "severe head injury",
];

/// Symptoms that need urgent evaluation.
pub static HIGH_PRIORITY_SYMPTOMS: &[&str] = &[
    "moderate bleeding",
    "broken bone",
    "severe pain",
    "high fever",
    "allergic reaction",
    "dehydration",
    "infection",
    "vomiting blood",
    "severe abdominal pain",
    "eye injury",
    "psychiatric emergency",
];

/// Generic discomfort words that still outrank a routine complaint.
pub static DISCOMFORT_SYMPTOMS: &[&str] = &["pain", "fever"];

/// Narrow set that escalates on sight, checked in this order.
pub static LIFE_THREATENING_SYMPTOMS: &[&str] =
    &["cardiac arrest", "no pulse", "unconscious", "severe bleeding"];

/// Keywords for the emergency-advice urgency bands.
pub static ADVICE_CRITICAL: &[&str] =
    &["chest pain", "heart attack", "stroke", "severe bleeding", "unconscious"];
pub static ADVICE_HIGH: &[&str] =
    &["difficulty breathing", "severe pain", "high fever", "allergic reaction"];

/// First keyword from `keywords` found in the already-lowercased text.
pub fn first_match(lower: &str, keywords: &[&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|kw| lower.contains(kw))
}

pub fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_respects_list_order() {
        let lower = "severe bleeding, patient now unconscious";
        assert_eq!(first_match(lower, LIFE_THREATENING_SYMPTOMS), Some("unconscious"));
    }

    #[test]
    fn substring_matching() {
        assert!(contains_any("acute chest pain radiating", CRITICAL_SYMPTOMS));
        assert!(contains_any("painful wrist", DISCOMFORT_SYMPTOMS));
        assert!(!contains_any("mild headache", HIGH_PRIORITY_SYMPTOMS));
    }

    #[test]
    fn keyword_lists_are_lowercase() {
        for list in [
            CRITICAL_SYMPTOMS,
            HIGH_PRIORITY_SYMPTOMS,
            DISCOMFORT_SYMPTOMS,
            LIFE_THREATENING_SYMPTOMS,
            ADVICE_CRITICAL,
            ADVICE_HIGH,
        ] {
            for kw in list {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }
}
