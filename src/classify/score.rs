// src/classify/score.rs
//! Deterministic relevance scoring. The score is a pure function of the
//! model's classification fields — any score the model itself claims is
//! ignored.

use crate::classify::parse::RawClassification;

pub const POINTS_TOPIC_MATCH: u8 = 60;
pub const POINTS_REGION_INDIA: u8 = 10;
pub const POINTS_CONTENT_GENERAL: u8 = 10;

/// Additive rule set, applied independently. Returns the 0-100 score plus a
/// human-readable breakdown listing the rules that fired, in rule order.
pub fn score_classification(raw: &RawClassification, topic: &str) -> (u8, String) {
    let mut score = 0u8;
    let mut reasons: Vec<String> = Vec::new();

    if raw.is_relevant {
        score += POINTS_TOPIC_MATCH;
        reasons.push(format!("Matched topic: {topic}"));
    }
    if raw.region.eq_ignore_ascii_case("india") {
        score += POINTS_REGION_INDIA;
        reasons.push("Region = India".to_string());
    }
    if raw.content_type.eq_ignore_ascii_case("general") {
        score += POINTS_CONTENT_GENERAL;
        reasons.push("Content Type = General".to_string());
    }

    (score, reasons.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(is_relevant: bool, region: &str, content_type: &str) -> RawClassification {
        RawClassification {
            is_relevant,
            region: region.to_string(),
            content_type: content_type.to_string(),
            reasoning: String::new(),
        }
    }

    #[test]
    fn all_rules_fire() {
        let (score, breakdown) = score_classification(&raw(true, "India", "General"), "education");
        assert_eq!(score, 80);
        assert_eq!(
            breakdown,
            "Matched topic: education, Region = India, Content Type = General"
        );
        assert_eq!(breakdown.split(", ").count(), 3);
    }

    #[test]
    fn no_rules_fire() {
        let (score, breakdown) =
            score_classification(&raw(false, "Global", "Sensitive"), "education");
        assert_eq!(score, 0);
        assert!(breakdown.is_empty());
    }

    #[test]
    fn field_matching_is_case_insensitive() {
        let (score, _) = score_classification(&raw(false, "INDIA", "gEnErAl"), "any");
        assert_eq!(score, 20);
    }

    #[test]
    fn relevance_alone_scores_sixty() {
        let (score, breakdown) = score_classification(&raw(true, "Global", "opinion"), "science");
        assert_eq!(score, 60);
        assert_eq!(breakdown, "Matched topic: science");
    }
}
