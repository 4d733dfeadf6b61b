// src/rank.rs
//! Final filter + ranking: match classified articles against the user's
//! criteria, sort by relevance score, truncate.

use crate::ingest::types::Article;

#[derive(Debug, Clone)]
pub struct RankCriteria {
    pub region: String,
    pub content_type: String,
}

/// An article passes only if it has a classification whose region and
/// content type match the criteria (case-insensitive exact) and which is
/// marked relevant. A missing classification is an automatic fail, not an
/// error — upstream already excludes such articles, but that is not assumed
/// here.
pub fn matches_criteria(article: &Article, criteria: &RankCriteria) -> bool {
    match &article.classification {
        Some(c) => {
            c.is_relevant
                && c.region.eq_ignore_ascii_case(&criteria.region)
                && c.content_type.eq_ignore_ascii_case(&criteria.content_type)
        }
        None => false,
    }
}

/// Filter by criteria, sort by relevance score descending (stable: ties keep
/// input order), truncate to `max_count`.
pub fn rank_articles(
    articles: Vec<Article>,
    criteria: &RankCriteria,
    max_count: usize,
) -> Vec<Article> {
    let mut passed: Vec<Article> = articles
        .into_iter()
        .filter(|a| matches_criteria(a, criteria))
        .collect();

    passed.sort_by(|a, b| b.relevance_score().cmp(&a.relevance_score()));
    passed.truncate(max_count);
    passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Classification;

    fn criteria() -> RankCriteria {
        RankCriteria {
            region: "India".to_string(),
            content_type: "General".to_string(),
        }
    }

    fn classified(id: usize, score: u8, is_relevant: bool, region: &str, ct: &str) -> Article {
        Article {
            title: format!("Ranked headline number {id}"),
            link: format!("https://example.com/{id}"),
            summary: String::new(),
            raw_content: String::new(),
            image_url: None,
            source: "test".to_string(),
            classification: Some(Classification {
                is_relevant,
                region: region.to_string(),
                content_type: ct.to_string(),
                reasoning: String::new(),
                relevance_score: score,
                score_breakdown: String::new(),
            }),
        }
    }

    #[test]
    fn criteria_match_is_case_insensitive() {
        let a = classified(1, 80, true, "india", "general");
        assert!(matches_criteria(&a, &criteria()));

        let b = classified(2, 80, true, "Global", "general");
        assert!(!matches_criteria(&b, &criteria()));

        let c = classified(3, 80, true, "india", "Sensitive");
        assert!(!matches_criteria(&c, &criteria()));

        let d = classified(4, 80, false, "india", "general");
        assert!(!matches_criteria(&d, &criteria()));
    }

    #[test]
    fn missing_classification_never_passes() {
        let mut a = classified(1, 80, true, "India", "General");
        a.classification = None;
        assert!(!matches_criteria(&a, &criteria()));
        assert!(rank_articles(vec![a], &criteria(), 10).is_empty());
    }

    #[test]
    fn sorts_descending_with_stable_ties_and_truncates() {
        let input = vec![
            classified(1, 30, true, "India", "General"),
            classified(2, 90, true, "India", "General"),
            classified(3, 60, true, "India", "General"),
            classified(4, 90, true, "India", "General"),
        ];
        let out = rank_articles(input, &criteria(), 2);
        assert_eq!(out.len(), 2);
        // The two score-90 articles, in their original relative order.
        assert_eq!(out[0].link, "https://example.com/2");
        assert_eq!(out[1].link, "https://example.com/4");
    }

    #[test]
    fn truncation_only_applies_after_sorting() {
        let input = vec![
            classified(1, 10, true, "India", "General"),
            classified(2, 100, true, "India", "General"),
        ];
        let out = rank_articles(input, &criteria(), 1);
        assert_eq!(out[0].relevance_score(), 100);
    }
}
