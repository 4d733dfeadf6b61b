pub mod email;

use crate::ingest::types::Article;

/// One line of the outgoing digest, ready for templating.
#[derive(Debug, Clone)]
pub struct DigestItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub source: String,
    pub image_url: Option<String>,
    pub score_info: String,
}

/// Map ranked articles into delivery items. Titles are prefixed with the
/// score so the ranking survives plain-text mail clients.
pub fn digest_items(articles: &[Article]) -> Vec<DigestItem> {
    articles
        .iter()
        .map(|a| {
            let score = a.relevance_score();
            DigestItem {
                title: format!("[{score}/100] {}", a.title),
                link: a.link.clone(),
                summary: a.summary.clone(),
                source: a.source.clone(),
                image_url: a.image_url.clone(),
                score_info: format!("Relevance Score: {score}/100"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Classification;

    #[test]
    fn items_carry_score_prefix_and_info() {
        let article = Article {
            title: "Exam results are out today".to_string(),
            link: "https://example.com/a".to_string(),
            summary: "Short summary".to_string(),
            raw_content: String::new(),
            image_url: None,
            source: "RSS Feed - example.com".to_string(),
            classification: Some(Classification {
                is_relevant: true,
                region: "India".to_string(),
                content_type: "general".to_string(),
                reasoning: String::new(),
                relevance_score: 80,
                score_breakdown: String::new(),
            }),
        };
        let items = digest_items(&[article]);
        assert_eq!(items[0].title, "[80/100] Exam results are out today");
        assert_eq!(items[0].score_info, "Relevance Score: 80/100");
        assert_eq!(items[0].source, "RSS Feed - example.com");
    }
}
