// src/classify/prompt.rs
//! Prompt batching and rendering: fixed-size article batches substituted
//! into a two-placeholder template.

use crate::ingest::types::Article;

/// Template shipped with the binary. Placeholders: `{{articles_block}}`,
/// `{{topic}}`.
pub const FILTER_PROMPT_TEMPLATE: &str = include_str!("../../prompts/filter_prompt.txt");

/// Contiguous slices of at most `batch_size` articles covering the input
/// exactly once, in order. The last batch may be shorter.
pub fn build_batches<T>(items: &[T], batch_size: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    items.chunks(batch_size.max(1)).collect()
}

fn article_block(article: &Article) -> String {
    format!(
        "Title: {}\nSummary: {}",
        article.title.trim(),
        article.summary.trim()
    )
}

/// Render one batch into the prompt template: articles as
/// `[ARTICLE i]` blocks (1-indexed, blank-line separated).
pub fn render_prompt(batch: &[Article], topic: &str, template: &str) -> String {
    let blocks: Vec<String> = batch
        .iter()
        .enumerate()
        .map(|(i, a)| format!("[ARTICLE {}]\n{}", i + 1, article_block(a)))
        .collect();

    template
        .replace("{{articles_block}}", &blocks.join("\n\n"))
        .replace("{{topic}}", topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(n: usize) -> Article {
        Article {
            title: format!("Numbered headline for article {n}"),
            link: format!("https://example.com/{n}"),
            summary: format!("Summary {n}"),
            raw_content: String::new(),
            image_url: None,
            source: "test".to_string(),
            classification: None,
        }
    }

    #[test]
    fn batches_cover_input_exactly_once_in_order() {
        let items: Vec<Article> = (0..7).map(article).collect();
        let batches = build_batches(&items, 3);

        assert_eq!(batches.len(), 3); // ceil(7 / 3)
        assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), 7);
        let rejoined: Vec<&Article> = batches.iter().flat_map(|b| b.iter()).collect();
        let original: Vec<&Article> = items.iter().collect();
        assert_eq!(rejoined, original);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let items: Vec<Article> = Vec::new();
        assert!(build_batches(&items, 10).is_empty());
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let batch: Vec<Article> = (1..=2).map(article).collect();
        let out = render_prompt(&batch, "education", "T: {{topic}}\n{{articles_block}}");

        assert!(out.starts_with("T: education\n"));
        assert!(out.contains("[ARTICLE 1]\nTitle: Numbered headline for article 1\nSummary: Summary 1"));
        assert!(out.contains("\n\n[ARTICLE 2]\n"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn builtin_template_carries_placeholders() {
        assert!(FILTER_PROMPT_TEMPLATE.contains("{{articles_block}}"));
        assert!(FILTER_PROMPT_TEMPLATE.contains("{{topic}}"));
    }
}
