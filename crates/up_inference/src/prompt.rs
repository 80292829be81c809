use up_core::types::truncate_chars;
use up_core::ReferenceArticle;

/// Characters of the original article passed to the model.
pub const ORIGINAL_CONTENT_CAP: usize = 3000;

const REFERENCE_SEPARATOR: &str = "\n\n---\n\n";

/// Joins the reference bodies, each labelled with its position and URL.
pub fn reference_block(references: &[ReferenceArticle]) -> String {
    references
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Reference Article {} ({}):\n{}", i + 1, r.url, r.content))
        .collect::<Vec<_>>()
        .join(REFERENCE_SEPARATOR)
}

pub fn build_enhancement_prompt(title: &str, original_content: &str, references: &[ReferenceArticle]) -> String {
    format!(
        r#"You are an expert content writer. Rewrite and enhance the article below so that it matches the style, formatting and quality of the top-ranking reference articles that follow.

ORIGINAL ARTICLE:
Title: {title}
Content:
{content}

REFERENCE ARTICLES (top-ranking articles on the same topic):
{references}

INSTRUCTIONS:
1. Study the writing style, structure and formatting of the reference articles.
2. Rewrite the original article to match their quality and style.
3. Keep the core message and every fact of the original article.
4. Use structured formatting: headings, short paragraphs and lists where they help.
5. Make the result engaging, comprehensive and publication-ready.

OUTPUT FORMAT:
- Markdown only.
- Do NOT include or restate the title; output the article body only.

Enhanced Article Content:"#,
        title = title,
        content = truncate_chars(original_content, ORIGINAL_CONTENT_CAP),
        references = reference_block(references),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(url: &str, content: &str) -> ReferenceArticle {
        ReferenceArticle::new(url, Some("T".to_string()), content)
    }

    #[test]
    fn test_reference_block_keeps_order_and_urls() {
        let refs = vec![
            reference("https://a.example/blog/foo", "first body"),
            reference("https://b.example/blog/bar", "second body"),
        ];
        let block = reference_block(&refs);
        assert_eq!(
            block,
            "Reference Article 1 (https://a.example/blog/foo):\nfirst body\n\n---\n\nReference Article 2 (https://b.example/blog/bar):\nsecond body"
        );
    }

    #[test]
    fn test_prompt_truncates_original() {
        let original = "a".repeat(ORIGINAL_CONTENT_CAP + 500);
        let prompt = build_enhancement_prompt("My title", &original, &[reference("https://a.example/x/y", "ref")]);
        assert!(prompt.contains("Title: My title"));
        assert!(prompt.contains(&"a".repeat(ORIGINAL_CONTENT_CAP)));
        assert!(!prompt.contains(&"a".repeat(ORIGINAL_CONTENT_CAP + 1)));
        assert!(prompt.contains("Do NOT include or restate the title"));
        assert!(prompt.ends_with("Enhanced Article Content:"));
    }
}
