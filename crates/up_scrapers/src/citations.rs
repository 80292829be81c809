use std::fmt::Write;
use up_core::ReferenceArticle;

pub const CITATION_HEADER: &str = "\n\n---\n\n## References\n\n";

const UNTITLED_SOURCE: &str = "Source";

/// Appends a numbered markdown link list, one entry per reference, in order.
pub fn append_citations(body: &str, references: &[ReferenceArticle]) -> String {
    let mut out = String::with_capacity(body.len() + CITATION_HEADER.len() + references.len() * 64);
    out.push_str(body);
    out.push_str(CITATION_HEADER);
    for (i, reference) in references.iter().enumerate() {
        let title = reference.title.as_deref().unwrap_or(UNTITLED_SOURCE);
        let _ = writeln!(out, "{}. [{}]({})", i + 1, title, reference.url);
    }
    out
}
