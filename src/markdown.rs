//! Markdown → HTML for chat messages.

use pulldown_cmark::{html, Options, Parser};

/// Pure markdown renderer used for every chat message body.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer with tables and strikethrough enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        render_markdown(markdown)
    }
}

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_paragraph_and_code_fence() {
        assert_eq!(render_markdown("Hello"), "<p>Hello</p>\n");
        let html = render_markdown("Calling function:\n```json\n{}\n```");
        assert!(html.contains("<code class=\"language-json\">"));
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render_markdown(""), "");
        assert_eq!(CommonMarkRenderer.render("  "), "");
    }
}
