//! Markdown rendering for generated answers.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Render model output as HTML.
///
/// Raw HTML in the answer is emitted as escaped text, and links or images
/// pointing at script-capable schemes lose their target.
pub fn render_answer(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(sanitize);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lower = url.trim_start().to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_basic_markdown() {
        let html = render_answer("Il **TAEG** include:\n\n- interessi\n- spese di istruttoria\n");
        assert!(html.contains("<strong>TAEG</strong>"));
        assert!(html.contains("<li>interessi</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_answer("Testo <script>alert(1)</script> e <b>grassetto</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;grassetto&lt;/b&gt;"));
    }

    #[test]
    fn test_script_links_lose_target() {
        let html = render_answer("[clicca](javascript:alert(1)) e [guida](https://example.org/mutui)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"<a href="#">clicca</a>"##));
        assert!(html.contains(r#"<a href="https://example.org/mutui">guida</a>"#));
    }
}
