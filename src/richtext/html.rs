//! Rich text to HTML serialization

use super::node::{RichTextNode, Span, TextBlock};

/// Serialize a rich-text field into HTML
pub fn render(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for node in nodes {
        let list_tag = match node {
            RichTextNode::ListItem(_) => Some("ul"),
            RichTextNode::OrderedListItem(_) => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        match node {
            RichTextNode::Paragraph(b) => wrap(&mut out, "p", b),
            RichTextNode::Heading1(b) => wrap(&mut out, "h1", b),
            RichTextNode::Heading2(b) => wrap(&mut out, "h2", b),
            RichTextNode::Heading3(b) => wrap(&mut out, "h3", b),
            RichTextNode::Heading4(b) => wrap(&mut out, "h4", b),
            RichTextNode::Heading5(b) => wrap(&mut out, "h5", b),
            RichTextNode::Heading6(b) => wrap(&mut out, "h6", b),
            RichTextNode::Preformatted(b) => wrap(&mut out, "pre", b),
            RichTextNode::ListItem(b) | RichTextNode::OrderedListItem(b) => {
                wrap(&mut out, "li", b)
            }
            RichTextNode::Image(image) => {
                out.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    escape(&image.url),
                    escape(image.alt.as_deref().unwrap_or(""))
                ));
            }
            RichTextNode::Embed(embed) => {
                let oembed = &embed.oembed;
                // Provider markup is inserted as-is.
                out.push_str(&format!(
                    r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                    escape(oembed.embed_url.as_deref().unwrap_or("")),
                    escape(oembed.kind.as_deref().unwrap_or("")),
                    escape(oembed.provider_name.as_deref().unwrap_or("")),
                    oembed.html.as_deref().unwrap_or("")
                ));
            }
            RichTextNode::Unsupported => {}
        }
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    out
}

fn wrap(out: &mut String, tag: &str, block: &TextBlock) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&render_inline(block));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Render text with its spans applied.
///
/// Overlapping spans are closed and reopened at each boundary so the output
/// stays well nested.
fn render_inline(block: &TextBlock) -> String {
    let offsets = utf16_byte_offsets(&block.text);
    let text_len = offsets.last().map(|(u, _)| *u).unwrap_or(0);

    let mut spans: Vec<&Span> = block
        .spans
        .iter()
        .filter(|s| s.start < s.end && s.start < text_len)
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut boundaries: Vec<usize> = vec![0, text_len];
    for span in &spans {
        boundaries.push(span.start);
        boundaries.push(span.end.min(text_len));
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut out = String::new();
    let mut stack: Vec<&Span> = Vec::new();

    for window in boundaries.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active: Vec<&Span> = spans
            .iter()
            .copied()
            .filter(|s| s.start <= from && s.end >= to)
            .collect();

        let common = stack
            .iter()
            .zip(active.iter())
            .take_while(|(a, b)| std::ptr::eq(**a, **b))
            .count();

        for span in stack[common..].iter().rev() {
            out.push_str(close_tag(span));
        }
        for span in &active[common..] {
            out.push_str(&open_tag(span));
        }
        stack = active;

        let text = &block.text[byte_at(&offsets, from)..byte_at(&offsets, to)];
        out.push_str(&escape(text).replace('\n', "<br />"));
    }

    for span in stack.iter().rev() {
        out.push_str(close_tag(span));
    }

    out
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let href = escape(data.url.as_deref().unwrap_or(""));
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener noreferrer">"#,
                    href,
                    escape(&target)
                ),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        "label" => format!(
            r#"<span class="{}">"#,
            escape(data.label.as_deref().unwrap_or(""))
        ),
        _ => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

/// Pairs of (UTF-16 offset, byte offset) for every char boundary, including
/// the end of the string
fn utf16_byte_offsets(text: &str) -> Vec<(usize, usize)> {
    let mut offsets = Vec::with_capacity(text.len() + 1);
    let mut units = 0;
    for (byte, c) in text.char_indices() {
        offsets.push((units, byte));
        units += c.len_utf16();
    }
    offsets.push((units, text.len()));
    offsets
}

/// Byte offset for a UTF-16 offset, rounded down to a char boundary
fn byte_at(offsets: &[(usize, usize)], units: usize) -> usize {
    match offsets.binary_search_by(|(u, _)| u.cmp(&units)) {
        Ok(i) => offsets[i].1,
        Err(i) => offsets[i.saturating_sub(1)].1,
    }
}

/// HTML escaping for text and attribute values
pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
