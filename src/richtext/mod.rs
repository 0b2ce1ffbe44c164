//! Rich text helper - plain text extraction and HTML serialization
//!
//! The CMS delivers formatted content as a sequence of typed nodes
//! (paragraphs, headings, list items, images, embeds). Rendering code only
//! sees the [`RichTextFormat`] trait, so tests can swap in a fake.

mod html;
mod node;

pub use node::{EmbedBlock, ImageBlock, Oembed, RichTextNode, Span, SpanData, TextBlock};

/// Conversion of a rich-text field into display formats
pub trait RichTextFormat: Send + Sync {
    /// Text of the field with all structure removed
    fn to_plain_text(&self, body: &[RichTextNode]) -> String;

    /// HTML for the field. The output is not sanitized.
    fn to_html(&self, body: &[RichTextNode]) -> String;
}

/// Serializer for Prismic-style rich text
#[derive(Debug, Clone, Copy, Default)]
pub struct PrismicRichText;

impl RichTextFormat for PrismicRichText {
    fn to_plain_text(&self, body: &[RichTextNode]) -> String {
        body.iter()
            .filter_map(RichTextNode::text_block)
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_html(&self, body: &[RichTextNode]) -> String {
        html::render(body)
    }
}

pub(crate) use html::escape as escape_html;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_joins_blocks() {
        let body = vec![
            RichTextNode::Heading3(TextBlock {
                text: "Heading".to_string(),
                spans: Vec::new(),
            }),
            RichTextNode::paragraph("first paragraph"),
            RichTextNode::Image(ImageBlock::default()),
            RichTextNode::paragraph("second"),
        ];
        assert_eq!(
            PrismicRichText.to_plain_text(&body),
            "Heading first paragraph second"
        );
    }

    #[test]
    fn test_plain_text_of_empty_body() {
        assert_eq!(PrismicRichText.to_plain_text(&[]), "");
    }

    #[test]
    fn test_deserialize_prismic_body() {
        let json = r#"[
            {"type": "paragraph", "text": "Hello world", "spans": [
                {"start": 0, "end": 5, "type": "strong"}
            ]},
            {"type": "list-item", "text": "item", "spans": []},
            {"type": "image", "url": "https://images.prismic.io/x.png", "alt": null,
             "dimensions": {"width": 10, "height": 10}},
            {"type": "some-future-node", "whatever": true}
        ]"#;
        let body: Vec<RichTextNode> = serde_json::from_str(json).unwrap();
        assert_eq!(body.len(), 4);
        assert_eq!(body[3], RichTextNode::Unsupported);
        assert_eq!(
            PrismicRichText.to_html(&body),
            "<p><strong>Hello</strong> world</p><ul><li>item</li></ul>\
             <p class=\"block-img\"><img src=\"https://images.prismic.io/x.png\" alt=\"\" /></p>"
        );
    }
}
