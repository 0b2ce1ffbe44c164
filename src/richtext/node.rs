//! Structured rich-text nodes as delivered by the CMS

use serde::{Deserialize, Serialize};

/// One block of a rich-text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RichTextNode {
    #[serde(rename = "paragraph")]
    Paragraph(TextBlock),
    #[serde(rename = "heading1")]
    Heading1(TextBlock),
    #[serde(rename = "heading2")]
    Heading2(TextBlock),
    #[serde(rename = "heading3")]
    Heading3(TextBlock),
    #[serde(rename = "heading4")]
    Heading4(TextBlock),
    #[serde(rename = "heading5")]
    Heading5(TextBlock),
    #[serde(rename = "heading6")]
    Heading6(TextBlock),
    #[serde(rename = "preformatted")]
    Preformatted(TextBlock),
    #[serde(rename = "list-item")]
    ListItem(TextBlock),
    #[serde(rename = "o-list-item")]
    OrderedListItem(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "embed")]
    Embed(EmbedBlock),
    /// Node types this renderer does not know about
    #[serde(other)]
    Unsupported,
}

impl RichTextNode {
    /// Text payload of the node, if it carries any
    pub fn text_block(&self) -> Option<&TextBlock> {
        match self {
            RichTextNode::Paragraph(b)
            | RichTextNode::Heading1(b)
            | RichTextNode::Heading2(b)
            | RichTextNode::Heading3(b)
            | RichTextNode::Heading4(b)
            | RichTextNode::Heading5(b)
            | RichTextNode::Heading6(b)
            | RichTextNode::Preformatted(b)
            | RichTextNode::ListItem(b)
            | RichTextNode::OrderedListItem(b) => Some(b),
            RichTextNode::Image(_) | RichTextNode::Embed(_) | RichTextNode::Unsupported => None,
        }
    }

    /// Shorthand for a plain paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        RichTextNode::Paragraph(TextBlock {
            text: text.into(),
            spans: Vec::new(),
        })
    }
}

/// Text with inline formatting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// Inline formatting over a range of the text.
///
/// `start` and `end` are UTF-16 code unit offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbedBlock {
    #[serde(default)]
    pub oembed: Oembed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Oembed {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}
