//! Estimated reading time of a post

use super::ContentBlock;
use crate::richtext::RichTextFormat;

/// Reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of words across all headings and bodies, in order
pub fn word_count<R: RichTextFormat + ?Sized>(content: &[ContentBlock], rich_text: &R) -> usize {
    content
        .iter()
        .map(|block| {
            let heading = block.heading.as_deref().unwrap_or("");
            let body = rich_text.to_plain_text(&block.body);
            heading.split_whitespace().count() + body.split_whitespace().count()
        })
        .sum()
}

/// Minutes needed to read `content`, rounded up
pub fn estimate_read_minutes<R: RichTextFormat + ?Sized>(
    content: &[ContentBlock],
    rich_text: &R,
) -> usize {
    word_count(content, rich_text).div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::{PrismicRichText, RichTextNode};

    fn words(n: usize) -> String {
        vec!["lorem"; n].join(" ")
    }

    fn block(heading: &str, body: &str) -> ContentBlock {
        ContentBlock {
            heading: Some(heading.to_string()),
            body: vec![RichTextNode::paragraph(body)],
        }
    }

    /// Treats each node's text verbatim, so tests control the exact input
    struct RawText;

    impl RichTextFormat for RawText {
        fn to_plain_text(&self, body: &[RichTextNode]) -> String {
            body.iter()
                .filter_map(RichTextNode::text_block)
                .map(|b| b.text.clone())
                .collect()
        }

        fn to_html(&self, _body: &[RichTextNode]) -> String {
            String::new()
        }
    }

    #[test]
    fn test_empty_content_is_zero() {
        assert_eq!(estimate_read_minutes(&[], &PrismicRichText), 0);
    }

    #[test]
    fn test_headings_count_as_words() {
        let content = vec![block("Intro", &words(150)), block("Body", &words(260))];
        assert_eq!(word_count(&content, &PrismicRichText), 412);
        assert_eq!(estimate_read_minutes(&content, &PrismicRichText), 3);
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(estimate_read_minutes(&[block("", &words(200))], &RawText), 1);
        assert_eq!(estimate_read_minutes(&[block("", &words(201))], &RawText), 2);
        assert_eq!(estimate_read_minutes(&[block("a", "")], &RawText), 1);
    }

    #[test]
    fn test_heading_and_body_do_not_merge() {
        // "Title" and "word" must stay two words even without a separator
        assert_eq!(word_count(&[block("Title", "word")], &RawText), 2);
    }

    #[test]
    fn test_whitespace_changes_do_not_change_estimate() {
        let tight = vec![block("Intro", "one two three")];
        let loose = vec![block("  Intro ", "\n one \t two   three \n")];
        assert_eq!(
            word_count(&tight, &RawText),
            word_count(&loose, &RawText)
        );
        assert_eq!(word_count(&loose, &RawText), 4);
    }

    #[test]
    fn test_missing_heading() {
        let content = vec![ContentBlock {
            heading: None,
            body: vec![RichTextNode::paragraph(words(10))],
        }];
        assert_eq!(word_count(&content, &PrismicRichText), 10);
    }
}
