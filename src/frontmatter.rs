//! Front matter extraction
//!
//! Locates the `---` delimited block at the head of a document.

use regex::Regex;
use std::sync::OnceLock;

/// Cached regex for delimiter lines
static DELIMITER_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_delimiter_regex() -> &'static Regex {
    DELIMITER_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^---\r?\n").expect("Failed to compile front matter delimiter regex")
    })
}

/// Outcome of looking for the front matter block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<'a> {
    /// No delimiter line at all
    Missing,
    /// Only an opening delimiter
    Unterminated,
    /// Text between the first and second delimiter
    Block(FrontMatterBlock<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterBlock<'a> {
    pub text: &'a str,
    /// Lines spanned by the block, counting one for the opening delimiter
    pub num_lines: usize,
}

/// Whether the document ends with a line terminator
pub fn has_trailing_newline(content: &str) -> bool {
    content.ends_with('\n')
}

/// One-based line number of the last line of `content`
pub fn last_line_number(content: &str) -> usize {
    1 + content.matches('\n').count()
}

/// Extract the front matter block from raw document text.
///
/// Delimiters after the second one belong to the document body.
pub fn extract(content: &str) -> Extraction<'_> {
    let mut delimiters = get_delimiter_regex().find_iter(content);

    let Some(open) = delimiters.next() else {
        return Extraction::Missing;
    };
    let Some(close) = delimiters.next() else {
        return Extraction::Unterminated;
    };

    let text = &content[open.end()..close.start()];
    Extraction::Block(FrontMatterBlock {
        text,
        num_lines: 1 + text.matches('\n').count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_block() {
        let content = "---\ntitle: Hello\nweight: 3\n---\n# Body\n";
        match extract(content) {
            Extraction::Block(block) => {
                assert_eq!(block.text, "title: Hello\nweight: 3\n");
                assert_eq!(block.num_lines, 3);
            }
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_missing() {
        assert_eq!(extract("# Just markdown\n"), Extraction::Missing);
        assert_eq!(extract(""), Extraction::Missing);
        // Delimiters must start a line and be terminated
        assert_eq!(extract("text ---\nmore\n"), Extraction::Missing);
        assert_eq!(extract("----\n"), Extraction::Missing);
    }

    #[test]
    fn test_extract_unterminated() {
        assert_eq!(
            extract("---\ntitle: Hello\n# Body\n"),
            Extraction::Unterminated
        );
    }

    #[test]
    fn test_later_delimiters_are_content() {
        let content = "---\ntitle: First\n---\nBody\n---\nnot: metadata\n---\n";
        match extract(content) {
            Extraction::Block(block) => assert_eq!(block.text, "title: First\n"),
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_delimiters() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        match extract(content) {
            Extraction::Block(block) => {
                assert_eq!(block.text, "title: Windows\r\n");
                assert_eq!(block.num_lines, 2);
            }
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_block() {
        match extract("---\n---\n") {
            Extraction::Block(block) => {
                assert_eq!(block.text, "");
                assert_eq!(block.num_lines, 1);
            }
            other => panic!("Expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_newline_helpers() {
        assert!(has_trailing_newline("a\n"));
        assert!(!has_trailing_newline("a"));
        assert!(!has_trailing_newline(""));
        assert_eq!(last_line_number("a\nb"), 2);
        assert_eq!(last_line_number("no newline"), 1);
    }
}
