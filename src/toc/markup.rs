//! Markup lexer used by the content annotator
//!
//! Splits an HTML fragment into a flat stream of tokens with byte spans, so
//! callers can match elements structurally and splice the source without
//! re-serializing it. Comments and raw-text elements (`<script>`, `<style>`,
//! ...) are single opaque tokens, which keeps tag-looking text inside them
//! from being mistaken for markup.

use std::ops::Range;
use thiserror::Error;

/// Elements whose content is never parsed as markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Lexing errors; only reachable at end of input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unterminated tag at byte {offset}")]
    UnterminatedTag { offset: usize },

    #[error("Unterminated comment at byte {offset}")]
    UnterminatedComment { offset: usize },
}

impl MarkupError {
    /// Byte offset where the broken construct starts
    pub fn offset(&self) -> usize {
        match self {
            MarkupError::UnterminatedTag { offset } | MarkupError::UnterminatedComment { offset } => {
                *offset
            }
        }
    }
}

/// Token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Character data between tags
    Text,
    /// `<!-- ... -->`
    Comment,
    /// `<!DOCTYPE ...>`, `<?...>` and other declarations
    Declaration,
    /// Contents of a raw-text element
    RawText,
    /// Opening tag; `name` is lowercased
    StartTag { name: String, self_closing: bool },
    /// Closing tag; `name` is lowercased
    EndTag { name: String },
}

/// A token and the byte range it covers in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    /// Source text of this token
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }

    /// Name of the tag if this is a start tag
    pub fn start_tag_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::StartTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Name of the tag if this is an end tag
    pub fn end_tag_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::EndTag { name } => Some(name),
            _ => None,
        }
    }
}

/// Byte-oriented lexer over an HTML fragment
///
/// All delimiters are ASCII, so every span boundary is a valid `char`
/// boundary of the input.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after a raw-text start tag; holds the element name to close
    raw_text: Option<String>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
            failed: false,
        }
    }

    /// Tokenize the entire input, stopping at the first error
    pub fn tokenize(self) -> Result<Vec<Token>, MarkupError> {
        self.collect()
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Whether a `<` at `at` opens a tag-like construct
    fn is_markup_start(&self, at: usize) -> bool {
        match self.bytes().get(at + 1) {
            Some(b) if b.is_ascii_alphabetic() => true,
            Some(b'/') => self
                .bytes()
                .get(at + 2)
                .is_some_and(|b| b.is_ascii_alphabetic()),
            Some(b'!') | Some(b'?') => true,
            _ => false,
        }
    }

    fn read_text(&mut self) -> Token {
        let start = self.pos;
        let mut at = self.pos;
        while let Some(offset) = self.input[at..].find('<') {
            let candidate = at + offset;
            if candidate > start && self.is_markup_start(candidate) {
                self.pos = candidate;
                return Token {
                    kind: TokenKind::Text,
                    span: start..candidate,
                };
            }
            at = candidate + 1;
        }
        self.pos = self.input.len();
        Token {
            kind: TokenKind::Text,
            span: start..self.pos,
        }
    }

    fn read_comment(&mut self) -> Result<Token, MarkupError> {
        let start = self.pos;
        match self.input[start + 4..].find("-->") {
            Some(offset) => {
                self.pos = start + 4 + offset + 3;
                Ok(Token {
                    kind: TokenKind::Comment,
                    span: start..self.pos,
                })
            }
            None => Err(MarkupError::UnterminatedComment { offset: start }),
        }
    }

    fn read_declaration(&mut self) -> Result<Token, MarkupError> {
        let start = self.pos;
        match self.input[start..].find('>') {
            Some(offset) => {
                self.pos = start + offset + 1;
                Ok(Token {
                    kind: TokenKind::Declaration,
                    span: start..self.pos,
                })
            }
            None => Err(MarkupError::UnterminatedTag { offset: start }),
        }
    }

    fn read_name(&self, from: usize) -> (String, usize) {
        let end = self.bytes()[from..]
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-' || *b == b':'))
            .map(|p| from + p)
            .unwrap_or(self.input.len());
        (self.input[from..end].to_ascii_lowercase(), end)
    }

    /// Find the `>` closing a tag, skipping quoted attribute values
    fn find_tag_end(&self, from: usize) -> Option<usize> {
        let mut quote: Option<u8> = None;
        for (i, &b) in self.bytes()[from..].iter().enumerate() {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => return Some(from + i),
                None => {}
            }
        }
        None
    }

    fn read_end_tag(&mut self) -> Result<Token, MarkupError> {
        let start = self.pos;
        let (name, name_end) = self.read_name(start + 2);
        match self.input[name_end..].find('>') {
            Some(offset) => {
                self.pos = name_end + offset + 1;
                Ok(Token {
                    kind: TokenKind::EndTag { name },
                    span: start..self.pos,
                })
            }
            None => Err(MarkupError::UnterminatedTag { offset: start }),
        }
    }

    fn read_start_tag(&mut self) -> Result<Token, MarkupError> {
        let start = self.pos;
        let (name, name_end) = self.read_name(start + 1);
        let close = self
            .find_tag_end(name_end)
            .ok_or(MarkupError::UnterminatedTag { offset: start })?;
        let self_closing = close > name_end && self.bytes()[close - 1] == b'/';
        self.pos = close + 1;

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text = Some(name.clone());
        }

        Ok(Token {
            kind: TokenKind::StartTag { name, self_closing },
            span: start..self.pos,
        })
    }

    /// Contents of a raw-text element up to its closing tag
    fn read_raw_text(&mut self, element: &str) -> Option<Token> {
        let start = self.pos;
        let closing = format!("</{}", element);
        let end = self.input[start..]
            .to_ascii_lowercase()
            .find(&closing)
            .map(|offset| start + offset)
            .unwrap_or(self.input.len());
        self.pos = end;
        (end > start).then(|| Token {
            kind: TokenKind::RawText,
            span: start..end,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, MarkupError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(element) = self.raw_text.take() {
            if let Some(token) = self.read_raw_text(&element) {
                return Some(Ok(token));
            }
        }

        if self.pos >= self.input.len() {
            return None;
        }

        let result = if !self.starts_with("<") || !self.is_markup_start(self.pos) {
            Ok(self.read_text())
        } else if self.starts_with("<!--") {
            self.read_comment()
        } else if self.starts_with("<!") || self.starts_with("<?") {
            self.read_declaration()
        } else if self.starts_with("</") {
            self.read_end_tag()
        } else {
            self.read_start_tag()
        };

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lexer_tags_and_text() {
        let input = r#"<p class="lead">Hi <b>there</b></p>"#;
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0].start_tag_name(), Some("p"));
        assert_eq!(tokens[1].text(input), "Hi ");
        assert_eq!(tokens[3].text(input), "there");
        assert_eq!(tokens[5].end_tag_name(), Some("p"));
    }

    #[test]
    fn test_lexer_uppercase_names_are_lowered() {
        let tokens = Lexer::new("<H2 Class=x>A</H2>").tokenize().unwrap();
        assert_eq!(tokens[0].start_tag_name(), Some("h2"));
        assert_eq!(tokens[2].end_tag_name(), Some("h2"));
    }

    #[test]
    fn test_lexer_quoted_gt_in_attribute() {
        let input = r#"<a title="a > b" href='x'>link</a>"#;
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens[0].text(input), r#"<a title="a > b" href='x'>"#);
        assert_eq!(tokens[1].text(input), "link");
    }

    #[test]
    fn test_lexer_comment_is_opaque() {
        let kinds = kinds("<!-- <h2>x</h2> --><p>y</p>");
        assert_eq!(kinds[0], TokenKind::Comment);
        assert_eq!(
            kinds[1],
            TokenKind::StartTag {
                name: "p".to_string(),
                self_closing: false
            }
        );
    }

    #[test]
    fn test_lexer_raw_text_element() {
        let input = "<script>if (a<b) { x = '<h2>'; }</script><h2>T</h2>";
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::RawText);
        assert_eq!(tokens[1].text(input), "if (a<b) { x = '<h2>'; }");
        assert_eq!(tokens[2].end_tag_name(), Some("script"));
        assert_eq!(tokens[3].start_tag_name(), Some("h2"));
    }

    #[test]
    fn test_lexer_lone_lt_is_text() {
        let input = "1 < 2 and 3 <= 4";
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(input), input);
    }

    #[test]
    fn test_lexer_self_closing_and_doctype() {
        let kinds = kinds("<!DOCTYPE html><br/><img src=x />");
        assert_eq!(kinds[0], TokenKind::Declaration);
        assert_eq!(
            kinds[1],
            TokenKind::StartTag {
                name: "br".to_string(),
                self_closing: true
            }
        );
        assert_eq!(
            kinds[2],
            TokenKind::StartTag {
                name: "img".to_string(),
                self_closing: true
            }
        );
    }

    #[test]
    fn test_lexer_unterminated_tag() {
        let result = Lexer::new("<p>ok</p><h2 class=\"x").tokenize();
        assert_eq!(result, Err(MarkupError::UnterminatedTag { offset: 9 }));
    }

    #[test]
    fn test_lexer_unterminated_comment() {
        let err = Lexer::new("ab<!-- open").tokenize().unwrap_err();
        assert_eq!(err.offset(), 2);
        assert!(matches!(err, MarkupError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_lexer_spans_cover_input() {
        let input = "<h2 id=\"a\">A &amp; B</h2>\n<ul><li>x</li></ul>";
        let tokens = Lexer::new(input).tokenize().unwrap();
        let rebuilt: String = tokens.iter().map(|t| t.text(input)).collect();
        assert_eq!(rebuilt, input);
    }
}
