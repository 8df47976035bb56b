//! Heading extraction and anchor injection

use serde::Serialize;

use super::markup::{Lexer, Token, TokenKind};

/// Default prefix for generated heading identifiers
pub const DEFAULT_ID_PREFIX: &str = "heading-";

/// Table-of-contents tier of a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    /// `<h2>`
    Major,
    /// `<h3>`
    Minor,
}

impl HeadingLevel {
    /// Map a lowercased tag name to a level
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "h2" => Some(HeadingLevel::Major),
            "h3" => Some(HeadingLevel::Minor),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            HeadingLevel::Major => "h2",
            HeadingLevel::Minor => "h3",
        }
    }
}

/// One heading occurrence found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingDescriptor {
    pub id: String,
    pub label: String,
    pub level: HeadingLevel,
}

/// Result of annotating a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotated {
    /// Content with every recognized heading carrying its identifier
    pub html: String,
    /// Headings in document order
    pub headings: Vec<HeadingDescriptor>,
}

impl Annotated {
    pub fn has_headings(&self) -> bool {
        !self.headings.is_empty()
    }
}

/// Assigns anchors to `<h2>`/`<h3>` elements and collects them for a TOC
#[derive(Debug, Clone)]
pub struct Annotator {
    id_prefix: String,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

/// A matched heading element, as token indices
struct HeadingMatch {
    open: usize,
    close: usize,
    level: HeadingLevel,
}

impl Annotator {
    pub fn new(id_prefix: &str) -> Self {
        Self {
            id_prefix: id_prefix.to_string(),
        }
    }

    /// Identifier for the heading with the given ordinal
    pub fn identifier(&self, ordinal: usize) -> String {
        format!("{}{}", self.id_prefix, ordinal)
    }

    /// Annotate `content`, returning the rewritten markup and its headings
    pub fn annotate(&self, content: &str) -> Annotated {
        let tokens = tokens_until_error(content);
        let matches = match_headings(&tokens);

        if matches.is_empty() {
            return Annotated {
                html: content.to_string(),
                headings: Vec::new(),
            };
        }

        let mut html = String::with_capacity(content.len() + matches.len() * 20);
        let mut headings = Vec::with_capacity(matches.len());
        let mut copied = 0;

        for (ordinal, m) in matches.iter().enumerate() {
            let id = self.identifier(ordinal);
            let open = &tokens[m.open];

            // `<` plus the tag name as written in the source
            let insert_at = open.span.start + 1 + m.level.tag().len();
            html.push_str(&content[copied..insert_at]);
            html.push_str(&format!(r#" id="{}""#, id));
            copied = insert_at;

            headings.push(HeadingDescriptor {
                label: label_between(content, &tokens[m.open + 1..m.close]),
                id,
                level: m.level,
            });
        }
        html.push_str(&content[copied..]);

        tracing::debug!("Annotated {} headings", headings.len());

        Annotated { html, headings }
    }
}

/// Annotate with the default `heading-<n>` identifiers
pub fn annotate(content: &str) -> Annotated {
    Annotator::default().annotate(content)
}

/// Lex as far as the markup is well formed; the remainder stays opaque
fn tokens_until_error(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for token in Lexer::new(content) {
        match token {
            Ok(token) => tokens.push(token),
            Err(e) => {
                tracing::debug!("Stopped scanning headings: {}", e);
                break;
            }
        }
    }
    tokens
}

/// Pair each heading start tag with the first end tag of the same level.
///
/// Scanning resumes after the matched end tag, so heading tags nested inside
/// a matched heading belong to its inner markup. A start tag without an end
/// tag is skipped and scanning resumes right after it.
fn match_headings(tokens: &[Token]) -> Vec<HeadingMatch> {
    let mut matches = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let level = match &tokens[i].kind {
            TokenKind::StartTag {
                name,
                self_closing: false,
            } => HeadingLevel::from_tag(name),
            _ => None,
        };

        let Some(level) = level else {
            i += 1;
            continue;
        };

        let close = tokens[i + 1..]
            .iter()
            .position(|t| t.end_tag_name() == Some(level.tag()))
            .map(|offset| i + 1 + offset);

        match close {
            Some(close) => {
                matches.push(HeadingMatch {
                    open: i,
                    close,
                    level,
                });
                i = close + 1;
            }
            None => i += 1,
        }
    }

    matches
}

/// Plain text of a heading's inner tokens, tags removed
fn label_between(content: &str, inner: &[Token]) -> String {
    inner
        .iter()
        .filter(|t| t.kind == TokenKind::Text)
        .map(|t| t.text(content))
        .collect()
}
