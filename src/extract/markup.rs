// src/extract/markup.rs
// =============================================================================
// A thin, queryable wrapper around a parsed HTML document.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM, never failing on broken markup (html5ever does
//   the same error recovery a browser does)
// - Supports CSS selectors like "header a > img"
// - Returns matches in document order
//
// The strategies only ever talk to MarkupModel and Node, never to scraper
// directly, so the heuristics read in terms of "tag", "attribute", "parent".
// =============================================================================

use scraper::{ElementRef, Html, Selector};

/// No single query ever returns more than this many nodes
pub const MAX_MATCHES: usize = 10;

/// The attributes the "logo" search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Id,
    Class,
    Alt,
}

impl AttrKind {
    pub fn name(self) -> &'static str {
        match self {
            AttrKind::Id => "id",
            AttrKind::Class => "class",
            AttrKind::Alt => "alt",
        }
    }
}

pub struct MarkupModel {
    document: Html,
}

impl MarkupModel {
    // Parses raw bytes into a document
    //
    // Invalid UTF-8 is replaced rather than rejected, and malformed HTML just
    // gives a best-effort (possibly empty) tree. This can't fail.
    pub fn parse(markup: &[u8]) -> Self {
        let text = String::from_utf8_lossy(markup);
        Self {
            document: Html::parse_document(&text),
        }
    }

    /// Nodes matching `selector`, in document order, at most `limit` of them
    pub fn select(&self, selector: &Selector, limit: usize) -> Vec<Node<'_>> {
        self.document
            .select(selector)
            .take(limit.min(MAX_MATCHES))
            .map(Node)
            .collect()
    }

    // First element in document order whose `attr` satisfies `predicate`
    //
    // The element must actually carry the attribute. For "class" each
    // whitespace-separated token is tested on its own and any hit counts.
    pub fn find_first<F>(&self, attr: AttrKind, predicate: F) -> Option<Node<'_>>
    where
        F: Fn(&str) -> bool,
    {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| {
                let element = element.value();
                match attr {
                    AttrKind::Class => element.classes().any(&predicate),
                    _ => element.attr(attr.name()).is_some_and(&predicate),
                }
            })
            .map(Node)
    }
}

/// One element of a MarkupModel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub fn tag(&self) -> &'a str {
        self.0.value().name()
    }

    /// Attribute value, or "" if the attribute is missing
    pub fn attr(&self, name: &str) -> &'a str {
        self.0.value().attr(name).unwrap_or("")
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.0.parent().and_then(ElementRef::wrap).map(Node)
    }

    /// First descendant (not self) with the given tag name
    pub fn find(&self, tag: &str) -> Option<Node<'a>> {
        self.0
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == tag)
            .map(Node)
    }
}
