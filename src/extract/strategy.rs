// src/extract/strategy.rs
// =============================================================================
// The logo heuristics and the pipeline that runs them.
//
// Each strategy looks at the parsed page and either points at something that
// probably contains the logo (a Candidate) or gives up. The pipeline tries
// them in a fixed priority order and stops at the first one that finds
// anything:
//
//   1. image_in_header     <img> inside a link inside <nav>/<header>
//   2. search_in_img       page has images AND something is tagged "logo"
//   3. search_in_attribute first id/class/alt containing "logo"
//   4. image_in_root_link  <img> directly inside a link to the homepage
//
// Strategies are plain values behind a trait so tests can slot in their own.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use tracing::debug;

use super::markup::{AttrKind, MarkupModel, Node};
use crate::config::CrawlConfig;

static HEADER_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("nav a > img, header a > img").expect("valid selector"));
static LINKED_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a > img").expect("valid selector"));
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("valid selector"));

/// What a strategy found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate<'a> {
    None,
    One(Node<'a>),
    /// Never empty, document order preserved
    Many(Vec<Node<'a>>),
}

impl<'a> Candidate<'a> {
    /// Wraps a query result; an empty list becomes None
    pub fn from_nodes(nodes: Vec<Node<'a>>) -> Self {
        if nodes.is_empty() {
            Candidate::None
        } else {
            Candidate::Many(nodes)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Candidate::None)
    }

    /// The node that wins: for Many, the one that appears first in the page
    pub fn first(&self) -> Option<Node<'a>> {
        match self {
            Candidate::None => None,
            Candidate::One(node) => Some(*node),
            Candidate::Many(nodes) => nodes.first().copied(),
        }
    }
}

impl<'a> From<Option<Node<'a>>> for Candidate<'a> {
    fn from(node: Option<Node<'a>>) -> Self {
        node.map_or(Candidate::None, Candidate::One)
    }
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `site` is the address as given in the input, without a scheme
    fn find<'a>(&self, model: &'a MarkupModel, site: &str) -> Candidate<'a>;
}

pub struct ImageInHeader {
    limit: usize,
}

impl Strategy for ImageInHeader {
    fn name(&self) -> &'static str {
        "image_in_header"
    }

    fn find<'a>(&self, model: &'a MarkupModel, _site: &str) -> Candidate<'a> {
        // Every match is kept; the resolver later takes the first one
        Candidate::from_nodes(model.select(&HEADER_IMAGE, self.limit))
    }
}

pub struct SearchInAttribute {
    pattern: Regex,
}

impl SearchInAttribute {
    fn search<'a>(&self, model: &'a MarkupModel) -> Candidate<'a> {
        // Substring search, not a full match: "site-logo" and "logo_dark" both hit
        let matches = |value: &str| self.pattern.is_match(value);

        // id beats class beats alt, even if the class hit comes earlier in the page
        model
            .find_first(AttrKind::Id, matches)
            .or_else(|| model.find_first(AttrKind::Class, matches))
            .or_else(|| model.find_first(AttrKind::Alt, matches))
            .into()
    }
}

impl Strategy for SearchInAttribute {
    fn name(&self) -> &'static str {
        "search_in_attribute"
    }

    fn find<'a>(&self, model: &'a MarkupModel, _site: &str) -> Candidate<'a> {
        self.search(model)
    }
}

// Runs the attribute search once per image on the page.
//
// The search is over the whole document each time, not scoped to the image
// being visited, so in practice this fires iff the page has at least one
// <img> and something somewhere is tagged "logo".
pub struct SearchInImg {
    limit: usize,
    attribute: SearchInAttribute,
}

impl Strategy for SearchInImg {
    fn name(&self) -> &'static str {
        "search_in_img"
    }

    fn find<'a>(&self, model: &'a MarkupModel, _site: &str) -> Candidate<'a> {
        for _image in model.select(&IMAGE, self.limit) {
            // Deliberately not scoped to `_image`
            let found = self.attribute.search(model);
            if !found.is_none() {
                return found;
            }
        }
        Candidate::None
    }
}

pub struct ImageInRootLink {
    limit: usize,
}

impl Strategy for ImageInRootLink {
    fn name(&self) -> &'static str {
        "image_in_root_link"
    }

    fn find<'a>(&self, model: &'a MarkupModel, site: &str) -> Candidate<'a> {
        model
            .select(&LINKED_IMAGE, self.limit)
            .into_iter()
            // select() already gave us document order, so the first hit wins
            .find(|image| {
                // "a > img" guarantees the parent is the anchor
                let href = image.parent().map(|a| a.attr("href")).unwrap_or("");
                links_to_root(href, site)
            })
            .into()
    }
}

// Does this href point at the site's homepage?
//
// "/" always does. Otherwise split it into host and path: a path of exactly
// "/" counts, and so does an empty path when the host ends with the site.
fn links_to_root(href: &str, site: &str) -> bool {
    if href == "/" {
        return true;
    }
    let (host, path) = split_href(href);
    path == "/" || (path.is_empty() && host.ends_with(site))
}

// Splits an href into (host, path) without normalizing anything.
//
// url::Url can't be used here: it rejects relative references and turns
// "http://acme.test" into "http://acme.test/", which would change the
// empty-path rule above.
fn split_href(href: &str) -> (&str, &str) {
    let mut rest = href;

    // Strip a leading scheme such as "http:" or "mailto:"
    if let Some(colon) = rest.find(':') {
        let scheme = &rest[..colon];
        let is_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if is_scheme {
            rest = &rest[colon + 1..];
        }
    }

    // Query and fragment never belong to the path
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    rest = &rest[..end];

    let (host, path) = match rest.strip_prefix("//") {
        Some(authority) => {
            let slash = authority.find('/').unwrap_or(authority.len());
            authority.split_at(slash)
        }
        None => ("", rest),
    };

    (host, strip_params(path))
}

// Drops ";params" from the last path segment: "/;jsessionid=1" -> "/"
fn strip_params(path: &str) -> &str {
    // Only a ';' after the last '/' starts params
    let last_segment = path.rfind('/').unwrap_or(0);
    match path[last_segment..].find(';') {
        Some(semi) => &path[..last_segment + semi],
        None => path,
    }
}

/// The strategy that matched and what it found
#[derive(Debug)]
pub struct Match<'a> {
    pub strategy: &'static str,
    pub candidate: Candidate<'a>,
}

pub struct Pipeline {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Pipeline {
    /// The four built-in heuristics in priority order
    pub fn new(config: &CrawlConfig) -> Result<Self, regex::Error> {
        let limit = config.search_limit;
        let pattern = Regex::new(&config.logo_pattern)?;

        Ok(Self::with_strategies(vec![
            Box::new(ImageInHeader { limit }),
            Box::new(SearchInImg {
                limit,
                attribute: SearchInAttribute {
                    pattern: pattern.clone(),
                },
            }),
            Box::new(SearchInAttribute { pattern }),
            Box::new(ImageInRootLink { limit }),
        ]))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    // First strategy with a non-empty result wins; later ones never run.
    pub fn run<'a>(&self, model: &'a MarkupModel, site: &str) -> Option<Match<'a>> {
        for strategy in &self.strategies {
            let candidate = strategy.find(model, site);
            if !candidate.is_none() {
                debug!(site, strategy = strategy.name(), "strategy matched");
                return Some(Match {
                    strategy: strategy.name(),
                    candidate,
                });
            }
        }
        None
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does Candidate have both One and Many?
//    - Selector strategies naturally return a list, attribute searches a
//      single element
//    - Keeping both shapes makes "empty list" impossible: from_nodes() turns
//      it into None, so the pipeline only has to check is_none()
//
// 2. Why Box<dyn Strategy>?
//    - The pipeline is just an ordered list; each heuristic is its own type
//    - Tests can wrap or replace strategies (see the counting wrapper below)
//    - Send + Sync lets one Pipeline be shared by every site task
//
// 3. Why the <'a> lifetime on find()?
//    - Candidates borrow nodes straight out of the parsed document
//    - The compiler then guarantees a Candidate never outlives its MarkupModel
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn pipeline() -> Pipeline {
        Pipeline::new(&CrawlConfig::default()).unwrap()
    }

    fn winner(html: &str, site: &str) -> Option<(&'static str, String)> {
        let model = MarkupModel::parse(html.as_bytes());
        pipeline().run(&model, site).map(|m| {
            let node = m.candidate.first().unwrap();
            (m.strategy, format!("{}#{}", node.tag(), node.attr("src")))
        })
    }

    // Wraps a real strategy and counts how often it runs
    struct Counting {
        inner: Box<dyn Strategy>,
        calls: Arc<AtomicUsize>,
    }

    impl Strategy for Counting {
        fn name(&self) -> &'static str {
            self.inner.name()
        }

        fn find<'a>(&self, model: &'a MarkupModel, site: &str) -> Candidate<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find(model, site)
        }
    }

    #[test]
    fn test_header_image_wins_first() {
        let html = r#"
            <div id="logo"><img src="/other.png"></div>
            <header><a href="/"><img src="/logo.svg"></a></header>
        "#;
        assert_eq!(
            winner(html, "acme.test"),
            Some(("image_in_header", "img#/logo.svg".to_string()))
        );
    }

    #[test]
    fn test_nav_image_needs_anchor_parent() {
        let html = r#"<nav><span><img src="/x.png"></span></nav>"#;
        let model = MarkupModel::parse(html.as_bytes());
        assert!(ImageInHeader { limit: 10 }.find(&model, "acme.test").is_none());
    }

    #[test]
    fn test_later_strategies_not_evaluated() {
        let calls: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let pattern = Regex::new("logo").unwrap();
        let inner: Vec<Box<dyn Strategy>> = vec![
            Box::new(ImageInHeader { limit: 10 }),
            Box::new(SearchInImg {
                limit: 10,
                attribute: SearchInAttribute {
                    pattern: pattern.clone(),
                },
            }),
            Box::new(SearchInAttribute { pattern }),
            Box::new(ImageInRootLink { limit: 10 }),
        ];
        let strategies = inner
            .into_iter()
            .zip(&calls)
            .map(|(inner, calls)| {
                Box::new(Counting {
                    inner,
                    calls: calls.clone(),
                }) as Box<dyn Strategy>
            })
            .collect();
        let pipeline = Pipeline::with_strategies(strategies);

        let model = MarkupModel::parse(
            br#"<header><a href="/"><img class="logo" src="/logo.png"></a></header>"#,
        );
        let found = pipeline.run(&model, "acme.test").unwrap();

        assert_eq!(found.strategy, "image_in_header");
        let counts: Vec<_> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
        assert_eq!(counts, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_search_in_img_is_document_wide() {
        // The only "logo" attribute is on an element with no image near it
        let html = r#"<img src="/banner.png"><p id="footer-logo">Acme</p>"#;
        let model = MarkupModel::parse(html.as_bytes());
        let found = pipeline().run(&model, "acme.test").unwrap();

        assert_eq!(found.strategy, "search_in_img");
        assert_eq!(found.candidate.first().unwrap().tag(), "p");
    }

    #[test]
    fn test_search_in_attribute_without_images() {
        let html = r#"<div class="brand-logo">Acme</div>"#;
        let model = MarkupModel::parse(html.as_bytes());
        let found = pipeline().run(&model, "acme.test").unwrap();
        assert_eq!(found.strategy, "search_in_attribute");
    }

    #[test]
    fn test_attribute_priority_id_then_class_then_alt() {
        let html = r#"
            <img alt="logo" src="/alt.png">
            <span class="logo"></span>
            <div id="the-logo"></div>
        "#;
        let model = MarkupModel::parse(html.as_bytes());
        let strategy = SearchInAttribute {
            pattern: Regex::new("logo").unwrap(),
        };
        let node = strategy.find(&model, "acme.test").first().unwrap();
        assert_eq!(node.tag(), "div");
    }

    #[test]
    fn test_attribute_search_is_case_sensitive() {
        let html = r#"<div id="LOGO"></div>"#;
        assert_eq!(winner(html, "acme.test"), None);
    }

    #[test]
    fn test_root_link_variants() {
        assert!(links_to_root("/", "acme.test"));
        assert!(links_to_root("http://acme.test/", "acme.test"));
        assert!(links_to_root("https://www.acme.test", "acme.test"));
        assert!(links_to_root("//acme.test?ref=logo", "acme.test"));
        assert!(links_to_root("/?lang=en", "acme.test"));
        assert!(links_to_root("/;jsessionid=abc", "acme.test"));
        assert!(links_to_root("http://acme.test/;sid=1?x=2", "acme.test"));
        assert!(!links_to_root("/shop;sid=1", "acme.test"));
        assert!(!links_to_root("http://other.test", "acme.test"));
        assert!(!links_to_root("/about", "acme.test"));
        assert!(!links_to_root("", "acme.test"));
    }

    #[test]
    fn test_split_href() {
        assert_eq!(split_href("http://acme.test/a/b?q=1"), ("acme.test", "/a/b"));
        assert_eq!(split_href("http://acme.test"), ("acme.test", ""));
        assert_eq!(split_href("../up#top"), ("", "../up"));
        assert_eq!(split_href("/a;v=1/b;sid=2"), ("", "/a;v=1/b"));
        assert_eq!(split_href(";sid=2"), ("", ""));
        assert_eq!(split_href("//acme.test;x"), ("acme.test;x", ""));
    }

    #[test]
    fn test_image_in_root_link_skips_other_links() {
        let html = r#"
            <a href="/about"><img src="/team.png"></a>
            <a href="https://acme.test"><img src="/brand.png"></a>
        "#;
        assert_eq!(
            winner(html, "acme.test"),
            Some(("image_in_root_link", "img#/brand.png".to_string()))
        );
    }

    #[test]
    fn test_nothing_matches() {
        let html = r#"<p>No pictures here</p><a href="/about"><img src="/a.png"></a>"#;
        assert_eq!(winner(html, "acme.test"), None);
    }

    #[test]
    fn test_candidate_from_empty_nodes_is_none() {
        assert!(Candidate::from_nodes(Vec::new()).is_none());
        assert_eq!(Candidate::from(None::<Node>), Candidate::None);
    }
}
