// src/extract/resolve.rs
// =============================================================================
// Turns the winning candidate into an absolute logo URL.
//
// Steps:
// 1. Pick the node (for a list, the first one in the page)
// 2. If it's an <img>, read its src; otherwise read the src of the first
//    <img> somewhere inside it
// 3. Reject anything that doesn't look like a URL or a path (data: URIs,
//    javascript:, empty strings, ...)
// 4. Join it onto the response address, like a browser would
//
// There is no second chance: if the winning candidate can't be resolved the
// site simply has no logo. We never go back and try the next strategy.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::strategy::Candidate;
use crate::error::ExtractionErrorKind;

// "word characters followed by a slash", e.g. "images/logo.png"
static WORD_THEN_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+/").expect("valid regex"));

pub fn resolve(
    candidate: &Candidate<'_>,
    response_address: &str,
) -> Result<String, ExtractionErrorKind> {
    let node = candidate
        .first()
        .ok_or(ExtractionErrorKind::NoStrategyMatched)?;

    let image = if node.tag() == "img" {
        node
    } else {
        node.find("img").ok_or(ExtractionErrorKind::NoUsableReference)?
    };

    let src = image.attr("src");
    if !looks_like_url(src) {
        return Err(ExtractionErrorKind::NoUsableReference);
    }

    join(response_address, src).ok_or(ExtractionErrorKind::NoUsableReference)
}

/// Cheap guard that keeps data URIs and other non-path values out
pub fn looks_like_url(src: &str) -> bool {
    src.starts_with("http")
        || src.starts_with('/')
        || src.starts_with("./")
        || src.starts_with("../")
        || WORD_THEN_SLASH.is_match(src)
}

// Resolves `reference` against `base` ("logo.png" on /about -> /logo.png)
fn join(base: &str, reference: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(reference).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::markup::MarkupModel;
    use scraper::Selector;

    fn first_match<'a>(model: &'a MarkupModel, css: &str) -> Candidate<'a> {
        let selector = Selector::parse(css).unwrap();
        Candidate::from_nodes(model.select(&selector, 10))
    }

    #[test]
    fn test_relative_reference_against_response_address() {
        assert_eq!(
            join("http://example.com/about", "logo.png"),
            Some("http://example.com/logo.png".to_string())
        );
    }

    #[test]
    fn test_image_candidate() {
        let model = MarkupModel::parse(br#"<img src="/logo.svg"><img src="/second.svg">"#);
        let candidate = first_match(&model, "img");
        assert_eq!(
            resolve(&candidate, "http://acme.test/"),
            Ok("http://acme.test/logo.svg".to_string())
        );
    }

    #[test]
    fn test_container_uses_first_descendant_image() {
        let model =
            MarkupModel::parse(br#"<div id="logo"><span><img src="img/brand.png"></span></div>"#);
        let candidate = first_match(&model, "div");
        assert_eq!(
            resolve(&candidate, "http://acme.test/en/"),
            Ok("http://acme.test/en/img/brand.png".to_string())
        );
    }

    #[test]
    fn test_container_without_image() {
        let model = MarkupModel::parse(br#"<div id="site-logo">Acme</div>"#);
        let candidate = first_match(&model, "div");
        assert_eq!(
            resolve(&candidate, "http://acme.test/"),
            Err(ExtractionErrorKind::NoUsableReference)
        );
    }

    #[test]
    fn test_rejects_data_uri_and_missing_src() {
        let model = MarkupModel::parse(
            br#"<img id="a" src="data:image/png;base64,AAAA"><img id="b">"#,
        );
        for css in ["#a", "#b"] {
            let candidate = first_match(&model, css);
            assert_eq!(
                resolve(&candidate, "http://acme.test/"),
                Err(ExtractionErrorKind::NoUsableReference)
            );
        }
    }

    #[test]
    fn test_absolute_src_kept() {
        let model = MarkupModel::parse(br#"<img src="https://cdn.test/logo.png">"#);
        let candidate = first_match(&model, "img");
        assert_eq!(
            resolve(&candidate, "http://acme.test/"),
            Ok("https://cdn.test/logo.png".to_string())
        );
    }

    #[test]
    fn test_none_candidate() {
        assert_eq!(
            resolve(&Candidate::None, "http://acme.test/"),
            Err(ExtractionErrorKind::NoStrategyMatched)
        );
    }

    #[test]
    fn test_looks_like_url() {
        for ok in ["http://a/b.png", "/a.png", "./a.png", "../a.png", "assets/a.png"] {
            assert!(looks_like_url(ok), "{ok}");
        }
        for bad in ["", "logo.png", "data:image/png;base64,xx", "javascript:void(0)", "#"] {
            assert!(!looks_like_url(bad), "{bad}");
        }
    }
}
