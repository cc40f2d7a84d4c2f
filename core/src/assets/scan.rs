use crate::error::{BundleError, BundleResult};
use regex::Regex;
use url::Url;

/// Schemes that never point at a bundled local file.
const REJECTED_SCHEMES: &[&str] = &["data", "mailto", "javascript", "file", "http", "https"];

/// Permissive syntactic scan for references in generated HTML/CSS.
///
/// Not an HTML parser: it looks for `href=`, `src=`, `data=` attribute
/// values and CSS `url(...)` arguments, quoted or bare.
pub struct CandidateScanner {
    attr: Regex,
    css_url: Regex,
}

impl CandidateScanner {
    pub fn new() -> BundleResult<Self> {
        let attr = Regex::new(
            r#"(?i)\b(?:href|src|data)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>]+))"#,
        )
        .map_err(|e| BundleError::InvalidInput(format!("attribute pattern: {}", e)))?;
        let css_url = Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s"']+))\s*\)"#)
            .map_err(|e| BundleError::InvalidInput(format!("css url pattern: {}", e)))?;
        Ok(Self { attr, css_url })
    }

    /// Raw candidate strings in document order, before filtering.
    pub fn candidates(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for re in [&self.attr, &self.css_url] {
            for cap in re.captures_iter(text) {
                if let Some(m) = cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)) {
                    out.push(m.as_str().to_string());
                }
            }
        }
        out
    }

    /// Candidates that may name a local file, with query and fragment removed.
    pub fn local_references(&self, text: &str) -> Vec<String> {
        self.candidates(text)
            .into_iter()
            .filter_map(|c| local_reference(&c))
            .collect()
    }
}

/// Returns the path part of `candidate` when it can refer to a local file.
pub fn local_reference(candidate: &str) -> Option<String> {
    let c = candidate.trim();
    if c.is_empty() || c.starts_with('#') || c.starts_with("//") || c.starts_with("\\\\") {
        return None;
    }
    if let Ok(u) = Url::parse(c) {
        // Single-letter schemes are Windows drive letters, not URLs.
        if REJECTED_SCHEMES.contains(&u.scheme()) || u.scheme().len() > 1 {
            return None;
        }
    }
    let path = c.split(['?', '#']).next().unwrap_or("");
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
