//! Stylesheet scanning and generic-family classification
//!
//! Walks every stylesheet attached to the document, classifies rules whose
//! declaration text references a generic font category, and emits override
//! rules pointing at the replacement values (in practice `var()` references
//! to the session's custom properties). Cross-origin sheets that deny rule
//! access are re-fetched and text-parsed; a failed fetch skips that sheet.

mod css_text;

pub use css_text::split_rules;

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use futures::FutureExt;

use crate::cache::SharedMemo;
use crate::dom::{CssRule, Document, SheetRules, StylesheetRef};
use crate::network::Fetch;

/// Declaration values that look dimensional; custom properties holding
/// these are sizes, not font stacks, and must not be overridden.
const DIMENSION_MARKERS: [&str; 6] = ["calc", "rem", "em", "px", "%", "/"];

/// Does the text reference a sans-side generic family? `serif` covers
/// `sans-serif` as a substring.
fn matches_sans(text: &str) -> bool {
    text.contains("serif") || text.contains("cursive") || text.contains("fantasy")
}

fn matches_monospace(text: &str) -> bool {
    text.contains("monospace")
}

/// Deduplicated override rules, one set per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleCollection {
    pub sans: BTreeSet<String>,
    pub monospace: BTreeSet<String>,
}

impl StyleCollection {
    pub fn is_empty(&self) -> bool {
        self.sans.is_empty() && self.monospace.is_empty()
    }

    /// Sans override rules concatenated into stylesheet text.
    pub fn sans_css(&self) -> String {
        self.sans.iter().map(String::as_str).collect()
    }

    /// Monospace override rules concatenated into stylesheet text.
    pub fn monospace_css(&self) -> String {
        self.monospace.iter().map(String::as_str).collect()
    }
}

/// Iterate `property: value` pairs of flat declaration text.
fn declarations(css_text: &str) -> impl Iterator<Item = (&str, &str)> {
    css_text.split(';').filter_map(|segment| {
        let (property, value) = segment.split_once(':')?;
        let property = property.trim();
        let value = value.trim();
        (!property.is_empty() && !value.is_empty()).then_some((property, value))
    })
}

/// The custom property name inside a `var(--x)` replacement, used to skip
/// rules that merely define the replacement itself.
fn replacement_marker(replacement: &str) -> Option<&str> {
    let inner = replacement.strip_prefix("var(")?.strip_suffix(')')?;
    Some(inner.trim())
}

fn is_override_target(selector: &str) -> bool {
    !selector.is_empty() && !selector.starts_with('@') && !selector.starts_with("/*")
}

fn dimension_like(value: &str) -> bool {
    DIMENSION_MARKERS.iter().any(|marker| value.contains(marker))
}

/// Classify a flat rule list into override rules for both roles.
///
/// A rule's family is overridden only when its text declares `font-family:`;
/// custom properties whose value matches a generic pattern are overridden
/// per property, and declarations elsewhere referencing such a property
/// through `var()` are overridden too (one level of indirection).
pub fn classify_rules(
    rules: &[CssRule],
    sans_replacement: &str,
    monospace_replacement: &str,
    ligatures: bool,
) -> StyleCollection {
    let mut styles = StyleCollection::default();
    let mut sans_vars: BTreeSet<String> = BTreeSet::new();
    let mut monospace_vars: BTreeSet<String> = BTreeSet::new();

    let sans_marker = replacement_marker(sans_replacement);
    let monospace_marker = replacement_marker(monospace_replacement);

    for rule in rules {
        let selector = rule.selector.trim();
        if !is_override_target(selector) {
            continue;
        }
        let text = &rule.css_text;

        let self_referential =
            |marker: Option<&str>| marker.is_some_and(|name| text.contains(name));

        if matches_sans(text) && !self_referential(sans_marker) {
            if text.contains("font-family:") {
                styles
                    .sans
                    .insert(format!("{selector}{{font-family:{sans_replacement}!important;}}"));
            }
            for (property, value) in declarations(text) {
                if property.starts_with("--") && matches_sans(value) {
                    styles.sans.insert(format!(
                        "{selector}{{{property}:{sans_replacement}!important;}}"
                    ));
                    sans_vars.insert(property.to_string());
                }
            }
        }

        if matches_monospace(text) && !self_referential(monospace_marker) {
            if text.contains("font-family:") {
                let ligature_fix = if ligatures {
                    ""
                } else {
                    "font-variant-ligatures:none!important;"
                };
                styles.monospace.insert(format!(
                    "{selector}{{font-family:{monospace_replacement}!important;{ligature_fix}}}"
                ));
            }
            for (property, value) in declarations(text) {
                if property.starts_with("--") && matches_monospace(value) {
                    styles.monospace.insert(format!(
                        "{selector}{{{property}:{monospace_replacement}!important;}}"
                    ));
                    monospace_vars.insert(property.to_string());
                }
            }
        }
    }

    if sans_vars.is_empty() && monospace_vars.is_empty() {
        return styles;
    }

    // One level of indirection: any declaration referencing a classified
    // custom property gets the same override for its own selector.
    for rule in rules {
        let selector = rule.selector.trim();
        if !is_override_target(selector) {
            continue;
        }
        for (property, value) in declarations(&rule.css_text) {
            if dimension_like(value) {
                continue;
            }
            if sans_vars.iter().any(|name| value.contains(&format!("var({name})"))) {
                styles.sans.insert(format!(
                    "{selector}{{{property}:{sans_replacement}!important;}}"
                ));
            }
            if monospace_vars.iter().any(|name| value.contains(&format!("var({name})"))) {
                styles.monospace.insert(format!(
                    "{selector}{{{property}:{monospace_replacement}!important;}}"
                ));
            }
        }
    }

    styles
}

/// Memoized stylesheet scanner for one document.
///
/// Concurrent scans with identical arguments share one in-flight
/// computation, so a burst of previews never refetches the same
/// cross-origin sheet twice.
pub struct StyleScanner {
    memo: SharedMemo<(String, String, bool), StyleCollection>,
}

impl StyleScanner {
    /// Create a scanner over `document`, fetching denied sheets through
    /// `fetcher`.
    pub fn new<F>(document: Arc<RwLock<Document>>, fetcher: Arc<F>) -> Self
    where
        F: Fetch + 'static,
    {
        let memo = SharedMemo::new(move |args: &(String, String, bool)| {
            let (sans, monospace, ligatures) = args.clone();
            let document = Arc::clone(&document);
            let fetcher = Arc::clone(&fetcher);
            async move { scan_document(document, fetcher, &sans, &monospace, ligatures).await }
                .boxed()
        });
        Self { memo }
    }

    /// Classify every attached stylesheet; memoized on all three arguments.
    pub async fn scan(
        &self,
        sans_replacement: &str,
        monospace_replacement: &str,
        ligatures: bool,
    ) -> StyleCollection {
        self.memo
            .call(&(
                sans_replacement.to_string(),
                monospace_replacement.to_string(),
                ligatures,
            ))
            .await
    }

    /// Drop memoized scans, e.g. after stylesheet churn.
    pub fn clear_cache(&self) {
        self.memo.clear_cache();
    }
}

async fn scan_document<F: Fetch>(
    document: Arc<RwLock<Document>>,
    fetcher: Arc<F>,
    sans_replacement: &str,
    monospace_replacement: &str,
    ligatures: bool,
) -> StyleCollection {
    // Snapshot the sheet list so no lock is held across fetches.
    let sheets: Vec<StylesheetRef> = match document.read() {
        Ok(doc) => doc.stylesheets().to_vec(),
        Err(_) => return StyleCollection::default(),
    };

    let mut pool: Vec<CssRule> = Vec::new();
    for sheet in &sheets {
        match &sheet.rules {
            SheetRules::Accessible(rules) => pool.extend(rules.iter().cloned()),
            SheetRules::Denied => {
                let Some(url) = &sheet.href else {
                    log::debug!("stylesheet denied rule access and has no href; skipping");
                    continue;
                };
                match fetcher.fetch_text(url).await {
                    Ok(css) => pool.extend(split_rules(&css)),
                    Err(err) => log::warn!("failed to fetch stylesheet {url}: {err}"),
                }
            }
        }
    }

    classify_rules(&pool, sans_replacement, monospace_replacement, ligatures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::StaticFetcher;
    use pretty_assertions::assert_eq;

    fn rule(selector: &str, text: &str) -> CssRule {
        CssRule::new(selector, text)
    }

    #[test]
    fn test_sans_rule_classified() {
        let rules = [rule(".article", "font-family:Arial,sans-serif;color:#222;")];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert_eq!(
            styles.sans_css(),
            ".article{font-family:var(--s)!important;}"
        );
        assert!(styles.monospace.is_empty());
    }

    #[test]
    fn test_monospace_rule_disables_ligatures() {
        let rules = [rule("pre", "font-family:Menlo,monospace;")];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert_eq!(
            styles.monospace_css(),
            "pre{font-family:var(--m)!important;font-variant-ligatures:none!important;}"
        );
    }

    #[test]
    fn test_ligatures_enabled_keeps_them() {
        let rules = [rule("pre", "font-family:monospace;")];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", true);
        assert_eq!(
            styles.monospace_css(),
            "pre{font-family:var(--m)!important;}"
        );
    }

    #[test]
    fn test_keyword_without_font_family_declaration() {
        // Mentions "serif" but declares no font-family; nothing to override.
        let rules = [rule(".s", "content:\"serif\";")];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert!(styles.sans.is_empty());
    }

    #[test]
    fn test_at_rule_selectors_skipped() {
        let rules = [
            rule("@font-face", "font-family:monospace;"),
            rule("/* comment */", "font-family:serif;"),
        ];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert!(styles.is_empty());
    }

    #[test]
    fn test_self_reference_skipped() {
        // A rule that merely assigns the replacement variable must not be
        // rewritten to point at itself.
        let rules = [rule("body", "font-family:var(--sans__abc123);")];
        let styles = classify_rules(&rules, "var(--sans__abc123)", "var(--m)", false);
        assert!(styles.sans.is_empty());
    }

    #[test]
    fn test_custom_property_override_and_indirection() {
        let rules = [
            rule(":root", "--code-font:Menlo,monospace;"),
            rule("pre", "font-family:var(--code-font);"),
        ];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert!(
            styles
                .monospace
                .contains(":root{--code-font:var(--m)!important;}")
        );
        assert!(
            styles
                .monospace
                .contains("pre{font-family:var(--m)!important;}")
        );
    }

    #[test]
    fn test_indirection_skips_dimensional_values() {
        let rules = [
            rule(":root", "--body-font:Georgia,serif;"),
            rule("p", "margin:calc(1rem + var(--body-font));"),
        ];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert!(!styles.sans.iter().any(|s| s.contains("margin")));
    }

    #[test]
    fn test_deduplication() {
        let rules = [
            rule("p", "font-family:serif;"),
            rule("p", "font-family:serif;"),
        ];
        let styles = classify_rules(&rules, "var(--s)", "var(--m)", false);
        assert_eq!(styles.sans.len(), 1);
    }

    fn scanner_with(doc: Document, fetcher: StaticFetcher) -> StyleScanner {
        StyleScanner::new(Arc::new(RwLock::new(doc)), Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_scan_accessible_sheet() {
        let mut doc = Document::new();
        doc.attach_stylesheet(StylesheetRef::accessible(
            None,
            vec![rule("h1", "font-family:Georgia,serif;")],
        ));
        let scanner = scanner_with(doc, StaticFetcher::new());
        let styles = scanner.scan("var(--s)", "var(--m)", false).await;
        assert_eq!(styles.sans_css(), "h1{font-family:var(--s)!important;}");
    }

    #[tokio::test]
    async fn test_scan_cross_origin_sheet_via_fetch() {
        let mut doc = Document::new();
        doc.attach_stylesheet(StylesheetRef::cross_origin("https://cdn.example.com/a.css"));
        let mut fetcher = StaticFetcher::new();
        fetcher.insert(
            "https://cdn.example.com/a.css",
            "code{font-family:monospace}",
        );
        let scanner = scanner_with(doc, fetcher);
        let styles = scanner.scan("var(--s)", "var(--m)", false).await;
        assert_eq!(
            styles.monospace_css(),
            "code{font-family:var(--m)!important;font-variant-ligatures:none!important;}"
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_skips_sheet() {
        let mut doc = Document::new();
        doc.attach_stylesheet(StylesheetRef::cross_origin("https://cdn.example.com/missing.css"));
        doc.attach_stylesheet(StylesheetRef::accessible(
            None,
            vec![rule("p", "font-family:serif;")],
        ));
        let scanner = scanner_with(doc, StaticFetcher::new());
        let styles = scanner.scan("var(--s)", "var(--m)", false).await;
        // The unreachable sheet is omitted; the accessible one still lands.
        assert_eq!(styles.sans_css(), "p{font-family:var(--s)!important;}");
    }

    #[tokio::test]
    async fn test_scan_is_memoized_across_sheet_changes() {
        let doc = Arc::new(RwLock::new(Document::new()));
        let scanner = StyleScanner::new(Arc::clone(&doc), Arc::new(StaticFetcher::new()));

        let empty = scanner.scan("var(--s)", "var(--m)", false).await;
        assert!(empty.is_empty());

        if let Ok(mut doc) = doc.write() {
            doc.attach_stylesheet(StylesheetRef::accessible(
                None,
                vec![rule("p", "font-family:serif;")],
            ));
        }

        // Same arguments hit the memo and miss the new sheet.
        let cached = scanner.scan("var(--s)", "var(--m)", false).await;
        assert!(cached.is_empty());

        // Clearing forces a rescan.
        scanner.clear_cache();
        let fresh = scanner.scan("var(--s)", "var(--m)", false).await;
        assert_eq!(fresh.sans.len(), 1);
    }
}
