//! Override stylesheet assembly
//!
//! Turns the configured selections plus the scan results into one complete
//! stylesheet: import rules for hosted families, root custom properties
//! carrying the replacement stacks, a blanket heading rule, and the
//! per-selector overrides from the scan.

pub mod catalog;

use std::sync::Arc;

use futures::FutureExt;

use crate::cache::SharedMemo;
use crate::scan::StyleScanner;
use crate::settings::FontSelection;
use crate::utils::{SessionIds, fix_name};

/// Hosted stylesheet endpoint for remote families.
pub const GOOGLE_FONTS_CSS2: &str = "https://fonts.googleapis.com/css2";

/// Weights requested for every imported family.
pub const IMPORT_WEIGHTS: &str = "400;700";

/// Emoji-capable fallback stack appended after every replacement so color
/// emoji keep rendering no matter which family the user picked.
pub const FALLBACK_STACK: &str = "\"Apple Color Emoji\",\"Segoe UI Emoji\",\"Segoe UI Symbol\",\"Noto Color Emoji\"";

/// One `@import` covering every remote family, `family=` fragments joined
/// with `&` so the whole set costs a single request.
fn import_rule(families: &[&str]) -> String {
    if families.is_empty() {
        return String::new();
    }
    let query = families
        .iter()
        .map(|family| format!("family={}:wght@{IMPORT_WEIGHTS}", family.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&");
    format!("@import url('{GOOGLE_FONTS_CSS2}?{query}&display=swap');")
}

/// Assemble the full override stylesheet for the given selections.
///
/// Returns an empty string when neither role is active. Emits sections in
/// a fixed order so identical inputs produce byte-identical output:
/// imports, root custom properties, heading rule, sans overrides,
/// monospace overrides.
pub async fn build_stylesheet(
    scanner: &StyleScanner,
    ids: &SessionIds,
    sans: &FontSelection,
    monospace: &FontSelection,
    ligatures: bool,
) -> String {
    if !sans.is_active() && !monospace.is_active() {
        return String::new();
    }

    let mut imported: Vec<&str> = Vec::new();
    for selection in [sans, monospace] {
        if selection.is_active() && selection.is_remote && !imported.contains(&selection.family.as_str())
        {
            imported.push(&selection.family);
        }
    }
    let imports = import_rule(&imported);

    let mut root = format!(":root{{--{}:{FALLBACK_STACK};", ids.fallback_class);
    if sans.is_active() {
        root.push_str(&format!(
            "--{}:{},sans-serif,var(--{});",
            ids.sans_class,
            fix_name(&sans.family),
            ids.fallback_class
        ));
    }
    if monospace.is_active() {
        root.push_str(&format!(
            "--{}:{},monospace,var(--{});",
            ids.monospace_class,
            fix_name(&monospace.family),
            ids.fallback_class
        ));
    }
    root.push('}');

    let scanned = scanner
        .scan(&ids.sans_var(), &ids.monospace_var(), ligatures)
        .await;

    let mut css = imports;
    css.push_str(&root);
    if sans.is_active() {
        css.push_str(&format!(
            "h1,h2,h3,h4,h5,h6,p{{font-family:{}!important;}}",
            ids.sans_var()
        ));
        css.push_str(&scanned.sans_css());
    }
    if monospace.is_active() {
        css.push_str(&scanned.monospace_css());
    }
    css
}

/// Memoized stylesheet builder bound to one scanner and one id set.
///
/// Keyed on both selections plus the ligature flag; concurrent builds with
/// the same key share one computation.
pub struct RuleBuilder {
    memo: SharedMemo<(FontSelection, FontSelection, bool), String>,
}

impl RuleBuilder {
    pub fn new(scanner: Arc<StyleScanner>, ids: SessionIds) -> Self {
        let memo = SharedMemo::new(move |args: &(FontSelection, FontSelection, bool)| {
            let (sans, monospace, ligatures) = args.clone();
            let scanner = Arc::clone(&scanner);
            let ids = ids.clone();
            async move { build_stylesheet(&scanner, &ids, &sans, &monospace, ligatures).await }
                .boxed()
        });
        Self { memo }
    }

    pub async fn build(
        &self,
        sans: &FontSelection,
        monospace: &FontSelection,
        ligatures: bool,
    ) -> String {
        self.memo
            .call(&(sans.clone(), monospace.clone(), ligatures))
            .await
    }

    pub fn clear_cache(&self) {
        self.memo.clear_cache();
    }
}
