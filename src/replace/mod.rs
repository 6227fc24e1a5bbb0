//! Live font replacement on rendered elements
//!
//! Stylesheet overrides miss elements styled by computed values only, and
//! elements inserted after injection. This pass walks the rendered tree and
//! pins matching elements to the session custom properties with inline
//! `!important` declarations. A debounced observer keeps it running as the
//! page mutates.

pub mod debounce;
pub mod observer;

use std::time::Duration;

use crate::dom::{Document, ElementData};
use crate::utils::SessionIds;

pub use debounce::{Debouncer, Decision};
pub use observer::{ObserverHandle, start_observing};

/// Mutation bursts within this window collapse into one trailing pass.
pub const REPLACER_DEBOUNCE: Duration = Duration::from_millis(300);

/// Should this element keep its font untouched?
///
/// Icon fonts render glyphs by codepoint; replacing them breaks the page.
/// They are recognized by name, or by a single-family stack (real text
/// almost always carries fallbacks).
fn looks_like_icon_font(family: &str) -> bool {
    let entries = family.split(',').filter(|e| !e.trim().is_empty()).count();
    entries <= 1 || family.to_ascii_lowercase().contains("icon")
}

/// Pin one element's font to the session variables if its computed family
/// references a generic category. Returns whether a declaration was written.
pub fn replace_font(element: &mut ElementData, ids: &SessionIds) -> bool {
    let Some(family) = element.computed_font_family.clone() else {
        return false;
    };
    if looks_like_icon_font(&family) {
        return false;
    }
    if family.contains("monospace") {
        element.set_style_property("font-family", &ids.monospace_var(), true);
        true
    } else if family.contains("serif") {
        element.set_style_property("font-family", &ids.sans_var(), true);
        true
    } else {
        false
    }
}

/// Run the replacement pass over every element under `<body>`.
pub fn invoke_replacer(document: &mut Document, ids: &SessionIds) -> usize {
    let mut replaced = 0;
    document.body_mut().for_each_element_mut(&mut |element| {
        if replace_font(element, ids) {
            replaced += 1;
        }
    });
    log::debug!("replacer pass pinned {replaced} elements");
    replaced
}
