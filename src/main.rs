//! Demo binary: builds a synthetic document, applies a font configuration,
//! and prints the injected stylesheet.

use std::sync::{Arc, RwLock};

use refont::dom::style_tag::style_tag_content;
use refont::dom::{CssRule, Document, Node, StylesheetRef};
use refont::engine::FontEngine;
use refont::network::StaticFetcher;
use refont::settings::{FontSettings, MemoryStore};

fn demo_document() -> Document {
    let mut doc = Document::new();
    doc.attach_stylesheet(StylesheetRef::accessible(
        Some("/site.css"),
        vec![
            CssRule::new("body", "font-family:Helvetica,Arial,sans-serif;"),
            CssRule::new(".article", "font-family:Georgia,\"Times New Roman\",serif;"),
            CssRule::new(":root", "--code-font:Menlo,monospace;"),
            CssRule::new("pre,code", "font-family:var(--code-font);"),
        ],
    ));
    doc.attach_stylesheet(StylesheetRef::cross_origin("https://cdn.example.com/theme.css"));
    doc.append_to_body(Node::with_computed_font("p", "Georgia, serif"));
    doc.append_to_body(Node::with_computed_font("code", "Menlo, monospace"));
    doc
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let document = Arc::new(RwLock::new(demo_document()));

    let mut fetcher = StaticFetcher::new();
    fetcher.insert(
        "https://cdn.example.com/theme.css",
        "/* theme */ .hero { font-family: \"Proxima Nova\", sans-serif; }",
    );

    let store = MemoryStore::new(FontSettings {
        font_default: "GF-Inter".into(),
        font_mono: "JetBrains Mono".into(),
        ligatures: false,
        off: false,
    });

    let mut engine = FontEngine::new(
        Arc::clone(&document),
        Arc::new(store),
        Arc::new(fetcher),
    );
    engine.preview().await;
    let replaced = engine.run_replacer();

    let doc = document.read().unwrap_or_else(|e| e.into_inner());
    println!("{} {}", refont::NAME, refont::VERSION);
    match style_tag_content(&doc, &engine.ids().style_tag_id) {
        Some(css) => {
            println!("injected stylesheet ({} bytes):\n", css.len());
            for rule in css.split_inclusive('}') {
                println!("{rule}");
            }
            println!("\npinned {replaced} rendered elements inline");
        }
        None => println!("no stylesheet injected"),
    }
}
