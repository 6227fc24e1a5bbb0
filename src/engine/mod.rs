//! Engine orchestration
//!
//! Ties the pieces together for one document: read settings, build the
//! override stylesheet, write it into the injected style tag, pin the root
//! and body elements, and react to runtime messages. One engine owns one
//! document and one set of session identifiers.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::dom::Document;
use crate::dom::style_tag::{create_or_update_style_tag, toggle_style_tag};
use crate::network::Fetch;
use crate::replace::{ObserverHandle, REPLACER_DEBOUNCE, invoke_replacer, start_observing};
use crate::rules::RuleBuilder;
use crate::scan::StyleScanner;
use crate::settings::{Message, SettingsStore};
use crate::utils::{Result, SessionIds};

/// Which roles the last apply actually activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveRoles {
    pub sans: bool,
    pub monospace: bool,
}

/// Font override engine bound to one document and one settings store.
pub struct FontEngine<S: SettingsStore> {
    document: Arc<RwLock<Document>>,
    store: Arc<S>,
    ids: SessionIds,
    scanner: Arc<StyleScanner>,
    builder: RuleBuilder,
    active: ActiveRoles,
}

impl<S: SettingsStore> FontEngine<S> {
    pub fn new<F>(document: Arc<RwLock<Document>>, store: Arc<S>, fetcher: Arc<F>) -> Self
    where
        F: Fetch + 'static,
    {
        let ids = SessionIds::generate();
        let scanner = Arc::new(StyleScanner::new(Arc::clone(&document), fetcher));
        let builder = RuleBuilder::new(Arc::clone(&scanner), ids.clone());
        Self {
            document,
            store,
            ids,
            scanner,
            builder,
            active: ActiveRoles::default(),
        }
    }

    /// Apply the current settings, or tear everything down when the kill
    /// switch is set or settings cannot be read.
    pub async fn preview(&mut self) {
        match self.store.is_off().await {
            Ok(true) => self.cleanup_styles(),
            Ok(false) => {
                if let Err(err) = self.init().await {
                    log::error!("preview failed, reverting styles: {err}");
                    self.cleanup_styles();
                }
            }
            Err(err) => {
                log::error!("could not read kill switch, reverting styles: {err}");
                self.cleanup_styles();
            }
        }
    }

    /// Build and inject the override stylesheet for the current settings.
    pub async fn init(&mut self) -> Result<()> {
        let settings = self.store.settings().await?;
        let sans = settings.sans_selection();
        let monospace = settings.monospace_selection();

        if !sans.is_active() && !monospace.is_active() {
            self.cleanup_styles();
            return Ok(());
        }

        let css = self
            .builder
            .build(&sans, &monospace, settings.ligatures)
            .await;

        self.active = ActiveRoles {
            sans: sans.is_active(),
            monospace: monospace.is_active(),
        };

        if let Ok(mut doc) = self.document.write() {
            let write = create_or_update_style_tag(&mut doc, &self.ids.style_tag_id, &css);
            log::info!(
                "injected override stylesheet ({write:?}, {} bytes)",
                css.len()
            );
            // A previous cleanup may have left the tag disabled.
            toggle_style_tag(&mut doc, &self.ids.style_tag_id, true);

            let sans_var = self.ids.sans_var();
            if self.active.sans {
                doc.root_mut().set_style_property("font-family", &sans_var, true);
                if let Some(body) = doc.body_element_mut() {
                    body.set_style_property("font-family", &sans_var, true);
                }
            } else {
                doc.root_mut().remove_style_property("font-family");
                if let Some(body) = doc.body_element_mut() {
                    body.remove_style_property("font-family");
                }
            }
        }
        Ok(())
    }

    /// Disable the injected tag and strip the inline pins. Idempotent.
    pub fn cleanup_styles(&mut self) {
        self.active = ActiveRoles::default();
        if let Ok(mut doc) = self.document.write() {
            toggle_style_tag(&mut doc, &self.ids.style_tag_id, false);
            doc.root_mut().remove_style_property("font-family");
            if let Some(body) = doc.body_element_mut() {
                body.remove_style_property("font-family");
            }
        }
        log::info!("override styles disabled");
    }

    /// One manual replacement pass over the rendered tree.
    pub fn run_replacer(&self) -> usize {
        match self.document.write() {
            Ok(mut doc) => invoke_replacer(&mut doc, &self.ids),
            Err(_) => 0,
        }
    }

    /// Start the debounced mutation observer for this document.
    pub fn start_observer(&self) -> ObserverHandle {
        self.start_observer_with(REPLACER_DEBOUNCE)
    }

    pub fn start_observer_with(&self, delay: Duration) -> ObserverHandle {
        start_observing(Arc::clone(&self.document), self.ids.clone(), delay)
    }

    /// Dispatch a raw runtime message; unknown actions are logged and
    /// ignored.
    pub async fn handle_message(&mut self, raw: &str) {
        match Message::parse(raw) {
            Some(Message::ExecutePreview) => self.preview().await,
            Some(Message::ExecuteCleanup) => self.cleanup_styles(),
            None => log::warn!("ignoring unknown message: {raw}"),
        }
    }

    /// Drop memoized scans and builds, e.g. after stylesheet churn.
    pub fn clear_caches(&self) {
        self.scanner.clear_cache();
        self.builder.clear_cache();
    }

    pub fn ids(&self) -> &SessionIds {
        &self.ids
    }

    pub fn active(&self) -> ActiveRoles {
        self.active
    }

    pub fn document(&self) -> &Arc<RwLock<Document>> {
        &self.document
    }
}
