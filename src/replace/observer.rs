//! Debounced mutation observer driving the replacer
//!
//! Subscribes to document mutations and runs the replacement pass with a
//! leading-edge debounce: the first mutation in a burst is handled at once,
//! the rest fold into a single trailing pass.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::dom::Document;
use crate::utils::SessionIds;

use super::debounce::{Debouncer, Decision};
use super::invoke_replacer;

/// Handle to a running observer task.
pub struct ObserverHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ObserverHandle {
    /// Signal the task to stop; pending trailing runs are abandoned.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Stop and wait for the task to exit.
    pub async fn join(self) {
        self.stop();
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the observer over `document`, replacing with `ids`' variables.
///
/// The mutation subscription is registered before the task starts, so no
/// mutation between call and spawn is lost.
pub fn start_observing(
    document: Arc<RwLock<Document>>,
    ids: SessionIds,
    delay: Duration,
) -> ObserverHandle {
    let mut mutations = match document.write() {
        Ok(mut doc) => doc.subscribe_mutations(),
        Err(_) => {
            // Poisoned document; return a handle whose task exits at once.
            let (stop, _) = watch::channel(false);
            let task = tokio::spawn(async {});
            return ObserverHandle { stop, task };
        }
    };

    let (stop, mut stop_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut debouncer = Debouncer::new(delay);
        let mut trailing: Option<time::Instant> = None;

        loop {
            // A dummy far-future deadline keeps the select arm well formed
            // when no trailing run is pending.
            let deadline = trailing
                .unwrap_or_else(|| time::Instant::now() + Duration::from_secs(86_400));
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                mutation = mutations.recv() => {
                    let Some(mutation) = mutation else {
                        // Document dropped its sender side; nothing more
                        // will ever arrive.
                        break;
                    };
                    log::trace!("mutation under <{}>", mutation.parent_tag);
                    match debouncer.on_event(Instant::now()) {
                        Decision::RunNow => run_replacer(&document, &ids),
                        Decision::Defer(at) => {
                            trailing = Some(time::Instant::from_std(at));
                        }
                    }
                }
                _ = time::sleep_until(deadline), if trailing.is_some() => {
                    trailing = None;
                    debouncer.on_trailing(Instant::now());
                    run_replacer(&document, &ids);
                }
            }
        }
    });

    ObserverHandle { stop, task }
}

fn run_replacer(document: &Arc<RwLock<Document>>, ids: &SessionIds) {
    if let Ok(mut doc) = document.write() {
        invoke_replacer(&mut doc, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;

    fn styled_document() -> Arc<RwLock<Document>> {
        Arc::new(RwLock::new(Document::new()))
    }

    fn pinned_count(document: &Arc<RwLock<Document>>, ids: &SessionIds) -> usize {
        let doc = document.read().unwrap();
        let mut count = 0;
        let mut stack: Vec<&Node> = doc.body().children.iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(el) = node.as_element() {
                if el
                    .style_property("font-family")
                    .is_some_and(|d| d.value == ids.sans_var() || d.value == ids.monospace_var())
                {
                    count += 1;
                }
            }
            stack.extend(node.children.iter());
        }
        count
    }

    #[tokio::test]
    async fn test_leading_run_replaces_immediately() {
        let document = styled_document();
        let ids = SessionIds::generate();
        let handle = start_observing(Arc::clone(&document), ids.clone(), REPLACER_DELAY);

        document
            .write()
            .unwrap()
            .append_to_body(Node::with_computed_font("p", "Georgia, serif"));

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(pinned_count(&document, &ids), 1);
        handle.join().await;
    }

    #[tokio::test]
    async fn test_burst_collapses_into_trailing_run() {
        let document = styled_document();
        let ids = SessionIds::generate();
        let handle = start_observing(Arc::clone(&document), ids.clone(), REPLACER_DELAY);

        // First mutation runs immediately and opens the window.
        document
            .write()
            .unwrap()
            .append_to_body(Node::with_computed_font("p", "Georgia, serif"));
        time::sleep(Duration::from_millis(30)).await;

        // Second mutation lands inside the window; it must wait for the
        // trailing run.
        document
            .write()
            .unwrap()
            .append_to_body(Node::with_computed_font("code", "Menlo, monospace"));
        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(pinned_count(&document, &ids), 1);

        // After the window closes the trailing run picks it up.
        time::sleep(REPLACER_DELAY + Duration::from_millis(100)).await;
        assert_eq!(pinned_count(&document, &ids), 2);
        handle.join().await;
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let document = styled_document();
        let handle = start_observing(document, SessionIds::generate(), REPLACER_DELAY);
        assert!(!handle.is_finished());
        handle.join().await;
    }

    const REPLACER_DELAY: Duration = Duration::from_millis(200);
}
