//! Wait for a predicate over the document, driven by its mutation feed.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::dom::DocumentTree;

/// Resolve with the first `Some` returned by `check`.
///
/// `check` runs once immediately and again after every mutation. A mutation
/// observed after `timeout` resolves with `None`; if the page stays quiet,
/// one last check runs at `timeout + grace`.
pub async fn wait_for<D, T, F>(doc: &D, timeout: Duration, grace: Duration, mut check: F) -> Option<T>
where
    D: DocumentTree + ?Sized,
    F: FnMut() -> Option<T>,
{
    let mut mutations = doc.subscribe();

    if let Some(found) = check() {
        return Some(found);
    }

    let deadline = Instant::now() + timeout;
    let final_check = sleep_until(deadline + grace);
    tokio::pin!(final_check);

    loop {
        tokio::select! {
            changed = mutations.changed() => {
                if changed.is_err() {
                    // Document dropped its feed; only the timer is left.
                    (&mut final_check).await;
                    return check();
                }
                trace!("Mutation observed");
                if let Some(found) = check() {
                    return Some(found);
                }
                if Instant::now() > deadline {
                    return None;
                }
            }
            _ = &mut final_check => {
                trace!("Wait timed out");
                return check();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::memory::MemoryDocument;

    #[tokio::test(start_paused = true)]
    async fn immediate_hit_does_not_wait() {
        let doc = MemoryDocument::new();
        let start = Instant::now();
        let found = wait_for(&doc, Duration::from_secs(3), Duration::from_millis(50), || Some(7)).await;
        assert_eq!(found, Some(7));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_on_mutation() {
        let doc = Arc::new(MemoryDocument::new());
        let writer = doc.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(400)).await;
            let body = writer.body();
            writer.append_element(body, "div", &[("id", "reveal")]);
        });
        let start = Instant::now();
        let found = wait_for(doc.as_ref(), Duration::from_secs(3), Duration::from_millis(50), || {
            doc.element_by_id("reveal")
        })
        .await;
        assert!(found.is_some());
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_grace() {
        let doc = MemoryDocument::new();
        let start = Instant::now();
        let found: Option<()> =
            wait_for(&doc, Duration::from_millis(3000), Duration::from_millis(50), || None).await;
        assert_eq!(found, None);
        assert_eq!(start.elapsed(), Duration::from_millis(3050));
    }

    #[tokio::test(start_paused = true)]
    async fn late_mutation_gives_up() {
        let doc = Arc::new(MemoryDocument::new());
        let writer = doc.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3020)).await;
            let body = writer.body();
            writer.append_element(body, "span", &[]);
        });
        let start = Instant::now();
        let found: Option<()> =
            wait_for(doc.as_ref(), Duration::from_millis(3000), Duration::from_millis(50), || None).await;
        assert_eq!(found, None);
        assert_eq!(start.elapsed(), Duration::from_millis(3020));
    }
}
