//! Display surface for interactive re-rendering.
//!
//! Every selection change submits a new [`CompositeRequest`] and receives a
//! monotonically increasing token. Only the render holding the latest token
//! may publish to the surface; anything older is discarded when it
//! completes, even if it finishes last.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shadowcaster_catalog_model::CompositeRequest;
use shadowcaster_common::error::ShadowcasterResult;
use tokio::sync::watch;

use crate::compositor::{CompositeRenderer, CompositeResult};

/// What the surface currently shows.
#[derive(Debug, Clone)]
pub struct PresentedComposite {
    pub token: u64,
    /// `false` while the overlay of this request is still decoding.
    pub complete: bool,
    pub result: Arc<CompositeResult>,
}

/// How a submitted render ended.
#[derive(Debug, Clone)]
pub enum SurfaceOutcome {
    /// The render was the latest request and is now on the surface.
    Presented(Arc<CompositeResult>),
    /// A newer request was submitted before this one completed.
    Superseded { token: u64, latest: u64 },
}

impl SurfaceOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, Self::Presented(_))
    }
}

/// Owns the displayed composite and serializes who may replace it.
pub struct RenderSurface {
    renderer: CompositeRenderer,
    latest_token: AtomicU64,
    tx: watch::Sender<Option<PresentedComposite>>,
}

impl RenderSurface {
    pub fn new(renderer: CompositeRenderer) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            renderer,
            latest_token: AtomicU64::new(0),
            tx,
        }
    }

    pub fn renderer(&self) -> &CompositeRenderer {
        &self.renderer
    }

    /// Receive every composite the surface presents.
    pub fn subscribe(&self) -> watch::Receiver<Option<PresentedComposite>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<PresentedComposite> {
        self.tx.borrow().clone()
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    /// Invalidate every in-flight render without submitting a new one.
    ///
    /// The token is bumped under the channel's write lock, the same lock
    /// `publish` holds while it checks the token and writes the slot, so a
    /// stale render can never land after a newer request has started.
    pub fn invalidate(&self) -> u64 {
        let mut token = 0;
        self.tx.send_if_modified(|_| {
            token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
            false
        });
        tracing::debug!(token, "Surface invalidated");
        token
    }

    /// Render `request` and present it if no newer request arrived meanwhile.
    ///
    /// The base-only composite is shown as soon as the base is drawn; the
    /// final composite replaces it once the overlay is blended. Errors from
    /// a superseded render are swallowed.
    pub async fn submit(&self, request: CompositeRequest) -> ShadowcasterResult<SurfaceOutcome> {
        let token = self.invalidate();

        let pending = match self.renderer.start(request).await {
            Ok(pending) => pending,
            Err(e) if self.is_current(token) => return Err(e),
            Err(e) => {
                tracing::debug!(token, error = %e, "Discarding failure of stale render");
                return Ok(self.superseded(token));
            }
        };

        if pending.has_pending_overlay() {
            self.publish(token, pending.snapshot(), false);
            if !self.is_current(token) {
                // Dropping `pending` aborts the overlay decode.
                return Ok(self.superseded(token));
            }
        }

        let result = pending.finish().await;
        match self.publish(token, result, true) {
            Some(result) => Ok(SurfaceOutcome::Presented(result)),
            None => Ok(self.superseded(token)),
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.latest_token() == token
    }

    fn superseded(&self, token: u64) -> SurfaceOutcome {
        let latest = self.latest_token();
        tracing::debug!(token, latest, "Render superseded");
        SurfaceOutcome::Superseded { token, latest }
    }

    fn publish(
        &self,
        token: u64,
        result: CompositeResult,
        complete: bool,
    ) -> Option<Arc<CompositeResult>> {
        let result = Arc::new(result);
        let published = self.tx.send_if_modified(|slot| {
            if !self.is_current(token) {
                return false;
            }
            if slot.as_ref().is_some_and(|shown| shown.token > token) {
                return false;
            }
            *slot = Some(PresentedComposite {
                token,
                complete,
                result: result.clone(),
            });
            true
        });
        if published {
            tracing::trace!(token, complete, "Composite presented");
            Some(result)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("renderer", &self.renderer)
            .field("latest_token", &self.latest_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{url, GatedLoader};
    use shadowcaster_common::config::CompositorConfig;
    use shadowcaster_common::error::ShadowcasterError;
    use std::time::Duration;

    fn gated_surface(gated_url: &str) -> (Arc<RenderSurface>, Arc<GatedLoader>) {
        let loader = GatedLoader::new(gated_url, 16);
        let config = CompositorConfig {
            canvas_size: 16,
            ..CompositorConfig::default()
        };
        let renderer = CompositeRenderer::new(config, loader.clone());
        (Arc::new(RenderSurface::new(renderer)), loader)
    }

    #[tokio::test]
    async fn test_single_submit_is_presented() {
        let (surface, _) = gated_surface("mem://none");
        let mut rx = surface.subscribe();

        let outcome = surface
            .submit(CompositeRequest::base_only(url("mem://green")))
            .await
            .unwrap();
        assert!(outcome.is_presented());

        rx.changed().await.unwrap();
        let shown = rx.borrow().clone().unwrap();
        assert_eq!(shown.token, 1);
        assert!(shown.complete);
        assert_eq!(shown.result.pixel(0, 0), Some([0, 255, 0, 255]));
    }

    #[tokio::test]
    async fn test_stale_render_is_discarded() {
        let (surface, loader) = gated_surface("mem://red");

        let slow = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .submit(CompositeRequest::base_only(url("mem://red")))
                    .await
            })
        };
        loader.entered.notified().await;

        let fast = surface
            .submit(CompositeRequest::base_only(url("mem://green")))
            .await
            .unwrap();
        assert!(fast.is_presented());

        loader.release.notify_one();
        let stale = slow.await.unwrap().unwrap();
        assert!(matches!(
            stale,
            SurfaceOutcome::Superseded {
                token: 1,
                latest: 2
            }
        ));

        let shown = surface.current().unwrap();
        assert_eq!(shown.token, 2);
        assert_eq!(shown.result.pixel(3, 3), Some([0, 255, 0, 255]));
    }

    #[tokio::test]
    async fn test_base_snapshot_shown_while_overlay_pending() {
        let (surface, loader) = gated_surface("mem://blue");
        let mut rx = surface.subscribe();

        let render = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .submit(CompositeRequest::with_overlay(
                        url("mem://red"),
                        url("mem://blue"),
                    ))
                    .await
            })
        };

        loader.entered.notified().await;
        rx.changed().await.unwrap();
        let early = rx.borrow_and_update().clone().unwrap();
        assert!(!early.complete);
        assert_eq!(early.result.pixel(0, 0), Some([255, 0, 0, 255]));

        loader.release.notify_one();
        assert!(render.await.unwrap().unwrap().is_presented());
        let done = surface.current().unwrap();
        assert!(done.complete);
        let px = done.result.pixel(0, 0).unwrap();
        assert!((i32::from(px[0]) - 127).abs() <= 1);
        assert!((i32::from(px[2]) - 127).abs() <= 1);
    }

    #[tokio::test]
    async fn test_current_failure_is_reported_stale_failure_is_not() {
        let (surface, loader) = gated_surface("mem://broken");

        let err = {
            let (plain, _) = gated_surface("mem://none");
            plain
                .submit(CompositeRequest::base_only(url("mem://broken")))
                .await
                .unwrap_err()
        };
        assert!(matches!(err, ShadowcasterError::BaseDecodeFailed { .. }));

        let stale = {
            let surface = surface.clone();
            tokio::spawn(async move {
                surface
                    .submit(CompositeRequest::base_only(url("mem://broken")))
                    .await
            })
        };
        loader.entered.notified().await;
        surface.invalidate();
        loader.release.notify_one();

        assert!(matches!(
            stale.await.unwrap().unwrap(),
            SurfaceOutcome::Superseded { .. }
        ));
        assert!(surface.current().is_none());
    }

    #[test]
    fn test_invalidate_waits_for_slot_lock() {
        let (surface, _) = gated_surface("mem://none");

        let shown = surface.tx.borrow();
        let bump = {
            let surface = surface.clone();
            std::thread::spawn(move || surface.invalidate())
        };
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(surface.latest_token(), 0);

        drop(shown);
        assert_eq!(bump.join().unwrap(), 1);
        assert_eq!(surface.latest_token(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_end_on_latest() {
        let (surface, _) = gated_surface("mem://none");
        let colors = ["mem://red", "mem://green", "mem://blue"];

        let handles: Vec<_> = (0..24)
            .map(|i| {
                let surface = surface.clone();
                let base = url(colors[i % colors.len()]);
                tokio::spawn(async move { surface.submit(CompositeRequest::base_only(base)).await })
            })
            .collect();

        let mut presented = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_presented() {
                presented += 1;
            }
        }
        assert!(presented >= 1);
        assert_eq!(surface.current().unwrap().token, surface.latest_token());
    }
}
