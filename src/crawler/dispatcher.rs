//! Action dispatcher
//!
//! Applies an action's effect to one query match: resolve it against the page
//! URL, then print, log, queue or ignore it.

use crate::config::{Action, ActionKind};
use crate::crawler::context::{GrabContext, TargetScope};
use crate::download::DownloadJob;
use crate::url::resolve_match;
use crate::GrabError;
use url::Url;

/// Dispatches matches for one target
pub struct Dispatcher<'a> {
    ctx: &'a GrabContext,
    scope: &'a TargetScope,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher for `scope`
    pub fn new(ctx: &'a GrabContext, scope: &'a TargetScope) -> Self {
        Self { ctx, scope }
    }

    /// Applies `action` to `raw`, a match found on `base`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Url))` - The resolved URL
    /// * `Ok(None)` - `raw` action, or a match without a path
    /// * `Err(GrabError)` - Unparsable match, bail-out, unknown action, or
    ///   closed download queue
    pub async fn dispatch(
        &self,
        base: &Url,
        raw: &str,
        action: &Action,
    ) -> Result<Option<Url>, GrabError> {
        if action.kind == ActionKind::Raw {
            self.ctx.sink.emit(raw);
            return Ok(None);
        }

        let Some(resolved) = resolve_match(base, raw)? else {
            tracing::debug!("Nothing to resolve in '{}' on {}", raw.trim(), base);
            return Ok(None);
        };

        match &action.kind {
            ActionKind::Print => self.ctx.sink.emit(resolved.as_str()),
            ActionKind::Log => tracing::info!("{}", resolved),
            ActionKind::Download => self.enqueue(&resolved).await?,
            ActionKind::Noop | ActionKind::Raw => {}
            ActionKind::Unknown(name) => return Err(GrabError::UnknownAction(name.clone())),
        }

        Ok(Some(resolved))
    }

    /// Queues a download, waiting while the queue is full
    async fn enqueue(&self, url: &Url) -> Result<(), GrabError> {
        if self.scope.seen.reached(self.scope.bail_limit) {
            return Err(GrabError::Bailout {
                count: self.scope.seen.get(),
            });
        }

        let job = DownloadJob::new(
            url.clone(),
            self.scope.destination.clone(),
            self.scope.seen.clone(),
        );

        self.ctx
            .queue
            .send(job)
            .await
            .map_err(|_| GrabError::QueueClosed)
    }
}
