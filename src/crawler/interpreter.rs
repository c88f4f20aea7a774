//! Action tree interpreter
//!
//! Walks an [`Action`] tree against a page. Each visit fetches the page,
//! parses it and runs the action's query; the matches are then handled
//! according to the action's mode:
//!
//! - **follow**: nested actions run on the current page, then the first match
//!   is dispatched and becomes the next page for the same action. The chain
//!   ends with [`GrabError::NoResults`] on the first page without a match.
//! - **every**: every match is dispatched in document order and, if there is a
//!   nested action, processed with it before the next match.
//!
//! Processing is strictly sequential per target. The only waiting besides
//! network I/O happens when a download is queued into a full pool.

use crate::config::{Action, Mode};
use crate::crawler::context::{GrabContext, TargetScope};
use crate::crawler::dispatcher::Dispatcher;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::query_page;
use crate::GrabError;
use std::future::Future;
use std::pin::Pin;
use url::Url;

/// Boxed future returned by the recursive [`Interpreter::process`]
pub type ProcessFuture<'a> = Pin<Box<dyn Future<Output = Result<(), GrabError>> + Send + 'a>>;

/// Interprets action trees for one target
pub struct Interpreter<'a> {
    ctx: &'a GrabContext,
    dispatcher: Dispatcher<'a>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter for `scope`
    pub fn new(ctx: &'a GrabContext, scope: &'a TargetScope) -> Self {
        Self {
            ctx,
            dispatcher: Dispatcher::new(ctx, scope),
        }
    }

    /// Processes `action` starting from the page at `base`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The tree was walked completely
    /// * `Err(GrabError)` - The first failure, from any depth of the tree
    pub fn process<'b>(&'b self, base: Url, action: &'b Action) -> ProcessFuture<'b> {
        Box::pin(async move {
            match &action.mode {
                Mode::Follow => self.follow(base, action).await,
                Mode::Every => self.every(base, action).await,
                Mode::Unknown(mode) => Err(GrabError::UnknownMode(mode.clone())),
            }
        })
    }

    /// Fetches `url` and returns the matches of the action's query
    async fn visit(&self, url: &Url, action: &Action) -> Result<Vec<String>, GrabError> {
        tracing::debug!("Visiting {} ({})", url, action.query);
        let body = fetch_page(&self.ctx.client, url.as_str()).await?;
        query_page(url.as_str(), &body, &action.query)
    }

    async fn follow(&self, start: Url, action: &Action) -> Result<(), GrabError> {
        let mut current = start;
        let mut pages = 0usize;

        loop {
            let matches = self.visit(&current, action).await?;
            pages += 1;

            if let Some(next) = &action.next {
                self.process(current.clone(), next).await?;
            }

            let Some(first) = matches.first() else {
                return Err(GrabError::NoResults {
                    url: current.to_string(),
                });
            };

            let resolved = self
                .dispatcher
                .dispatch(&current, first, action)
                .await?
                .ok_or_else(|| GrabError::UnresolvedMatch {
                    url: current.to_string(),
                    raw: first.clone(),
                })?;

            if self.ctx.max_follow > 0 && pages >= self.ctx.max_follow {
                return Err(GrabError::FollowLimit {
                    limit: self.ctx.max_follow,
                    url: resolved.to_string(),
                });
            }

            current = resolved;
        }
    }

    async fn every(&self, base: Url, action: &Action) -> Result<(), GrabError> {
        let matches = self.visit(&base, action).await?;

        if matches.is_empty() {
            return match action.next {
                Some(_) => Err(GrabError::MissingContent {
                    url: base.to_string(),
                    query: action.query.clone(),
                }),
                None => Ok(()),
            };
        }

        for raw in &matches {
            let resolved = self.dispatcher.dispatch(&base, raw, action).await?;

            if let Some(next) = &action.next {
                let url = resolved.ok_or_else(|| GrabError::UnresolvedMatch {
                    url: base.to_string(),
                    raw: raw.clone(),
                })?;
                self.process(url, next).await?;
            }
        }

        Ok(())
    }
}
