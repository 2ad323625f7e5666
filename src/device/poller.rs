// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling fallback.
//!
//! Keeps the cache fresh when the push channel is down or missed an
//! update. A poll runs on start, then every `poll_interval`, and
//! `refresh_delay` after every successful command.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::Shared;
use crate::error::{Error, ProtocolError};
use crate::protocol::{PushConnector, StateSource, codec};
use crate::state::DeviceState;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs the periodic and on-demand polls until `cancel` fires.
pub(crate) async fn run<C, S>(shared: Arc<Shared<C, S>>, cancel: CancellationToken)
where
    C: PushConnector,
    S: StateSource,
{
    let mut ticker = tokio::time::interval(shared.config.poll_interval().max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            () = shared.refresh.notified() => {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(shared.config.refresh_delay()) => {}
                }
            }
        }

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = shared.poll() => result,
        };

        if let Err(e) = result {
            tracing::warn!(host = %shared.config.host(), error = %e, "State poll failed");
        }
    }

    tracing::debug!(host = %shared.config.host(), "Poller task stopped");
}

impl<C, S> Shared<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    /// Fetches a full snapshot and merges it into the cache.
    ///
    /// The cache is left untouched on any failure.
    pub(crate) async fn poll(&self) -> Result<DeviceState, Error> {
        let timeout = self.config.request_timeout();
        let body = tokio::time::timeout(timeout, self.source.fetch())
            .await
            .map_err(|_| ProtocolError::timeout(timeout))??;

        let patch = codec::decode(&body)?;
        let changes = self.apply(&patch);

        tracing::debug!(changed = changes.len(), "Poll merged");

        Ok(self.cache.read())
    }
}
