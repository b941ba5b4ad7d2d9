use cardscope_core::{ProfileStore, RewardProvider};
use cardscope_shared::{RewardData, RewardProfile, RewardSchedule};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::{run_with_retry, BackoffPolicy, Sleeper};
use crate::pool::WorkerPool;
use crate::RefreshError;

/// Counts for one refresh run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub scanned: usize,
    /// Usable reward data stored
    pub refreshed: usize,
    /// Provider had nothing or failed; empty marker stored for the next run
    pub stored_empty: usize,
    /// Store write failed or the task panicked
    pub failed: usize,
    /// Not dispatched because the run was cancelled
    pub skipped: usize,
}

enum CardOutcome {
    Refreshed,
    StoredEmpty,
    Failed,
}

struct RefreshContext {
    store: Arc<dyn ProfileStore>,
    provider: Arc<dyn RewardProvider>,
    policy: BackoffPolicy,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
}

/// Finds profiles with no usable reward data and refetches them from the provider
pub struct RefreshOrchestrator {
    ctx: Arc<RefreshContext>,
    pool: Arc<WorkerPool>,
}

impl RefreshOrchestrator {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        provider: Arc<dyn RewardProvider>,
        pool: Arc<WorkerPool>,
        policy: BackoffPolicy,
        sleeper: Arc<dyn Sleeper>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx: Arc::new(RefreshContext {
                store,
                provider,
                policy,
                sleeper,
                cancel,
            }),
            pool,
        }
    }

    pub async fn run_once(&self) -> Result<RefreshSummary, RefreshError> {
        let started = Instant::now();

        let stale = self
            .ctx
            .store
            .find_stale_or_empty_profiles()
            .await
            .map_err(|e| RefreshError::StoreError(e.to_string()))?;

        let mut summary = RefreshSummary {
            scanned: stale.len(),
            ..Default::default()
        };
        if stale.is_empty() {
            info!("No stale reward profiles to refresh");
            return Ok(summary);
        }

        info!(count = stale.len(), "Refreshing stale reward profiles");

        let mut handles = Vec::with_capacity(stale.len());
        for profile in stale {
            if self.ctx.cancel.is_cancelled() {
                summary.skipped += 1;
                continue;
            }
            let card = profile.display_name();
            let handle = self.pool.submit(refresh_card(self.ctx.clone(), profile)).await?;
            handles.push((card, handle));
        }

        for (card, handle) in handles {
            match handle.await {
                Ok(CardOutcome::Refreshed) => summary.refreshed += 1,
                Ok(CardOutcome::StoredEmpty) => summary.stored_empty += 1,
                Ok(CardOutcome::Failed) => summary.failed += 1,
                Err(e) => {
                    error!(card = %card, error = %e, "Refresh task panicked");
                    summary.failed += 1;
                }
            }
        }

        if summary.skipped > 0 {
            warn!(skipped = summary.skipped, "Refresh cancelled before all cards were dispatched");
        }
        info!(
            scanned = summary.scanned,
            refreshed = summary.refreshed,
            stored_empty = summary.stored_empty,
            failed = summary.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh run finished"
        );

        Ok(summary)
    }
}

async fn refresh_card(ctx: Arc<RefreshContext>, profile: RewardProfile) -> CardOutcome {
    let card = profile.display_name();
    let provider = &ctx.provider;
    let name = card.as_str();

    let outcome = run_with_retry(&ctx.policy, ctx.sleeper.as_ref(), &ctx.cancel, move |attempt| {
        debug!(card = %name, attempt, "Fetching reward details");
        provider.fetch_reward_profile(name)
    })
    .await;

    let (data, result) = match outcome.result {
        Ok(data) if data.schedule().map_or(true, RewardSchedule::is_trivially_empty) => {
            info!(card = %card, "Provider returned no usable reward data");
            (RewardData::Empty, CardOutcome::StoredEmpty)
        }
        Ok(data) => (data, CardOutcome::Refreshed),
        Err(e) => {
            warn!(
                card = %card,
                attempts = outcome.attempts,
                error = %e,
                "Reward fetch failed, storing empty marker"
            );
            (RewardData::Empty, CardOutcome::StoredEmpty)
        }
    };

    if let Err(e) = ctx
        .store
        .upsert_profile(&profile.issuer, &profile.product, data)
        .await
    {
        error!(card = %card, error = %e, "Failed to store reward details");
        return CardOutcome::Failed;
    }

    if matches!(result, CardOutcome::Refreshed) {
        info!(card = %card, "Reward details refreshed");
    }
    result
}
