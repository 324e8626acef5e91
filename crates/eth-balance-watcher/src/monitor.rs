use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::{
    task::JoinSet,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    balance::{BalanceReading, BalanceSource},
    metrics::MetricsSink,
    Wallet,
};

/// Result of checking a single wallet within a round.
#[derive(Clone, Debug, PartialEq)]
pub enum WalletOutcome {
    Success(BalanceReading),
    Failure,
}

/// Aggregated result of one round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoundSummary {
    pub wallets: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Periodically checks balances of all configured wallets and reports them to a metrics sink.
///
/// Every round queries all wallets concurrently and completes only when each of them has
/// reported either a balance or an error. Rounds never overlap.
pub struct BalanceMonitor<S, M> {
    source: Arc<S>,
    sink: Arc<M>,
    wallets: Arc<[Wallet]>,
    interval: Duration,
}

impl<S, M> Clone for BalanceMonitor<S, M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            sink: self.sink.clone(),
            wallets: self.wallets.clone(),
            interval: self.interval,
        }
    }
}

impl<S: BalanceSource, M: MetricsSink> BalanceMonitor<S, M> {
    /// `interval` must be non-zero.
    pub fn new(source: Arc<S>, sink: Arc<M>, wallets: Vec<Wallet>, interval: Duration) -> Self {
        Self {
            source,
            sink,
            wallets: wallets.into(),
            interval,
        }
    }

    /// Run a round right away, then one round per `interval` until `cancellation` fires.
    ///
    /// Cancellation is observed between rounds only: a round in flight always completes. Ticks
    /// missed during a long round collapse into a single catch-up round.
    pub async fn start(self, cancellation: CancellationToken) {
        info!(
            wallets_count = self.wallets.len(),
            interval = ?self.interval,
            "Starting balance monitor"
        );

        self.check_all_balances().await;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => break,
                _ = ticker.tick() => {
                    self.check_all_balances().await;
                }
            }
        }

        info!("Balance monitor stopped");
    }

    /// Run exactly one round, outside of the schedule.
    pub async fn check_once(&self) -> RoundSummary {
        self.check_all_balances().await
    }

    async fn check_all_balances(&self) -> RoundSummary {
        debug!(
            wallets_count = self.wallets.len(),
            "Checking all wallet balances"
        );

        let mut round = JoinSet::new();
        let mut tasks = HashMap::with_capacity(self.wallets.len());
        for wallet in self.wallets.iter() {
            let source = self.source.clone();
            let sink = self.sink.clone();
            let task_wallet = wallet.clone();
            let task = round
                .spawn(async move { check_wallet_balance(&*source, &*sink, &task_wallet).await });
            tasks.insert(task.id(), wallet);
        }

        let mut summary = RoundSummary {
            wallets: self.wallets.len(),
            ..Default::default()
        };
        while let Some(result) = round.join_next().await {
            match result {
                Ok(WalletOutcome::Success(_)) => summary.succeeded += 1,
                Ok(WalletOutcome::Failure) => summary.failed += 1,
                Err(err) => {
                    summary.failed += 1;
                    // The task died before reporting, so report on its behalf.
                    match tasks.get(&err.id()) {
                        Some(wallet) => {
                            error!(
                                wallet_name = %wallet.name,
                                address = %wallet.address,
                                "Balance check task did not complete: {err}"
                            );
                            self.sink.record_error(wallet);
                        }
                        None => error!("Balance check task did not complete: {err}"),
                    }
                }
            }
        }

        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Balance check round completed"
        );
        summary
    }
}

async fn check_wallet_balance(
    source: &impl BalanceSource,
    sink: &impl MetricsSink,
    wallet: &Wallet,
) -> WalletOutcome {
    let start = Instant::now();

    let wei = match source.get_balance(wallet.address).await {
        Ok(wei) => wei,
        Err(err) => {
            error!(
                wallet_name = %wallet.name,
                address = %wallet.address,
                "Failed to get wallet balance: {err}"
            );
            sink.record_error(wallet);
            return WalletOutcome::Failure;
        }
    };

    let reading = BalanceReading::new(wei, OffsetDateTime::now_utc(), start.elapsed());
    sink.record_success(wallet, &reading);

    debug!(
        wallet_name = %wallet.name,
        address = %wallet.address,
        balance_wei = %reading.wei,
        balance_ether = reading.ether_f64(),
        duration_ms = reading.duration.as_secs_f64() * 1000.0,
        "Balance updated"
    );
    WalletOutcome::Success(reading)
}
