#![allow(unused)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy_primitives::{Address, U256};
use eth_balance_watcher::{
    balance::{BalanceReading, BalanceSource, RpcError},
    metrics::MetricsSink,
    monitor::BalanceMonitor,
    Wallet,
};
use tokio::time::Instant;

/// `count` wallets named `wallet-0`, `wallet-1`, ... with distinct addresses.
pub fn wallets(count: u8) -> Vec<Wallet> {
    (0..count)
        .map(|i| Wallet::new(format!("wallet-{i}"), Address::with_last_byte(i + 1)))
        .collect()
}

pub fn ether(wei: u128) -> U256 {
    U256::from(wei) * U256::from(1_000_000_000_000_000_000u128)
}

/// In-memory balance source with scripted balances and latencies.
pub struct FakeSource {
    balances: HashMap<Address, U256>,
    latency: Box<dyn Fn(usize, Address) -> Duration + Send + Sync>,
    calls: Mutex<Vec<(Address, Instant)>>,
}

impl FakeSource {
    /// Every wallet answers immediately with its balance; addresses without one fail.
    pub fn new(balances: impl IntoIterator<Item = (Address, U256)>) -> Self {
        Self {
            balances: balances.into_iter().collect(),
            latency: Box::new(|_, _| Duration::ZERO),
            calls: Mutex::new(vec![]),
        }
    }

    /// Every wallet answers with `balance`.
    pub fn uniform(wallets: &[Wallet], balance: U256) -> Self {
        Self::new(wallets.iter().map(|wallet| (wallet.address, balance)))
    }

    /// Latency of a query, given its global (0-based) call index and the queried address.
    pub fn with_latency(
        mut self,
        latency: impl Fn(usize, Address) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.latency = Box::new(latency);
        self
    }

    pub fn calls(&self) -> Vec<(Address, Instant)> {
        self.calls.lock().expect("Mutex poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("Mutex poisoned").len()
    }
}

impl BalanceSource for FakeSource {
    async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        let call = {
            let mut calls = self.calls.lock().expect("Mutex poisoned");
            calls.push((address, Instant::now()));
            calls.len() - 1
        };

        tokio::time::sleep((self.latency)(call, address)).await;

        self.balances
            .get(&address)
            .copied()
            .ok_or(RpcError::Timeout {
                address,
                timeout: Duration::from_secs(10),
            })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Success {
        wallet: Wallet,
        wei: U256,
        ether: String,
        duration: Duration,
        at: Instant,
    },
    Error {
        wallet: Wallet,
        at: Instant,
    },
}

impl SinkEvent {
    pub fn wallet(&self) -> &Wallet {
        match self {
            SinkEvent::Success { wallet, .. } | SinkEvent::Error { wallet, .. } => wallet,
        }
    }

    /// The event without timing information, for comparing outcomes.
    pub fn outcome(&self) -> (String, Option<U256>, Option<String>) {
        match self {
            SinkEvent::Success {
                wallet, wei, ether, ..
            } => (wallet.name.clone(), Some(*wei), Some(ether.clone())),
            SinkEvent::Error { wallet, .. } => (wallet.name.clone(), None, None),
        }
    }
}

/// Sink keeping every reported event in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("Mutex poisoned").clone()
    }

    pub fn successes(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Success { .. }))
            .count()
    }

    pub fn errors_for(&self, wallet: &Wallet) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Error { .. }) && event.wallet() == wallet)
            .count()
    }

    pub fn successes_for(&self, wallet: &Wallet) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Success { .. }) && event.wallet() == wallet)
            .count()
    }

    /// Outcomes sorted by wallet name, so that the in-round order does not matter.
    pub fn sorted_outcomes(&self) -> Vec<(String, Option<U256>, Option<String>)> {
        let mut outcomes: Vec<_> = self.events().iter().map(SinkEvent::outcome).collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        outcomes
    }
}

impl MetricsSink for RecordingSink {
    fn record_success(&self, wallet: &Wallet, reading: &BalanceReading) {
        self.events
            .lock()
            .expect("Mutex poisoned")
            .push(SinkEvent::Success {
                wallet: wallet.clone(),
                wei: reading.wei,
                ether: reading.ether.clone(),
                duration: reading.duration,
                at: Instant::now(),
            });
    }

    fn record_error(&self, wallet: &Wallet) {
        self.events
            .lock()
            .expect("Mutex poisoned")
            .push(SinkEvent::Error {
                wallet: wallet.clone(),
                at: Instant::now(),
            });
    }
}

pub struct TestMonitor {
    pub monitor: BalanceMonitor<FakeSource, RecordingSink>,
    pub source: Arc<FakeSource>,
    pub sink: Arc<RecordingSink>,
}

impl TestMonitor {
    pub fn new(source: FakeSource, wallets: Vec<Wallet>, interval: Duration) -> Self {
        let source = Arc::new(source);
        let sink = Arc::new(RecordingSink::default());
        Self {
            monitor: BalanceMonitor::new(source.clone(), sink.clone(), wallets, interval),
            source,
            sink,
        }
    }
}
