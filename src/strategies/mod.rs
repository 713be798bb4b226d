//! Execution strategies.
//!
//! The stateful executors (TWAP, grid) live here together with the
//! single-shot order helpers. Each strategy invocation owns its running
//! state exclusively; orders are issued strictly sequentially.

pub mod grid;
pub mod single_shot;
pub mod twap;

use tokio::sync::watch;

pub use grid::{GridExecutor, GridPlan};
pub use single_shot::{
    cancel_orders, order_statuses, place_limit_order, place_market_order, place_oco_order,
    place_stop_limit_order, place_stop_market_order, OcoPair,
};
pub use twap::{TwapExecutor, TwapPlan};

/// Caller-side handle to abort a long-running strategy loop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Token polled at the top of each strategy iteration and raced against the
/// in-loop sleeps. Without a paired handle it never fires, so the default
/// behavior is run-to-completion.
#[derive(Debug)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
    // Keeps the channel alive for tokens created via `none()`.
    _owned: Option<watch::Sender<bool>>,
}

impl StopToken {
    /// A token that can never fire.
    pub fn none() -> Self {
        let (tx, rx) = watch::channel(false);
        StopToken {
            rx,
            _owned: Some(tx),
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the paired handle requests a stop. Pends forever if no
    /// stop ever arrives, which makes it safe to race against a sleep.
    pub async fn stopped(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Handle dropped without stopping: a stop can never arrive.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked stop handle/token pair.
pub fn stop_pair() -> (StopHandle, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopToken { rx, _owned: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn stop_handle_fires_the_token() {
        let (handle, mut token) = stop_pair();
        assert!(!token.is_stopped());

        handle.stop();
        token.stopped().await;
        assert!(token.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn none_token_never_fires() {
        let mut token = StopToken::none();
        let raced = tokio::select! {
            _ = token.stopped() => true,
            _ = tokio::time::sleep(Duration::from_secs(3600)) => false,
        };
        assert!(!raced);
    }
}
