use crate::domain::ports::SettlementListener;
use crate::domain::transaction::Transaction;
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

/// Discards closure events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

#[async_trait]
impl SettlementListener for NoopListener {
    async fn on_settled(&self, _tx: &Transaction) -> Result<()> {
        Ok(())
    }
}

/// Reports closure through `tracing`, for runs without a downstream workflow.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

#[async_trait]
impl SettlementListener for TracingListener {
    async fn on_settled(&self, tx: &Transaction) -> Result<()> {
        info!(
            tx = tx.id(),
            agreement = tx.agreement(),
            mode = ?tx.mode(),
            evidence = tx.evidence_reference().unwrap_or("-"),
            "work agreement settled"
        );
        Ok(())
    }
}

/// Forwards every settled snapshot over an unbounded channel, letting the
/// agreement workflow consume closures on its own task.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<Transaction>,
}

impl ChannelListener {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Transaction>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl SettlementListener for ChannelListener {
    async fn on_settled(&self, tx: &Transaction) -> Result<()> {
        self.sender
            .send(tx.clone())
            .map_err(|_| SettlementError::ListenerError("receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::PaymentMode;

    #[tokio::test]
    async fn test_channel_listener_forwards_snapshot() {
        let (listener, mut rx) = ChannelListener::channel();
        let tx = Transaction::open(1, 2, PaymentMode::Barter, 3, 4);

        listener.on_settled(&tx).await.unwrap();
        assert_eq!(rx.recv().await, Some(tx));
    }

    #[tokio::test]
    async fn test_channel_listener_reports_closed_receiver() {
        let (listener, rx) = ChannelListener::channel();
        drop(rx);

        let tx = Transaction::open(1, 2, PaymentMode::Money, 3, 4);
        assert!(matches!(
            listener.on_settled(&tx).await,
            Err(SettlementError::ListenerError(_))
        ));
    }
}
