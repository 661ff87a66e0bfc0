//! Processing step implementations
//!
//! The settlement itself is outside the engine; the processor shipped here
//! records the settlement in the log, which is what the clearing simulator
//! does with a claimed transaction.

use crate::core::traits::TransactionProcessor;
use crate::types::Transaction;
use async_trait::async_trait;

/// Processor that logs each settled transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProcessor;

#[async_trait]
impl TransactionProcessor for LoggingProcessor {
    async fn process(&self, tx: &Transaction) {
        tracing::info!(
            id = tx.id(),
            origin = tx.origin(),
            destiny = tx.destiny(),
            amount = tx.amount(),
            "settling transaction"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    type Fields = BTreeMap<String, String>;

    /// Layer that keeps the fields of every event
    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<Fields>>>,
    }

    struct FieldVisitor<'a>(&'a mut Fields);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.events.lock().push(fields);
        }
    }

    #[tokio::test]
    async fn test_logging_processor_emits_settlement_event() {
        let capture = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let tx = Transaction::new("tx-1", "0001", "0002", 1000).unwrap();
        LoggingProcessor.process(&tx).await;

        let events = capture.events.lock();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event["message"], "settling transaction");
        assert_eq!(event["id"], "tx-1");
        assert_eq!(event["origin"], "0001");
        assert_eq!(event["destiny"], "0002");
        assert_eq!(event["amount"], "1000");
    }
}
