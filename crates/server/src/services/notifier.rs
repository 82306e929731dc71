use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::ingestion::Messenger;
use crate::models::ChatTarget;

/// Buffered error events before new ones are dropped
const CHANNEL_CAPACITY: usize = 1024;

/// Identical errors within this window are sent once
const DEDUP_WINDOW: Duration = Duration::from_secs(60);

/// An error event captured from tracing
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl ErrorEvent {
    fn dedup_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.target.hash(&mut hasher);
        self.message.hash(&mut hasher);
        hasher.finish()
    }

    /// Text posted to the admin error thread.
    pub fn render(&self) -> String {
        let mut text = format!("⚠️ {}\n>{}", self.target, self.message);
        for (key, value) in &self.fields {
            text.push_str(&format!("\n>{}: {}", key, value));
        }
        text
    }
}

pub type ErrorSender = mpsc::Sender<ErrorEvent>;
pub type ErrorReceiver = mpsc::Receiver<ErrorEvent>;

pub fn create_error_channel() -> (ErrorSender, ErrorReceiver) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Tracing layer capturing ERROR events for the admin chat
pub struct ErrorNotifierLayer {
    sender: ErrorSender,
}

impl ErrorNotifierLayer {
    pub fn new(sender: ErrorSender) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for ErrorNotifierLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        // Never block the logging thread; drop when the writer lags
        let _ = self.sender.try_send(ErrorEvent {
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }
}

/// Start the task posting captured errors to `target`.
///
/// Failures to post are logged at WARN so they are not captured again.
pub fn start_notifier(
    mut receiver: ErrorReceiver,
    messenger: Arc<dyn Messenger>,
    target: ChatTarget,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut seen: HashMap<u64, Instant> = HashMap::new();
        let mut last_cleanup = Instant::now();

        while let Some(event) = receiver.recv().await {
            let now = Instant::now();

            if now.duration_since(last_cleanup) > Duration::from_secs(300) {
                seen.retain(|_, &mut time| now.duration_since(time) < DEDUP_WINDOW);
                last_cleanup = now;
            }

            let key = event.dedup_key();
            if let Some(&last_seen) = seen.get(&key) {
                if now.duration_since(last_seen) < DEDUP_WINDOW {
                    continue;
                }
            }
            seen.insert(key, now);

            if let Err(e) = messenger.send_text(&target, &event.render(), None).await {
                tracing::warn!("[notifier] Failed to post error to admin chat: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::mocks::MockMessenger;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_layer_captures_errors_only() {
        let (sender, mut receiver) = create_error_channel();
        let subscriber = tracing_subscriber::registry().with(ErrorNotifierLayer::new(sender));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("just a warning");
            tracing::error!(item = "ep 01", "Failed to process '{}'", "x");
        });

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.message, "Failed to process 'x'");
        assert_eq!(event.fields, vec![("item".to_string(), "ep 01".to_string())]);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_render() {
        let event = ErrorEvent {
            target: "server::ingestion".into(),
            message: "boom".into(),
            fields: vec![("title".into(), "x".into())],
        };
        assert_eq!(event.render(), "⚠️ server::ingestion\n>boom\n>title: x");
    }

    #[tokio::test]
    async fn test_duplicates_within_window_are_sent_once() {
        let (sender, receiver) = create_error_channel();
        let messenger = MockMessenger::new();
        let target = ChatTarget::thread(-100, Some(9));
        let handle = start_notifier(receiver, Arc::new(messenger.clone()), target);

        let event = |message: &str| ErrorEvent {
            target: "server".into(),
            message: message.into(),
            fields: Vec::new(),
        };
        sender.send(event("boom")).await.unwrap();
        sender.send(event("boom")).await.unwrap();
        sender.send(event("other")).await.unwrap();
        drop(sender);
        handle.await.unwrap();

        let sent = messenger.get_sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].target, target);
        assert!(sent[1].text.ends_with(">other"));
    }

    #[tokio::test]
    async fn test_send_failures_do_not_stop_the_writer() {
        let (sender, receiver) = create_error_channel();
        let messenger = MockMessenger::new();
        messenger.set_fail_text(true);
        let handle = start_notifier(receiver, Arc::new(messenger.clone()), ChatTarget::chat(-1));

        sender
            .send(ErrorEvent {
                target: "server".into(),
                message: "boom".into(),
                fields: Vec::new(),
            })
            .await
            .unwrap();
        drop(sender);
        handle.await.unwrap();
        assert!(messenger.get_sent().is_empty());
    }
}
