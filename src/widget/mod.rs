//! Chat widget instances and the registry of open widgets
//!
//! A [`ChatWidget`] exclusively owns the state of one conversation. The
//! [`WidgetRegistry`] keeps every widget the landing page has opened, keyed
//! by a random id, and drops a widget for good when it is closed or has
//! sat idle past the configured timeout. Nothing is persisted.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::conversation::Transcript;
use crate::core::{advance, ConversationState, Phase};

/// One open chat panel
#[derive(Debug)]
pub struct ChatWidget {
    state: ConversationState,
    opened_at: Instant,
    last_active: Instant,
}

impl ChatWidget {
    pub fn open() -> Self {
        let now = Instant::now();
        Self {
            state: ConversationState::new(),
            opened_at: now,
            last_active: now,
        }
    }

    /// Run one submission through the engine and keep the resulting state
    pub fn submit(&mut self, text: &str) -> Vec<String> {
        let turn = advance(&self.state, text);
        self.state = turn.state;
        self.last_active = Instant::now();
        turn.messages
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn transcript(&self) -> &Transcript {
        self.state.transcript()
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }
}

/// Current view of a widget, as returned to the page
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub widget_id: Uuid,
    pub phase: Phase,
    pub transcript: Transcript,
}

/// System replies produced by one submission
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// Whether the text became part of the conversation. Blank input and
    /// input after the recommendation are dropped.
    pub accepted: bool,
    pub messages: Vec<String>,
    pub phase: Phase,
}

/// Errors from the widget registry
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Widget not found: {0}")]
    NotFound(Uuid),

    #[error("Too many open widgets (limit {0})")]
    Capacity(usize),
}

/// All widgets currently open on this server
pub struct WidgetRegistry {
    widgets: Mutex<HashMap<Uuid, ChatWidget>>,
    max_open: usize,
    idle_timeout: Duration,
}

impl WidgetRegistry {
    pub fn new(max_open: usize, idle_timeout: Duration) -> Self {
        Self {
            widgets: Mutex::new(HashMap::new()),
            max_open,
            idle_timeout,
        }
    }

    /// Open a widget with a fresh conversation
    pub async fn open(&self) -> Result<WidgetSnapshot, WidgetError> {
        let mut widgets = self.widgets.lock().await;
        if widgets.len() >= self.max_open {
            tracing::warn!("Refusing to open widget: {} already open", widgets.len());
            return Err(WidgetError::Capacity(self.max_open));
        }

        let widget_id = Uuid::new_v4();
        let widget = ChatWidget::open();
        let snapshot = WidgetSnapshot {
            widget_id,
            phase: widget.phase(),
            transcript: widget.transcript().clone(),
        };
        widgets.insert(widget_id, widget);

        tracing::info!(%widget_id, open = widgets.len(), "Widget opened");
        Ok(snapshot)
    }

    /// Feed one line of user input to a widget
    pub async fn submit(&self, widget_id: Uuid, text: &str) -> Result<Reply, WidgetError> {
        let mut widgets = self.widgets.lock().await;
        let widget = widgets
            .get_mut(&widget_id)
            .ok_or(WidgetError::NotFound(widget_id))?;

        let before = widget.transcript().messages().len();
        let messages = widget.submit(text);
        Ok(Reply {
            accepted: widget.transcript().messages().len() > before,
            messages,
            phase: widget.phase(),
        })
    }

    pub async fn snapshot(&self, widget_id: Uuid) -> Result<WidgetSnapshot, WidgetError> {
        let widgets = self.widgets.lock().await;
        let widget = widgets
            .get(&widget_id)
            .ok_or(WidgetError::NotFound(widget_id))?;

        Ok(WidgetSnapshot {
            widget_id,
            phase: widget.phase(),
            transcript: widget.transcript().clone(),
        })
    }

    /// Close a widget, discarding its conversation
    pub async fn close(&self, widget_id: Uuid) -> Result<(), WidgetError> {
        let mut widgets = self.widgets.lock().await;
        let widget = widgets
            .remove(&widget_id)
            .ok_or(WidgetError::NotFound(widget_id))?;

        let lifetime = widget.opened_at().elapsed().as_secs();
        tracing::info!(%widget_id, lifetime, open = widgets.len(), "Widget closed");
        Ok(())
    }

    /// Close every widget that has been idle for at least `idle_timeout`
    /// as of `now`
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut widgets = self.widgets.lock().await;
        let before = widgets.len();
        widgets.retain(|_, w| now.saturating_duration_since(w.last_active()) < self.idle_timeout);
        let evicted = before - widgets.len();

        if evicted > 0 {
            tracing::info!(evicted, open = widgets.len(), "Evicted idle widgets");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.widgets.lock().await.len()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Periodically close idle widgets until the task is aborted
pub async fn sweep_idle(registry: std::sync::Arc<WidgetRegistry>) {
    let period = (registry.idle_timeout() / 4).clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD);
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        registry.evict_idle(Instant::now()).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conversation::Speaker;
    use crate::core::knowledge::{Recommendation, GREETING};
    use tokio_test::{assert_err, assert_ok};

    fn registry() -> WidgetRegistry {
        WidgetRegistry::new(8, Duration::from_secs(60))
    }

    #[test]
    fn test_widget_submit_updates_state() {
        let mut widget = ChatWidget::open();
        assert_eq!(widget.transcript().messages()[0].text, GREETING);

        assert_eq!(widget.submit("life"), vec!["Are you married?"]);
        assert_eq!(widget.submit("no"), vec!["Do you have dependents?"]);
        assert_eq!(widget.submit("no"), vec!["What's your annual income?"]);
        assert_eq!(widget.submit("40000"), vec![Recommendation::LifeSingle.message()]);
        assert_eq!(widget.phase(), Phase::Terminal);
        assert!(widget.submit("thanks").is_empty());
        assert!(widget.last_active() >= widget.opened_at());
    }

    #[tokio::test]
    async fn test_open_submit_close() {
        let registry = registry();
        let opened = assert_ok!(registry.open().await);
        assert_eq!(opened.phase, Phase::AwaitingCategory);
        assert_eq!(opened.transcript.messages().len(), 1);

        let blank = assert_ok!(registry.submit(opened.widget_id, "  ").await);
        assert!(!blank.accepted);
        assert!(blank.messages.is_empty());

        let reply = assert_ok!(registry.submit(opened.widget_id, "health").await);
        assert!(reply.accepted);
        assert_eq!(reply.messages, vec!["What's your age?"]);
        assert_eq!(reply.phase, Phase::AwaitingQuestion { index: 0 });

        let snapshot = assert_ok!(registry.snapshot(opened.widget_id).await);
        assert_eq!(snapshot.transcript.messages().len(), 3);
        assert_eq!(snapshot.transcript.messages()[1].speaker, Speaker::User);

        assert_ok!(registry.close(opened.widget_id).await);
        assert_eq!(registry.len().await, 0);
        assert!(matches!(
            registry.submit(opened.widget_id, "25").await,
            Err(WidgetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_widgets_are_independent() {
        let registry = registry();
        let a = registry.open().await.unwrap();
        let b = registry.open().await.unwrap();

        registry.submit(a.widget_id, "health").await.unwrap();
        let reply = registry.submit(b.widget_id, "life").await.unwrap();
        assert_eq!(reply.messages, vec!["Are you married?"]);

        // Reopening always starts over.
        registry.close(a.widget_id).await.unwrap();
        let c = registry.open().await.unwrap();
        assert_eq!(c.phase, Phase::AwaitingCategory);
    }

    #[tokio::test]
    async fn test_unknown_widget() {
        let registry = registry();
        let id = Uuid::new_v4();
        assert_err!(registry.snapshot(id).await);
        assert_err!(registry.close(id).await);
    }

    #[tokio::test]
    async fn test_capacity_limit() {
        let registry = WidgetRegistry::new(2, Duration::from_secs(60));
        registry.open().await.unwrap();
        let second = registry.open().await.unwrap();
        assert!(matches!(registry.open().await, Err(WidgetError::Capacity(2))));

        registry.close(second.widget_id).await.unwrap();
        assert_ok!(registry.open().await);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let registry = registry();
        let opened = registry.open().await.unwrap();

        assert_eq!(registry.evict_idle(Instant::now()).await, 0);
        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(registry.evict_idle(later).await, 1);
        assert_err!(registry.snapshot(opened.widget_id).await);
    }

    #[tokio::test]
    async fn test_evict_idle_with_huge_timeout() {
        let registry = WidgetRegistry::new(8, Duration::from_secs(100_000_000_000_000));
        let opened = registry.open().await.unwrap();

        assert_eq!(registry.evict_idle(Instant::now()).await, 0);
        let later = Instant::now() + Duration::from_secs(24 * 60 * 60);
        assert_eq!(registry.evict_idle(later).await, 0);
        assert_ok!(registry.snapshot(opened.widget_id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_closes_only_idle_widgets() {
        let registry = Arc::new(WidgetRegistry::new(8, Duration::from_secs(10)));
        let idle = registry.open().await.unwrap();
        let busy = registry.open().await.unwrap();
        let sweeper = tokio::spawn(sweep_idle(registry.clone()));

        tokio::time::sleep(Duration::from_secs(8)).await;
        registry.submit(busy.widget_id, "life").await.unwrap();
        tokio::time::sleep(Duration::from_secs(7)).await;

        assert_err!(registry.snapshot(idle.widget_id).await);
        assert_ok!(registry.snapshot(busy.widget_id).await);
        assert_eq!(registry.len().await, 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(registry.len().await, 0);
        sweeper.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_survives_huge_timeout() {
        let registry = Arc::new(WidgetRegistry::new(8, Duration::from_secs(u64::MAX / 2)));
        registry.open().await.unwrap();
        let sweeper = tokio::spawn(sweep_idle(registry.clone()));

        tokio::time::sleep(Duration::from_secs(3 * 60 * 60)).await;
        assert!(!sweeper.is_finished());
        assert_eq!(registry.len().await, 1);
        sweeper.abort();
    }
}
