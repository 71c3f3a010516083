/// A user-visible message. Rendering it is the host application's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Where user-facing errors go.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Collects notifications until the host drains them.
#[derive(Debug, Default)]
pub struct NotificationBus {
    pending: Vec<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}

impl NotificationSink for NotificationBus {
    fn notify(&mut self, notification: Notification) {
        tracing::info!(title = %notification.title, "{}", notification.message);
        self.pending.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, NotificationBus, NotificationSink};

    #[test]
    fn keeps_notifications_in_arrival_order() {
        let mut bus = NotificationBus::new();
        bus.notify(Notification::new("a", "first"));
        bus.notify(Notification::new("b", "second"));
        let titles: Vec<_> = bus.pending().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn drain_clears_pending() {
        let mut bus = NotificationBus::new();
        bus.notify(Notification::new("t", "m"));
        let drained = bus.drain();
        assert_eq!(drained, vec![Notification::new("t", "m")]);
        assert!(bus.pending().is_empty());
    }
}
