//! Transient notification banner with auto-dismiss.
//!
//! Only one notification is visible at a time. A newer one replaces the
//! current one immediately; there is no queue.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use weatherlist_core::{NotificationConfig, TimerPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Notification>,
    /// Bumped on every `notify`; a timer only clears the generation it was started for.
    generation: u64,
}

/// Owns the single notification slot and its auto-clear timers.
#[derive(Debug)]
pub struct NotificationScheduler {
    slot: Arc<Mutex<Slot>>,
    display: Duration,
    policy: TimerPolicy,
    timer: Option<CancellationToken>,
    runtime: Handle,
}

impl NotificationScheduler {
    pub fn new(config: &NotificationConfig, runtime: Handle) -> Self {
        Self::with_policy(
            Duration::from_millis(config.display_ms),
            config.timer_policy,
            runtime,
        )
    }

    pub fn with_policy(display: Duration, policy: TimerPolicy, runtime: Handle) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            display,
            policy,
            timer: None,
            runtime,
        }
    }

    /// Show `message` now and schedule it to disappear after the display window.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        let notification = Notification {
            message: message.into(),
            severity,
        };

        match severity {
            Severity::Success => tracing::info!("Notification: {}", notification.message),
            Severity::Error => tracing::warn!("Notification: {}", notification.message),
        }

        let generation = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.current = Some(notification);
            slot.generation
        };

        if self.policy == TimerPolicy::CancelSuperseded {
            if let Some(previous) = self.timer.take() {
                previous.cancel();
            }
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let slot = Arc::clone(&self.slot);
        let display = self.display;
        let policy = self.policy;

        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(display) => {
                    let mut slot = slot.lock();
                    if policy == TimerPolicy::Independent || slot.generation == generation {
                        slot.current = None;
                    }
                }
            }
        });

        self.timer = Some(token);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(message, Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(message, Severity::Error);
    }

    /// The notification currently on screen, if any.
    pub fn current(&self) -> Option<Notification> {
        self.slot.lock().current.clone()
    }

    /// How many notifications have been raised so far.
    pub fn raised(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Clear the banner now and stop its timer.
    pub fn dismiss(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.slot.lock().current = None;
    }

    pub fn policy(&self) -> TimerPolicy {
        self.policy
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(policy: TimerPolicy) -> NotificationScheduler {
        NotificationScheduler::with_policy(Duration::from_millis(3000), policy, Handle::current())
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_after_display_window() {
        let mut n = scheduler(TimerPolicy::CancelSuperseded);
        n.success("Weather added successfully");
        assert_eq!(
            n.current(),
            Some(Notification {
                message: "Weather added successfully".into(),
                severity: Severity::Success,
            })
        );

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(n.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(n.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_notification_preempts_and_gets_full_window() {
        let mut n = scheduler(TimerPolicy::CancelSuperseded);
        n.success("first");

        tokio::time::sleep(Duration::from_millis(2000)).await;
        n.error("second");
        assert_eq!(n.current().map(|c| c.message), Some("second".to_string()));

        // First timer would have fired here
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(n.current().map(|c| c.severity), Some(Severity::Error));

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(n.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_timers_clear_newer_message_early() {
        let mut n = scheduler(TimerPolicy::Independent);
        n.success("first");

        tokio::time::sleep(Duration::from_millis(2000)).await;
        n.error("second");

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert!(n.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_selects_policy_and_window() {
        let config = NotificationConfig {
            display_ms: 500,
            timer_policy: TimerPolicy::Independent,
        };
        let mut n = NotificationScheduler::new(&config, Handle::current());
        assert_eq!(n.policy(), TimerPolicy::Independent);

        n.success("Weather updated successfully");
        tokio::time::sleep(Duration::from_millis(501)).await;
        assert!(n.current().is_none());

        let defaults = NotificationScheduler::new(&NotificationConfig::default(), Handle::current());
        assert_eq!(defaults.policy(), TimerPolicy::CancelSuperseded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_clears_immediately() {
        let mut n = scheduler(TimerPolicy::CancelSuperseded);
        n.error("Error deleting weather");
        n.dismiss();
        assert!(n.current().is_none());
        assert_eq!(n.raised(), 1);
    }
}
