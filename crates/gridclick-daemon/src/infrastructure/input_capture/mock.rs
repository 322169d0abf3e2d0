//! Mock interceptor for tests.
//!
//! `run` stores the handler and returns immediately; tests then push events
//! through [`MockInterceptor::inject`] exactly as the OS hook would.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use gridclick_core::{EventDecision, KeyEvent};

use super::{CaptureError, EventHandler, InputInterceptor};

/// A mock [`InputInterceptor`] that delivers injected events.
#[derive(Default)]
pub struct MockInterceptor {
    handler: Mutex<Option<EventHandler>>,
    decisions: Mutex<Vec<(KeyEvent, EventDecision)>>,
    stopped: AtomicBool,
}

impl MockInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to the installed handler and returns its decision.
    ///
    /// Events injected before `run` or after `stop` pass through untouched,
    /// as they would with no hook installed.
    pub fn inject(&self, event: KeyEvent) -> EventDecision {
        let decision = {
            let mut guard = self.handler.lock().expect("lock poisoned");
            match guard.as_mut() {
                Some(handler) if !self.is_stopped() => handler(event),
                _ => EventDecision::PassThrough,
            }
        };
        self.decisions
            .lock()
            .expect("lock poisoned")
            .push((event, decision));
        decision
    }

    /// Every injected event with the decision it received, in order.
    pub fn decisions(&self) -> Vec<(KeyEvent, EventDecision)> {
        self.decisions.lock().expect("lock poisoned").clone()
    }

    /// Number of injected events that were swallowed.
    pub fn swallow_count(&self) -> usize {
        self.decisions
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|(_, d)| d.is_swallow())
            .count()
    }

    pub fn is_running(&self) -> bool {
        self.handler.lock().expect("lock poisoned").is_some() && !self.is_stopped()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl InputInterceptor for MockInterceptor {
    fn run(&self, handler: EventHandler) -> Result<(), CaptureError> {
        let mut guard = self.handler.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }
        *guard = Some(handler);
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridclick_core::Key;

    #[test]
    fn test_inject_before_run_passes_through() {
        let interceptor = MockInterceptor::new();
        let decision = interceptor.inject(KeyEvent::down(Key::KeyA, 0));
        assert_eq!(decision, EventDecision::PassThrough);
        assert!(!interceptor.is_running());
    }

    #[test]
    fn test_inject_returns_handler_decision() {
        // Arrange
        let interceptor = MockInterceptor::new();
        interceptor
            .run(Box::new(|event: KeyEvent| {
                if event.key == Key::KeyA {
                    EventDecision::Swallow
                } else {
                    EventDecision::PassThrough
                }
            }))
            .unwrap();

        // Act
        let a = interceptor.inject(KeyEvent::down(Key::KeyA, 0));
        let b = interceptor.inject(KeyEvent::down(Key::KeyB, 0));

        // Assert
        assert_eq!((a, b), (EventDecision::Swallow, EventDecision::PassThrough));
        assert_eq!(interceptor.swallow_count(), 1);
        assert_eq!(interceptor.decisions().len(), 2);
    }

    #[test]
    fn test_second_run_is_rejected() {
        let interceptor = MockInterceptor::new();
        interceptor.run(Box::new(|_| EventDecision::Swallow)).unwrap();
        let second = interceptor.run(Box::new(|_| EventDecision::Swallow));
        assert!(matches!(second, Err(CaptureError::AlreadyRunning)));
    }

    #[test]
    fn test_stopped_interceptor_passes_through() {
        let interceptor = MockInterceptor::new();
        interceptor.run(Box::new(|_| EventDecision::Swallow)).unwrap();
        interceptor.stop();
        assert_eq!(interceptor.inject(KeyEvent::down(Key::KeyA, 0)), EventDecision::PassThrough);
        assert!(!interceptor.is_running());
    }
}
