//! Progress reporting and cancellation (§4.6, §5).
//!
//! A strategy is handed a [`ProgressSink`] trait object and a
//! [`CancelToken`]. [`ChannelProgressSink`] is the default in-process
//! implementation: an `mpsc` channel plus a coalescing thread that
//! forwards at most one update per 100ms to its observers. Observer
//! registration and emission take disjoint locks, per §5, so
//! subscribing never blocks an in-flight emission.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ErrorKind;
use crate::models::ScheduleBundle;

/// One progress update.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub fraction: f64,
    pub status_tag: String,
    pub message: String,
    pub details: HashMap<String, String>,
}

/// Terminal outcome of a run, forwarded exactly once per run-id.
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    Complete(Box<ScheduleBundle>),
    Error { kind: ErrorKind, message: String },
}

/// What a strategy reports progress through.
///
/// Implementations must be safe to share across the worker thread and
/// any observer threads.
pub trait ProgressSink: Send + Sync {
    fn update(&self, fraction: f64, status_tag: &str, message: &str, details: HashMap<String, String>);
    fn complete(&self, result: ScheduleBundle);
    fn error(&self, kind: ErrorKind, message: &str);
}

/// Cooperative cancellation flag, polled at iteration boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

type Observer = Box<dyn Fn(&ProgressEvent) + Send>;
type TerminalObserver = Box<dyn Fn(&TerminalEvent) + Send>;

struct Broker {
    observers: Mutex<Vec<Observer>>,
    terminal_observers: Mutex<Vec<TerminalObserver>>,
}

/// Coalescing, per-run-id progress sink backed by an `mpsc` channel.
///
/// A background thread drains the channel and forwards at most one
/// update per 100ms to registered observers, per §4.6. Registration
/// (`subscribe`) and emission (`update`) lock disjoint `Mutex`es so a
/// new subscriber never waits behind an in-flight broadcast.
pub struct ChannelProgressSink {
    sender: Sender<ProgressEvent>,
    broker: Arc<Broker>,
    subscribers: Arc<RwLock<HashMap<u64, ()>>>,
    next_subscriber_id: Mutex<u64>,
}

impl ChannelProgressSink {
    pub fn new() -> Self {
        let (sender, receiver): (Sender<ProgressEvent>, Receiver<ProgressEvent>) = mpsc::channel();
        let broker = Arc::new(Broker {
            observers: Mutex::new(Vec::new()),
            terminal_observers: Mutex::new(Vec::new()),
        });

        let broker_for_thread = Arc::clone(&broker);
        thread::spawn(move || {
            let coalesce_window = Duration::from_millis(100);
            let mut last_forwarded = Instant::now() - coalesce_window;
            let mut pending: Option<ProgressEvent> = None;

            loop {
                match receiver.recv_timeout(coalesce_window) {
                    Ok(event) => pending = Some(event),
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }

                if let Some(event) = pending.take() {
                    if last_forwarded.elapsed() >= coalesce_window {
                        let observers = broker_for_thread.observers.lock().unwrap();
                        for observer in observers.iter() {
                            observer(&event);
                        }
                        last_forwarded = Instant::now();
                    } else {
                        pending = Some(event);
                    }
                }
            }
        });

        Self {
            sender,
            broker,
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_subscriber_id: Mutex::new(0),
        }
    }

    /// Registers an observer for progress updates. Returns a handle id
    /// usable with [`ChannelProgressSink::unsubscribe`].
    pub fn subscribe(&self, observer: impl Fn(&ProgressEvent) + Send + 'static) -> u64 {
        let mut id_guard = self.next_subscriber_id.lock().unwrap();
        let id = *id_guard;
        *id_guard += 1;
        drop(id_guard);

        self.subscribers.write().unwrap().insert(id, ());
        self.broker.observers.lock().unwrap().push(Box::new(observer));
        id
    }

    /// Registers an observer for the terminal `complete`/`error` event.
    pub fn subscribe_terminal(&self, observer: impl Fn(&TerminalEvent) + Send + 'static) {
        self.broker.terminal_observers.lock().unwrap().push(Box::new(observer));
    }

    /// Idempotent: unsubscribing an unknown or already-removed id is a
    /// no-op, never an error.
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.write().unwrap().remove(&id);
    }
}

impl Default for ChannelProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ChannelProgressSink {
    fn update(&self, fraction: f64, status_tag: &str, message: &str, details: HashMap<String, String>) {
        let _ = self.sender.send(ProgressEvent {
            fraction,
            status_tag: status_tag.to_string(),
            message: message.to_string(),
            details,
        });
    }

    fn complete(&self, result: ScheduleBundle) {
        let observers = self.broker.terminal_observers.lock().unwrap();
        let event = TerminalEvent::Complete(Box::new(result));
        for observer in observers.iter() {
            observer(&event);
        }
    }

    fn error(&self, kind: ErrorKind, message: &str) {
        let observers = self.broker.terminal_observers.lock().unwrap();
        let event = TerminalEvent::Error {
            kind,
            message: message.to_string(),
        };
        for observer in observers.iter() {
            observer(&event);
        }
    }
}

/// A `ProgressSink` that drops every update — used by strategies
/// invoked directly in tests without a caller-supplied sink.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn update(&self, _fraction: f64, _status_tag: &str, _message: &str, _details: HashMap<String, String>) {}
    fn complete(&self, _result: ScheduleBundle) {}
    fn error(&self, _kind: ErrorKind, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_cancel_token_starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_unsubscribe_unknown_id_is_noop() {
        let sink = ChannelProgressSink::new();
        sink.unsubscribe(999);
        sink.unsubscribe(999);
    }

    #[test]
    fn test_subscribe_then_unsubscribe_removes_tracking() {
        let sink = ChannelProgressSink::new();
        let id = sink.subscribe(|_| {});
        assert!(sink.subscribers.read().unwrap().contains_key(&id));
        sink.unsubscribe(id);
        assert!(!sink.subscribers.read().unwrap().contains_key(&id));
    }

    #[test]
    fn test_update_is_eventually_forwarded() {
        let sink = ChannelProgressSink::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        sink.subscribe(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        sink.update(0.5, "running", "halfway", HashMap::new());
        thread::sleep(Duration::from_millis(250));
        assert!(count.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_null_sink_does_nothing() {
        let sink = NullProgressSink;
        sink.update(1.0, "running", "noop", HashMap::new());
        sink.error(ErrorKind::Internal, "ignored");
    }
}
