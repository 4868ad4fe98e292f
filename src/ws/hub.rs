//! Synchronous multi-listener notification.
#![expect(
    clippy::module_name_repetitions,
    reason = "EventHub reads better than Event outside this module"
)]

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, ListenerFailure};

/// Error type a fallible listener may return.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

type Listener<T> = Arc<dyn Fn(&T) -> Result<(), BoxError> + Send + Sync>;

/// Handle returned by [`EventHub::subscribe`], used to remove the listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// An ordered list of listeners for values of type `T`.
///
/// [`emit`](Self::emit) calls every listener on the caller's thread, in subscription order. A
/// listener that returns an error or panics does not stop the others; its failure is handed back
/// to the caller as a [`Kind::Listener`](crate::error::Kind::Listener) error.
pub struct EventHub<T> {
    name: &'static str,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
}

impl<T: 'static> EventHub<T> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers an infallible listener.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.try_subscribe(move |value: &T| {
            listener(value);
            Ok::<(), BoxError>(())
        })
    }

    /// Registers a listener whose errors are reported back from [`emit`](Self::emit).
    pub fn try_subscribe<F, E>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener<T> = Arc::new(move |value: &T| listener(value).map_err(Into::into));

        self.lock().push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` when `id` was not registered here. An emission already
    /// in progress still calls the removed listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);

        listeners.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Calls every listener registered at the time of the call with `value`.
    ///
    /// Never fails as a whole: returns one error per listener that failed, in call order.
    pub fn emit(&self, value: &T) -> Vec<Error> {
        let snapshot: Vec<Listener<T>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        snapshot
            .iter()
            .filter_map(|listener| {
                let reason = match panic::catch_unwind(AssertUnwindSafe(|| listener(value))) {
                    Ok(Ok(())) => return None,
                    Ok(Err(e)) => e.to_string(),
                    Err(payload) => panic_message(payload.as_ref()),
                };

                #[cfg(feature = "tracing")]
                tracing::warn!(hub = self.name, %reason, "listener failed");

                Some(
                    ListenerFailure {
                        hub: self.name,
                        reason,
                    }
                    .into(),
                )
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener<T>)>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for EventHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self
            .listeners
            .lock()
            .map_or(0, |listeners| listeners.len());

        f.debug_struct("EventHub")
            .field("name", &self.name)
            .field("listeners", &listeners)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (Arc::clone(&calls), calls)
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let hub = EventHub::<u32>::new("ticker");
        let (calls, seen) = recorder();

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            hub.subscribe(move |value| calls.lock().unwrap().push(format!("{name}:{value}")));
        }

        let errors = hub.emit(&7);

        assert!(errors.is_empty());
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:7", "second:7", "third:7"]
        );
    }

    #[test]
    fn failing_listeners_are_isolated() {
        let hub = EventHub::<u32>::new("match");
        let (calls, seen) = recorder();

        hub.try_subscribe(|_| Err("bad frame"));
        hub.subscribe(|_| panic!("listener blew up"));
        let after = Arc::clone(&calls);
        hub.subscribe(move |_| after.lock().unwrap().push("ran".to_owned()));

        let errors = hub.emit(&1);

        assert_eq!(*seen.lock().unwrap(), vec!["ran"]);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind() == Kind::Listener));
        assert!(errors[0].to_string().contains("bad frame"));
        assert!(errors[1].to_string().contains("listener blew up"));

        let failure = errors[0]
            .downcast_ref::<ListenerFailure>()
            .expect("listener failure payload");
        assert_eq!(failure.hub, "match");
    }

    #[test]
    fn unsubscribe_applies_to_later_emissions() {
        let hub = Arc::new(EventHub::<()>::new("open"));
        let (calls, seen) = recorder();

        let second_id = Arc::new(Mutex::new(None::<SubscriptionId>));
        {
            let captured = Arc::clone(&hub);
            let second_id = Arc::clone(&second_id);
            let calls = Arc::clone(&calls);
            hub.subscribe(move |()| {
                calls.lock().unwrap().push("first".to_owned());
                if let Some(id) = second_id.lock().unwrap().take() {
                    assert!(captured.unsubscribe(id));
                }
            });
        }
        let calls_second = Arc::clone(&calls);
        let id = hub.subscribe(move |()| calls_second.lock().unwrap().push("second".to_owned()));
        *second_id.lock().unwrap() = Some(id);

        hub.emit(&());
        hub.emit(&());

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "first"]);
        assert_eq!(hub.len(), 1);
        assert!(!hub.unsubscribe(id));
    }

    #[test]
    fn empty_hub_emits_nothing() {
        let hub = EventHub::<String>::new("unknown");

        assert!(hub.is_empty());
        assert!(hub.emit(&"ignored".to_owned()).is_empty());
    }
}
