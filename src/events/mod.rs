//! Typed event emission and renderer intents.
//!
//! Hosts observe the control through [`ControlEvent`]s delivered by an
//! [`EventBus`]; renderers report user intents back through the handlers in
//! [`intents`]. Payloads are always owned copies, never references into the
//! control's state.

use tokio::sync::mpsc;

use crate::error::ControlError;
use crate::state::{RequestToken, Row};

pub mod intents;

pub use intents::Key;

/// Notification emitted by the control.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlEvent {
    /// A row was committed in single-select mode.
    Select(Row),
    /// The selection set changed; carries the full set in insertion order.
    SelectionChange(Vec<Row>),
    /// The result list became visible.
    Open,
    /// The result list was hidden.
    Close,
    /// A remote lookup was issued.
    Loading {
        /// Query text sent to the endpoint.
        query: String,
        /// Token of the issued request.
        token: RequestToken,
    },
    /// A result set was loaded and presented.
    DataLoad {
        /// Query that produced the rows.
        query: String,
        /// Number of rows in the result set.
        count: usize,
    },
    /// A remote lookup failed or returned an unusable payload.
    Error(ControlError),
}

/// Handle returned by [`EventBus::subscribe`] used to detach a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Boxed listener callback; returns `false` once it can no longer receive events.
type Listener = Box<dyn FnMut(&ControlEvent) -> bool + Send>;

/// Ordered registry of event listeners.
///
/// Listeners run synchronously in subscription order.
#[derive(Default)]
pub struct EventBus {
    /// Next identifier to hand out.
    next_id: u64,
    /// Registered listeners in subscription order.
    listeners: Vec<(ListenerId, Listener)>,
}

impl EventBus {
    /// What: Register a callback listener.
    ///
    /// Inputs:
    /// - `listener`: Callback invoked for every emitted event
    ///
    /// Output:
    /// - `ListenerId` that can be passed to [`EventBus::unsubscribe`].
    pub fn subscribe<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(&ControlEvent) + Send + 'static,
    {
        self.register(Box::new(move |event| {
            listener(event);
            true
        }))
    }

    /// What: Register a channel listener.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - `(ListenerId, receiver)`; every emitted event is cloned into the channel.
    ///
    /// Details:
    /// - The listener is removed by the first emit after its receiver is dropped.
    pub fn subscribe_channel(&mut self) -> (ListenerId, mpsc::UnboundedReceiver<ControlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.register(Box::new(move |event| tx.send(event.clone()).is_ok()));
        (id, rx)
    }

    fn register(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in subscription order, dropping closed channels.
    pub fn emit(&mut self, event: &ControlEvent) {
        tracing::trace!(?event, listeners = self.listeners.len(), "emit");
        self.listeners.retain_mut(|(id, listener)| {
            let alive = listener(event);
            if !alive {
                tracing::debug!(listener = id.0, "channel listener closed; removed");
            }
            alive
        });
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Per-instance registration for outside-interaction handling.
///
/// Attached when the control is created and detached on teardown; outside
/// interactions reported while detached are ignored.
#[derive(Debug, Default)]
pub struct OutsideListener {
    /// Whether the registration is active.
    attached: bool,
}

impl OutsideListener {
    /// Activate the registration.
    pub fn attach(&mut self) {
        if !self.attached {
            tracing::debug!("outside-interaction listener attached");
        }
        self.attached = true;
    }

    /// Deactivate the registration.
    pub fn detach(&mut self) {
        if self.attached {
            tracing::debug!("outside-interaction listener detached");
        }
        self.attached = false;
    }

    /// Whether outside interactions are currently observed.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    /// What: Listeners receive events in order and stop after unsubscribing.
    ///
    /// Inputs:
    /// - Two callback listeners; the first is removed after one event.
    ///
    /// Output:
    /// - First listener sees one event, second sees both.
    fn events_bus_subscribe_and_unsubscribe() {
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::default();
        let a = {
            let seen = Arc::clone(&seen_a);
            bus.subscribe(move |e| seen.lock().expect("lock").push(e.clone()))
        };
        {
            let seen = Arc::clone(&seen_b);
            bus.subscribe(move |e| seen.lock().expect("lock").push(e.clone()));
        }
        bus.emit(&ControlEvent::Open);
        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        bus.emit(&ControlEvent::Close);
        assert_eq!(*seen_a.lock().expect("lock"), vec![ControlEvent::Open]);
        assert_eq!(
            *seen_b.lock().expect("lock"),
            vec![ControlEvent::Open, ControlEvent::Close]
        );
        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    /// What: Channel listeners receive cloned events and are removed once their receiver drops.
    ///
    /// Inputs:
    /// - A channel listener next to a callback listener; the receiver is dropped after one event.
    ///
    /// Output:
    /// - The next emit still reaches the callback and leaves only it registered.
    fn events_bus_channel_listener() {
        let mut bus = EventBus::default();
        let (id, mut rx) = bus.subscribe_channel();
        let seen = Arc::new(Mutex::new(0_usize));
        {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |_| *seen.lock().expect("lock") += 1);
        }
        bus.emit(&ControlEvent::DataLoad {
            query: "al".into(),
            count: 1,
        });
        assert_eq!(
            rx.try_recv().ok(),
            Some(ControlEvent::DataLoad {
                query: "al".into(),
                count: 1
            })
        );
        assert_eq!(bus.len(), 2);
        drop(rx);
        bus.emit(&ControlEvent::Open);
        assert_eq!(bus.len(), 1);
        assert!(!bus.unsubscribe(id));
        assert_eq!(*seen.lock().expect("lock"), 2);
    }

    #[test]
    /// What: Outside listener toggles between attached and detached.
    fn events_outside_listener_attach_detach() {
        let mut l = OutsideListener::default();
        assert!(!l.is_attached());
        l.attach();
        assert!(l.is_attached());
        l.detach();
        assert!(!l.is_attached());
    }
}
