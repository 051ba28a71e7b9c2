use crate::error::CaptureError;

/// Event type discriminant used to register listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Lock,
    Unlock,
    Error,
    Change,
}

/// Events emitted by the pointer-lock controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlsEvent {
    /// Pointer capture was granted
    Lock,
    /// Pointer capture ended, requested or not
    Unlock,
    /// A capture request failed
    Error(CaptureError),
    /// The target's rotation or position changed
    Change,
}

/// Events that can be routed by kind
pub trait EventType {
    fn kind(&self) -> EventKind;
}

impl EventType for ControlsEvent {
    fn kind(&self) -> EventKind {
        match self {
            ControlsEvent::Lock => EventKind::Lock,
            ControlsEvent::Unlock => EventKind::Unlock,
            ControlsEvent::Error(_) => EventKind::Error,
            ControlsEvent::Change => EventKind::Change,
        }
    }
}

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<E> {
    id: ListenerId,
    kind: EventKind,
    callback: Box<dyn FnMut(&E)>,
}

/// Publish/subscribe channel keyed by [`EventKind`]
pub struct EventDispatcher<E> {
    listeners: Vec<Listener<E>>,
    next_id: u64,
}

impl<E: EventType> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener for one event kind
    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Unregister a listener. Returns false if it was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    pub fn has_listener(&self, kind: EventKind) -> bool {
        self.listeners.iter().any(|listener| listener.kind == kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Invoke every listener registered for the event's kind, in registration order
    pub fn dispatch(&mut self, event: &E) {
        let kind = event.kind();
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.callback)(event);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E: EventType> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
