//! Minimal publish/subscribe for drag lifecycle signals.
//!
//! `EventHub<A>` is a single signal carrying a borrowed payload `&A`.
//! `DragChannel` pairs two of them, `Start` and `End`, with the current
//! block list as payload, so listeners can snapshot it without reaching
//! into the document themselves.

use vb_core::Block;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    phase: Option<DragPhase>,
    id: u64,
}

type Listener<A> = Box<dyn FnMut(&A)>;

/// A single signal with any number of listeners, called in subscription order.
pub struct EventHub<A: ?Sized + 'static> {
    listeners: Vec<(u64, Listener<A>)>,
    next_id: u64,
}

impl<A: ?Sized + 'static> Default for EventHub<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> EventHub<A> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&A) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription { phase: None, id }
    }

    /// Remove a listener. Returns `false` if it was not subscribed here.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, payload: &A) {
        for (_, listener) in &mut self.listeners {
            listener(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// The two signals bracketing a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragPhase {
    Start,
    End,
}

/// Typed two-event channel for drag gestures.
#[derive(Default)]
pub struct DragChannel {
    start: EventHub<[Block]>,
    end: EventHub<[Block]>,
}

impl DragChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn hub(&mut self, phase: DragPhase) -> &mut EventHub<[Block]> {
        match phase {
            DragPhase::Start => &mut self.start,
            DragPhase::End => &mut self.end,
        }
    }

    pub fn on(&mut self, phase: DragPhase, listener: impl FnMut(&[Block]) + 'static) -> Subscription {
        let sub = self.hub(phase).subscribe(listener);
        Subscription {
            phase: Some(phase),
            ..sub
        }
    }

    pub fn off(&mut self, subscription: Subscription) -> bool {
        match subscription.phase {
            Some(phase) => self.hub(phase).unsubscribe(subscription),
            None => false,
        }
    }

    pub fn emit(&mut self, phase: DragPhase, blocks: &[Block]) {
        log::trace!("drag {phase:?} ({} blocks)", blocks.len());
        self.hub(phase).emit(blocks);
    }

    pub fn listener_count(&self, phase: DragPhase) -> usize {
        match phase {
            DragPhase::Start => self.start.len(),
            DragPhase::End => self.end.len(),
        }
    }
}
