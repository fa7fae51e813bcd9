use std::collections::VecDeque;

use crate::StreamEvent;

/// FIFO of events that have been produced but not yet pulled.
///
/// One input character can finish several events (`}` may close an object and
/// the document), while the parser hands out exactly one event per pull.
///
/// The newest event sits at the front and the oldest at the back.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct EventQueue {
    events: VecDeque<StreamEvent>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Enqueues `event` as the newest entry.
    pub(crate) fn push_front(&mut self, event: StreamEvent) {
        self.events.push_front(event);
    }

    /// Removes and returns the oldest entry.
    pub(crate) fn pop_oldest(&mut self) -> Option<StreamEvent> {
        self.events.pop_back()
    }

    /// Splices `newer` in front of this queue's contents: everything already
    /// queued here is still pulled first, followed by `newer` in its own order.
    pub(crate) fn prepend(&mut self, newer: EventQueue) {
        if self.events.is_empty() {
            self.events = newer.events;
            return;
        }
        for event in newer.events.into_iter().rev() {
            self.events.push_front(event);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}
