//! Forwards replicated events to remote observers.

use std::fmt;

use bang_howdy_core::{Command, Event};

use crate::{apply, BangObject};

/// Remote observer of the shared game object.
pub trait Subscriber {
    /// Receives one replicated event, in submission order.
    fn receive(&mut self, event: &Event);
}

/// Subscriber that records every event it receives.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl Subscriber for EventLog {
    fn receive(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

/// Applies command batches to the game object and forwards the outcome.
#[derive(Default)]
pub struct Replicator {
    subscribers: Vec<Box<dyn Subscriber>>,
    forwarded: u64,
}

impl fmt::Debug for Replicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replicator")
            .field("subscribers", &self.subscribers.len())
            .field("forwarded", &self.forwarded)
            .finish()
    }
}

impl Replicator {
    /// Creates a replicator without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a remote observer.
    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Number of events forwarded so far.
    #[must_use]
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Applies each command in order and forwards the resulting events.
    ///
    /// Every produced event, replicated or not, is appended to `out_events`.
    pub fn submit<I>(&mut self, world: &mut BangObject, commands: I, out_events: &mut Vec<Event>)
    where
        I: IntoIterator<Item = Command>,
    {
        let start = out_events.len();
        for command in commands {
            apply(world, command, out_events);
        }
        self.forward(&out_events[start..]);
    }

    /// Forwards already-applied events, skipping those marked direct.
    pub fn forward(&mut self, events: &[Event]) {
        for event in events.iter().filter(|event| event.is_replicated()) {
            self.forwarded += 1;
            for subscriber in &mut self.subscribers {
                subscriber.receive(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::Board;
    use bang_howdy_core::{Cell, GamePhase, Piece, PieceId, PieceKind};

    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<EventLog>>);

    impl Subscriber for Shared {
        fn receive(&mut self, event: &Event) {
            self.0.borrow_mut().receive(event);
        }
    }

    #[test]
    fn forwards_replicated_events_in_order() {
        let log = Shared::default();
        let mut replicator = Replicator::new();
        replicator.subscribe(Box::new(log.clone()));

        let mut world = BangObject::new(Board::new(4, 4), 2);
        let mut events = Vec::new();
        replicator.submit(
            &mut world,
            [
                Command::SetPhase {
                    phase: GamePhase::SelectPhase,
                },
                Command::SetPhase {
                    phase: GamePhase::BuyingPhase,
                },
                Command::StartRound { duration: 10 },
                Command::AddPieceDirect {
                    piece: Piece::new(PieceId::new(1), PieceKind::Prop, None, Cell::new(0, 0)),
                },
                Command::AddPiece {
                    piece: Piece::new(PieceId::new(2), PieceKind::Prop, None, Cell::new(1, 0)),
                },
            ],
            &mut events,
        );

        assert_eq!(events.len(), 5);
        let received = log.0.borrow();
        assert_eq!(received.events().len(), 4);
        assert!(matches!(
            received.events().last(),
            Some(Event::PieceAdded { direct: false, .. })
        ));
        assert_eq!(replicator.forwarded(), 4);
    }
}
