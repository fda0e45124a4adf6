use crate::game::serialization::RoundSnapshot;
use crate::model::action::PlayerAction;
use crate::model::round::{RoundError, RoundEvent, RoundState};
use crate::model::seat::Seat;
use serde::{Deserialize, Serialize};

/// Audit record for one accepted transition, handed to the persistence
/// sink. The engine never reads it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: Seat,
    pub action: PlayerAction,
    pub events: Vec<RoundEvent>,
}

/// Fire-and-forget persistence sink for accepted actions.
pub trait ActionSink {
    fn record(&mut self, record: &ActionRecord);
}

/// What an observer is told happened: either accepted transitions or a
/// rejected attempt, always with a snapshot rich enough to rebuild the
/// legal-move set without replaying history.
#[derive(Debug, Clone)]
pub enum RoundNotification {
    Applied { seat: Seat, events: Vec<RoundEvent> },
    Rejected { seat: Seat, error: RoundError },
}

pub trait RoundObserver {
    fn on_state_changed(&mut self, notification: &RoundNotification, snapshot: &RoundSnapshot);
}

/// No-op implementations for callers that do not care.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ActionSink for NullSink {
    fn record(&mut self, _record: &ActionRecord) {}
}

impl RoundObserver for NullSink {
    fn on_state_changed(&mut self, _notification: &RoundNotification, _snapshot: &RoundSnapshot) {}
}

/// Wires a round to its sinks: every submission is validated by the round,
/// then reported outward whether it was accepted or rejected. Rejections
/// leave the legal-move set untouched, so a corrected retry is always
/// possible.
pub struct RoundSession<'a> {
    round: &'a mut RoundState,
    sink: &'a mut dyn ActionSink,
    observer: &'a mut dyn RoundObserver,
}

impl<'a> RoundSession<'a> {
    pub fn new(
        round: &'a mut RoundState,
        sink: &'a mut dyn ActionSink,
        observer: &'a mut dyn RoundObserver,
    ) -> Self {
        Self {
            round,
            sink,
            observer,
        }
    }

    pub fn round(&self) -> &RoundState {
        self.round
    }

    pub fn submit(
        &mut self,
        seat: Seat,
        action: PlayerAction,
    ) -> Result<Vec<RoundEvent>, RoundError> {
        let result = self.round.apply(seat, action);
        let snapshot = RoundSnapshot::capture(self.round);
        match &result {
            Ok(events) => {
                self.sink.record(&ActionRecord {
                    seat,
                    action,
                    events: events.clone(),
                });
                self.observer.on_state_changed(
                    &RoundNotification::Applied {
                        seat,
                        events: events.clone(),
                    },
                    &snapshot,
                );
            }
            Err(error) => {
                self.observer.on_state_changed(
                    &RoundNotification::Rejected {
                        seat,
                        error: error.clone(),
                    },
                    &snapshot,
                );
            }
        }
        result
    }
}
