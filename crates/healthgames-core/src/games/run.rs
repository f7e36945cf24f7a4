use tracing::debug;

use super::GameMachine;
use crate::events::{Event, GameEvent};
use crate::session::SessionLedger;
use crate::storage::SessionStore;

/// One play-through of a machine bound to the ledger session it opened.
///
/// The stats payload is reported exactly once: when the machine finishes on
/// its own, or when the run is exited (manually or by teardown).
#[derive(Debug)]
pub struct GameRun<M> {
    machine: M,
    reported: bool,
}

impl<M: GameMachine> GameRun<M> {
    /// Open a ledger session for `machine`.
    pub fn begin<S: SessionStore>(ledger: &mut SessionLedger<S>, machine: M) -> (Self, Vec<Event>) {
        let events = ledger.start(machine.game_id());
        let run = Self {
            machine,
            reported: false,
        };
        (run, events)
    }

    /// Wrap a machine whose session is already open, e.g. one resumed by a
    /// front-end that restarted.
    pub fn resume(machine: M) -> Self {
        Self {
            machine,
            reported: false,
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    /// Poll the machine, then report if that finished it.
    pub fn poll<S: SessionStore>(
        &mut self,
        ledger: &mut SessionLedger<S>,
        now_ms: u64,
    ) -> (Vec<GameEvent>, Vec<Event>) {
        let game_events = self.machine.poll(now_ms);
        let ledger_events = self.settle(ledger);
        (game_events, ledger_events)
    }

    /// Report a naturally finished machine. Call after any command that may
    /// have finished it.
    pub fn settle<S: SessionStore>(&mut self, ledger: &mut SessionLedger<S>) -> Vec<Event> {
        if self.reported || !self.machine.is_finished() {
            return Vec::new();
        }
        self.report(ledger)
    }

    /// Leave the game: disarm timers and close the session with whatever
    /// stats the machine has.
    pub fn exit<S: SessionStore>(&mut self, ledger: &mut SessionLedger<S>) -> Vec<Event> {
        self.machine.stop_timers();
        if self.reported {
            return Vec::new();
        }
        self.report(ledger)
    }

    fn report<S: SessionStore>(&mut self, ledger: &mut SessionLedger<S>) -> Vec<Event> {
        self.reported = true;
        let outcome = self.machine.outcome();
        debug!(
            game = %self.machine.game_id(),
            completed = ?outcome.completed,
            "reporting game outcome"
        );
        ledger.end(self.machine.game_id(), outcome)
    }

    pub fn into_machine(self) -> M {
        self.machine
    }
}
