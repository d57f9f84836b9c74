//! Sync state machine
//!
//! The refresh loop is either waiting for the next resync or in the middle
//! of one. Display updates happen on every tick regardless of this state.

/// Refresh loop sync states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncState {
    /// Waiting for the resync interval to elapse
    #[default]
    Idle,
    /// Resync in progress
    Syncing,
}

/// Events driving the sync state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncEvent {
    /// The resync interval elapsed on the monotonic clock
    IntervalElapsed,
    /// The time source returned, successfully or not
    SyncFinished,
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncState::Syncing)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SyncEvent) -> Self {
        use SyncEvent::*;
        use SyncState::*;

        match (self, event) {
            (Idle, IntervalElapsed) => Syncing,
            (Syncing, SyncFinished) => Idle,

            // Stay in current state for unhandled events
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_cycle() {
        let state = SyncState::default();
        assert_eq!(state, SyncState::Idle);

        let state = state.transition(SyncEvent::IntervalElapsed);
        assert!(state.is_syncing());

        let state = state.transition(SyncEvent::SyncFinished);
        assert_eq!(state, SyncState::Idle);
    }

    #[test]
    fn test_unhandled_events_ignored() {
        assert_eq!(
            SyncState::Idle.transition(SyncEvent::SyncFinished),
            SyncState::Idle
        );
        assert_eq!(
            SyncState::Syncing.transition(SyncEvent::IntervalElapsed),
            SyncState::Syncing
        );
    }
}
