//! Displayed value tracking
//!
//! Remembers what the face last showed so that unchanged ticks cause no
//! writes (and no flip animation).

/// Last hour and minute pushed to the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayTracker {
    last: Option<(u8, u8)>,
}

impl DisplayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `hour` or `minute` differ from what is shown
    ///
    /// Always true before the first commit.
    pub fn differs(&self, hour: u8, minute: u8) -> bool {
        self.last != Some((hour, minute))
    }

    /// Record a completed write of both pairs
    pub fn commit(&mut self, hour: u8, minute: u8) {
        self.last = Some((hour, minute));
    }

    pub fn shown(&self) -> Option<(u8, u8)> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_always_differs() {
        let tracker = DisplayTracker::new();
        assert!(tracker.differs(0, 0));
        assert_eq!(tracker.shown(), None);
    }

    #[test]
    fn test_either_field_change_detected() {
        let mut tracker = DisplayTracker::new();
        tracker.commit(9, 41);

        assert!(!tracker.differs(9, 41));
        assert!(tracker.differs(10, 41));
        assert!(tracker.differs(9, 42));
    }
}
