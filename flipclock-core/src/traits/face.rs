//! Clock face trait for the flip-clock widget

/// Errors that can occur when updating the clock face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceError {
    /// Value is not a two-character decimal string
    InvalidPair,
    /// Drawing to the panel failed
    Render,
}

/// Trait for a two-pair flip-clock face
///
/// The face owns the two displayed strings. Setting a pair plays the
/// flip animation from the old value to the new one; implementations
/// reject anything but exactly two ASCII digits with
/// [`FaceError::InvalidPair`].
pub trait ClockFace {
    /// Set the left pair (hour)
    fn set_first_pair(
        &mut self,
        pair: &str,
    ) -> impl core::future::Future<Output = Result<(), FaceError>>;

    /// Set the right pair (minute)
    fn set_second_pair(
        &mut self,
        pair: &str,
    ) -> impl core::future::Future<Output = Result<(), FaceError>>;

    /// Currently displayed left pair
    fn first_pair(&self) -> &str;

    /// Currently displayed right pair
    fn second_pair(&self) -> &str;
}
