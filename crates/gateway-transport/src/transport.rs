//! The transport seam between the pipelines and the outside world.

use bytes::Bytes;

/// Result of offering one framed message to a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The transport took the whole message.
    Accepted,
    /// Flow control refused the message; retry later.
    BackPressured,
    /// No peer is currently attached; retry later.
    NotConnected,
    /// The transport is temporarily unavailable for administrative
    /// reasons; retry later.
    AdminAction,
    /// The transport has been closed; this attempt will never succeed.
    Closed,
}

impl OfferOutcome {
    /// Transient outcomes may succeed on a later attempt with the same
    /// bytes; `Closed` is terminal for the attempt.
    pub fn is_transient(self) -> bool {
        !matches!(self, OfferOutcome::Accepted | OfferOutcome::Closed)
    }
}

/// A duplex message transport with non-blocking offer/poll semantics.
///
/// `offer` either takes the whole message or none of it; partial writes
/// are not part of the contract. `poll` delivers complete fragments in
/// arrival order, each exactly once.
pub trait Transport: Send + Sync {
    /// Attempt to send one framed message.
    fn offer(&self, message: &[u8]) -> OfferOutcome;

    /// Deliver up to `fragment_limit` pending fragments to `on_fragment`,
    /// returning how many were delivered.
    fn poll(&self, on_fragment: &mut dyn FnMut(Bytes), fragment_limit: usize) -> usize;

    /// Deliver the end-of-stream notification if the peer has closed and
    /// it has not been reported yet. Returns the number of streams that
    /// just ended (0 or 1).
    fn poll_end_of_stream(&self, on_end_of_stream: &mut dyn FnMut()) -> usize;

    /// Whether a peer is currently attached.
    fn is_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(!OfferOutcome::Accepted.is_transient());
        assert!(!OfferOutcome::Closed.is_transient());
        assert!(OfferOutcome::BackPressured.is_transient());
        assert!(OfferOutcome::NotConnected.is_transient());
        assert!(OfferOutcome::AdminAction.is_transient());
    }
}
