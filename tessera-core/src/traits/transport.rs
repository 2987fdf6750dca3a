//! Outbound request transport

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The link is down
    NotConnected,
    /// The peer refused or dropped the request
    Rejected,
    /// Underlying I/O failed
    Io,
}

/// Carries framed requests to the remote endpoint
///
/// Connection setup and teardown are the implementation's business; the
/// poster only hands over complete request bytes.
pub trait Transport {
    /// Send one complete request
    fn post(&mut self, request: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn post(&mut self, request: &[u8]) -> Result<(), TransportError> {
        (**self).post(request)
    }
}
