//! Outbound poster
//!
//! Once per period the poster asks every registered data source for its
//! query string, frames it as an HTTP request line and hands it to the
//! transport. One bad source or one failed post never stops the pass.

use heapless::String;
use tessera_protocol::http::{self, MAX_QUERY_SIZE, MAX_REQUEST_SIZE};

use crate::registry::{Registry, RegistryError};
use crate::traits::{DataSource, QueryWriter, Transport, TransportError};

/// Default number of data sources
pub const MAX_SOURCES: usize = 10;

/// Longest thing name a poster accepts
pub const MAX_THING_LEN: usize = 64;

/// Summary of one poster pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PosterReport {
    /// Requests accepted by the transport
    pub posted: u8,
    /// Sources whose query hit the size limit (still posted)
    pub truncated: u8,
    /// Requests that could not be framed
    pub framing_errors: u8,
    /// Requests the transport refused
    pub transport_errors: u8,
    /// First transport error of the pass
    pub first_error: Option<TransportError>,
}

impl PosterReport {
    /// Check if every source was posted
    pub fn is_clean(&self) -> bool {
        self.framing_errors == 0 && self.transport_errors == 0
    }
}

/// Periodic serializer of registered data sources
pub struct Poster<'a, const N: usize = MAX_SOURCES> {
    sources: Registry<'a, dyn DataSource + 'a, N>,
    thing: String<MAX_THING_LEN>,
    query: [u8; MAX_QUERY_SIZE],
    request: [u8; MAX_REQUEST_SIZE],
}

impl<'a, const N: usize> Poster<'a, N> {
    /// Create a poster publishing under `thing`
    ///
    /// Thing names longer than [`MAX_THING_LEN`] are cut to fit.
    pub fn new(thing: &str) -> Self {
        let mut name = String::new();
        for c in thing.chars() {
            if name.push(c).is_err() {
                break;
            }
        }
        Self {
            sources: Registry::new(),
            thing: name,
            query: [0; MAX_QUERY_SIZE],
            request: [0; MAX_REQUEST_SIZE],
        }
    }

    /// Register a data source, returning its slot index
    pub fn register(&mut self, source: &'a (dyn DataSource + 'a)) -> Result<usize, RegistryError> {
        self.sources.register(source)
    }

    /// Number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if no source is registered
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Thing name requests are posted under
    pub fn thing(&self) -> &str {
        &self.thing
    }

    /// Serialize and post every registered source once
    pub fn pass<T: Transport + ?Sized>(&mut self, transport: &mut T) -> PosterReport {
        let mut report = PosterReport::default();

        for (_, source) in self.sources.iter() {
            let mut query = QueryWriter::new(&mut self.query, MAX_QUERY_SIZE);
            source.retrieve(&mut query);
            if query.truncated() {
                report.truncated = report.truncated.saturating_add(1);
            }

            let len = match http::post_request(&mut self.request, &self.thing, query.as_str()) {
                Ok(len) => len,
                Err(_) => {
                    report.framing_errors = report.framing_errors.saturating_add(1);
                    continue;
                }
            };

            match transport.post(&self.request[..len]) {
                Ok(()) => report.posted = report.posted.saturating_add(1),
                Err(e) => {
                    report.transport_errors = report.transport_errors.saturating_add(1);
                    report.first_error.get_or_insert(e);
                }
            }
        }

        report
    }
}
