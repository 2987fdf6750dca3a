//! Capability traits
//!
//! These traits define the seams between the harness core and the things
//! it feeds or is fed by: data sources the poster serializes, the transport
//! that carries posted requests, and the AT channel to the cellular modem.

pub mod data_source;
pub mod modem;
pub mod transport;

pub use data_source::{DataSource, QueryWriter};
pub use modem::{AtChannel, AtError, AtResponse, MAX_RESPONSE_LEN};
pub use transport::{Transport, TransportError};
