//! Board-agnostic core of the applet harness
//!
//! This crate contains everything that sits between the applets and the
//! hardware without depending on either:
//!
//! - Telemetry fields shared between one producer and many readers
//! - The producer lifecycle state machine
//! - Bounded registration tables for the dashboard and the poster
//! - Grid geometry for laying out dashboard windows
//! - Data source, transport and modem channel traits
//! - The outbound poster
//! - Harness configuration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod grid;
pub mod poster;
pub mod producer;
pub mod registry;
pub mod telemetry;
pub mod traits;

pub use grid::{GridError, GridGeometry, Origin};
pub use poster::{Poster, PosterReport};
pub use producer::{CycleOutcome, Producer, ProducerTask, ReadPolicy, TaskState};
pub use registry::{Registry, RegistryError};
pub use telemetry::{Counter, Field, Scalar};
