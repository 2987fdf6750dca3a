//! Telemetry fields
//!
//! A telemetry cell is a plain struct of [`Field`]s. Each field is its own
//! atomic register: the owning producer stores into it once per cycle and
//! any number of readers load from it without locking. There is no
//! transaction across fields, so a reader may see `x` from one cycle and
//! `y` from the next.
//!
//! Fields are backed by `portable_atomic::AtomicU32` so the same code runs on
//! Cortex-M0 parts that lack native compare-and-swap.

use core::fmt;
use core::marker::PhantomData;

use portable_atomic::{AtomicU32, Ordering};

/// A value that can live in a telemetry field
///
/// Every scalar maps losslessly into 32 register bits and declares the bit
/// pattern a field holds before its producer has published anything.
pub trait Scalar: Copy {
    /// Register bits of the "not yet known" value
    const UNKNOWN: u32;

    /// Encode into register bits
    fn into_bits(self) -> u32;

    /// Decode from register bits
    fn from_bits(bits: u32) -> Self;
}

impl Scalar for u8 {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits as u8
    }
}

impl Scalar for i8 {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        self as u8 as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits as u8 as i8
    }
}

impl Scalar for u16 {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits as u16
    }
}

impl Scalar for i16 {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        self as u16 as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits as u16 as i16
    }
}

impl Scalar for u32 {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        self
    }

    fn from_bits(bits: u32) -> Self {
        bits
    }
}

impl Scalar for bool {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits != 0
    }
}

/// Single-writer, many-reader telemetry register
///
/// `set` and `get` never block and never fail. Ordering is `Relaxed`: a
/// field only promises that each load returns some value that was stored.
pub struct Field<T: Scalar> {
    bits: AtomicU32,
    _value: PhantomData<fn() -> T>,
}

impl<T: Scalar> Field<T> {
    /// Create a field holding the type's unknown sentinel
    pub const fn unknown() -> Self {
        Self {
            bits: AtomicU32::new(T::UNKNOWN),
            _value: PhantomData,
        }
    }

    /// Create a field holding `initial`
    pub fn new(initial: T) -> Self {
        Self {
            bits: AtomicU32::new(initial.into_bits()),
            _value: PhantomData,
        }
    }

    /// Publish a new value
    pub fn set(&self, value: T) {
        self.bits.store(value.into_bits(), Ordering::Relaxed);
    }

    /// Read the most recently published value
    pub fn get(&self) -> T {
        T::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl<T: Scalar> Default for Field<T> {
    fn default() -> Self {
        Self::unknown()
    }
}

impl<T: Scalar + fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.get()).finish()
    }
}

/// Event counter bumped from interrupt context
///
/// Reads as a `u8` and wraps at 256.
pub struct Counter {
    bits: AtomicU32,
}

impl Counter {
    /// Create a counter at zero
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    /// Count one event and return the new count
    ///
    /// A single atomic read-modify-write, safe to call from an interrupt
    /// handler while readers are loading.
    pub fn increment(&self) -> u8 {
        (self.bits.fetch_add(1, Ordering::Relaxed).wrapping_add(1)) as u8
    }

    /// Current count
    pub fn get(&self) -> u8 {
        self.bits.load(Ordering::Relaxed) as u8
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Counter").field(&self.get()).finish()
    }
}
