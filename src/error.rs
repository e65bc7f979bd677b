//! Error types

use core::fmt;

use embedded_hal::i2c;

/// A configuration value was rejected
///
/// These are raised while building a [`Config`](crate::Config) or wiring up subscribers, before
/// the chip is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Brightness outside of 0.0..=1.0, or not a number
    BrightnessOutOfRange,
    /// Model name not recognised
    UnknownModel,
    /// Charge current name not recognised
    UnknownChargeCurrent,
    /// Bus address does not fit in 7 bits
    InvalidAddress,
    /// Update interval of zero
    InvalidUpdateInterval,
    /// The publisher has no room for another subscriber
    TooManySubscribers,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::BrightnessOutOfRange => "brightness must be between 0.0 and 1.0",
            ConfigError::UnknownModel => "unknown model",
            ConfigError::UnknownChargeCurrent => "unknown charge current",
            ConfigError::InvalidAddress => "bus address must be 7 bits",
            ConfigError::InvalidUpdateInterval => "update interval must not be zero",
            ConfigError::TooManySubscribers => "too many subscribers",
        };
        f.write_str(msg)
    }
}

/// A single register transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusError<E> {
    /// Register being accessed
    pub register: u8,
    /// Error reported by the bus
    pub source: E,
}

impl<E: i2c::Error> BusError<E> {
    /// What went wrong on the wire, e.g. [`i2c::ErrorKind::NoAcknowledge`]
    pub fn kind(&self) -> i2c::ErrorKind {
        self.source.kind()
    }
}

impl<E: fmt::Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bus error on register {:#04x}: {:?}",
            self.register, self.source
        )
    }
}

/// Errors returned by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Rejected configuration
    Config(ConfigError),
    /// A direct register operation failed
    Bus(BusError<E>),
    /// A register write during startup failed; the chip may be half configured
    Init(BusError<E>),
    /// A scheduled read failed; previous readings are kept
    Poll(BusError<E>),
    /// The operation needs [`Axp192::initialize`](crate::Axp192::initialize) first
    NotInitialized,
}

impl<E> Error<E> {
    /// The underlying bus error, if there is one
    pub fn bus_error(&self) -> Option<&BusError<E>> {
        match self {
            Error::Bus(e) | Error::Init(e) | Error::Poll(e) => Some(e),
            Error::Config(_) | Error::NotInitialized => None,
        }
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(error: ConfigError) -> Self {
        Error::Config(error)
    }
}

impl<E> From<BusError<E>> for Error<E> {
    fn from(error: BusError<E>) -> Self {
        Error::Bus(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {e}"),
            Error::Bus(e) => write!(f, "{e}"),
            Error::Init(e) => write!(f, "initialization failed: {e}"),
            Error::Poll(e) => write!(f, "poll failed: {e}"),
            Error::NotInitialized => f.write_str("device not initialized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockError;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    #[test]
    fn bus_error_is_reachable_from_every_bus_variant() {
        let bus = BusError {
            register: 0x78,
            source: MockError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
        };
        for e in [Error::Bus(bus), Error::Init(bus), Error::Poll(bus)] {
            assert_eq!(e.bus_error(), Some(&bus));
        }
        assert_eq!(Error::<MockError>::NotInitialized.bus_error(), None);
        let config = Error::<MockError>::from(ConfigError::UnknownModel);
        assert_eq!(config.bus_error(), None);
    }

    #[test]
    fn messages() {
        let bus = BusError {
            register: 0x5e,
            source: MockError(ErrorKind::Other),
        };
        assert_eq!(
            Error::Poll(bus).to_string(),
            "poll failed: bus error on register 0x5e: MockError(Other)"
        );
        assert_eq!(
            Error::<MockError>::Config(ConfigError::BrightnessOutOfRange).to_string(),
            "configuration error: brightness must be between 0.0 and 1.0"
        );
    }
}
