//! Fan-out of poll results to subscribers
//!
//! Subscribers are borrowed for the lifetime of the publisher and are called with `&self`; keep
//! any state they need behind a `Cell`, `RefCell` or a blocking mutex.

use heapless::Vec;

use crate::config::Channel;
use crate::error::ConfigError;
use crate::readings::{Measurement, Readings};

/// Receives every value published for an enabled channel
pub trait MeasurementSubscriber {
    fn on_update(&self, channel: Channel, measurement: Measurement);
}

impl<F> MeasurementSubscriber for F
where
    F: Fn(Channel, Measurement),
{
    fn on_update(&self, channel: Channel, measurement: Measurement) {
        self(channel, measurement)
    }
}

/// Holds the last published [`Readings`] and up to `N` subscribers
pub struct MeasurementPublisher<'a, const N: usize> {
    subscribers: Vec<&'a dyn MeasurementSubscriber, N>,
    last: Readings,
}

impl<'a, const N: usize> MeasurementPublisher<'a, N> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            last: Readings::default(),
        }
    }

    pub fn subscribe(
        &mut self,
        subscriber: &'a dyn MeasurementSubscriber,
    ) -> Result<(), ConfigError> {
        self.subscribers
            .push(subscriber)
            .map_err(|_| ConfigError::TooManySubscribers)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Store `readings` and notify every subscriber once per present channel
    pub fn publish(&mut self, readings: Readings) {
        self.last = readings;
        for (channel, measurement) in readings.measurements() {
            log::debug!(
                "publish {:?} = {} {}",
                channel,
                measurement.value,
                measurement.unit.symbol()
            );
            for subscriber in &self.subscribers {
                subscriber.on_update(channel, measurement);
            }
        }
    }

    /// Copy of the last published snapshot
    pub fn last(&self) -> Readings {
        self.last
    }

    pub fn last_value(&self, channel: Channel) -> Option<Measurement> {
        self.last.measurement(channel)
    }
}

impl<const N: usize> Default for MeasurementPublisher<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
