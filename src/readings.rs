//! Snapshot of one poll

use core::time::Duration;

use crate::config::{Channel, Unit};

/// One published value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f32,
    pub unit: Unit,
    /// Scheduler time the poll ran at
    pub timestamp: Duration,
}

/// Values from one poll, one slot per channel
///
/// Only the channels enabled in the configuration are ever present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    values: [Option<f32>; Channel::COUNT],
    timestamp: Duration,
}

impl Readings {
    pub fn new(timestamp: Duration) -> Self {
        Self {
            values: [None; Channel::COUNT],
            timestamp,
        }
    }

    pub(crate) fn set(&mut self, channel: Channel, value: f32) {
        self.values[channel.index()] = Some(value);
    }

    pub fn get(&self, channel: Channel) -> Option<f32> {
        self.values[channel.index()]
    }

    pub fn measurement(&self, channel: Channel) -> Option<Measurement> {
        self.get(channel).map(|value| Measurement {
            value,
            unit: channel.unit(),
            timestamp: self.timestamp,
        })
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.get(channel).is_some()
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present channels with their values, in channel order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f32)> + '_ {
        Channel::ALL
            .into_iter()
            .filter_map(|c| self.get(c).map(|v| (c, v)))
    }

    /// Present channels as [`Measurement`]s, in channel order
    pub fn measurements(&self) -> impl Iterator<Item = (Channel, Measurement)> + '_ {
        Channel::ALL
            .into_iter()
            .filter_map(|c| self.measurement(c).map(|m| (c, m)))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Measurement {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "{} {} at {=u64} ms",
            self.value,
            self.unit,
            self.timestamp.as_millis() as u64
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Readings {
    fn format(&self, f: defmt::Formatter<'_>) {
        let millis = self.timestamp.as_millis() as u64;
        defmt::write!(f, "Readings at {=u64} ms:", millis);
        for (channel, value) in self.iter() {
            defmt::write!(f, " {}={}", channel, value);
        }
    }
}
