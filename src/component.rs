//! Scheduler-driven polling component
//!
//! Glues [`Axp192`] to a [`MeasurementPublisher`] and runs it on the configured update interval.
//! The host scheduler supplies a monotonic `now` on every tick; the component keeps no clock of
//! its own.
//!
//! ```
//! # use axp192_sensor::{Axp192Component, Channel, Config, Error, Measurement, Model};
//! # use core::time::Duration;
//! # use embedded_hal::i2c::I2c;
//! # fn run<I2C: I2c>(i2c: I2C) -> Result<(), Error<I2C::Error>> {
//! let config = Config::new(Model::M5Core2)
//!     .with_channel(Channel::BatteryLevel)
//!     .with_update_interval(Duration::from_secs(10))?;
//! let print = |channel: Channel, m: Measurement| log::info!("{:?}: {}", channel, m.value);
//!
//! let mut axp: Axp192Component<'_, _, 1> = Axp192Component::new(i2c, config);
//! axp.subscribe(&print)?;
//! axp.setup()?;
//! for second in 0..60 {
//!     // A failed poll is logged and retried on the next interval
//!     let _ = axp.tick(Duration::from_secs(second));
//! }
//! # Ok(())
//! # }
//! ```

use core::time::Duration;

use embedded_hal::i2c;

use crate::config::{Brightness, Config};
use crate::driver::{Axp192, State};
use crate::error::{ConfigError, Error};
use crate::publisher::{MeasurementPublisher, MeasurementSubscriber};
use crate::readings::Readings;

/// Polls the chip every update interval and publishes what it reads
pub struct Axp192Component<'a, I2C, const N: usize> {
    driver: Axp192<I2C>,
    publisher: MeasurementPublisher<'a, N>,
    next_poll: Option<Duration>,
}

impl<'a, I2C, E, const N: usize> Axp192Component<'a, I2C, N>
where
    I2C: i2c::I2c<Error = E>,
    E: i2c::Error,
{
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self {
            driver: Axp192::new(i2c, config),
            publisher: MeasurementPublisher::new(),
            next_poll: None,
        }
    }

    pub fn subscribe(
        &mut self,
        subscriber: &'a dyn MeasurementSubscriber,
    ) -> Result<(), ConfigError> {
        self.publisher.subscribe(subscriber)
    }

    /// Initialize the chip; an error here should abort startup
    pub fn setup(&mut self) -> Result<(), Error<E>> {
        self.driver.initialize()?;
        self.next_poll = None;
        log::info!(
            "AXP192 ready, {} channel(s) every {} ms",
            self.driver.config().channels().len(),
            self.driver.config().update_interval().as_millis()
        );
        Ok(())
    }

    /// Poll if the update interval has elapsed
    ///
    /// Returns `Ok(None)` when nothing was due. The first tick after [`setup`](Self::setup)
    /// always polls. After a failed poll the next attempt is one interval later.
    pub fn tick(&mut self, now: Duration) -> Result<Option<Readings>, Error<E>> {
        if self.driver.state() != State::Initialized {
            return Err(Error::NotInitialized);
        }
        if self.next_poll.is_some_and(|due| now < due) {
            return Ok(None);
        }
        let interval = self.driver.config().update_interval();
        self.next_poll = Some(now.saturating_add(interval));
        self.update(now).map(Some)
    }

    /// Poll and publish now, regardless of the schedule
    pub fn update(&mut self, now: Duration) -> Result<Readings, Error<E>> {
        match self.driver.poll_at(now) {
            Ok(readings) => {
                self.publisher.publish(readings);
                Ok(readings)
            }
            Err(e) => {
                if let Error::Poll(bus) = &e {
                    log::warn!(
                        "poll failed on register {:#04x} ({:?}), keeping previous readings",
                        bus.register,
                        bus.kind()
                    );
                }
                Err(e)
            }
        }
    }

    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<(), Error<E>> {
        self.driver.set_brightness(brightness)
    }

    /// Last published snapshot
    pub fn readings(&self) -> Readings {
        self.publisher.last()
    }

    /// Direct access to the chip, e.g. for the coulomb counter or power off
    pub fn driver(&mut self) -> &mut Axp192<I2C> {
        &mut self.driver
    }

    /// Stop polling and give the bus back
    pub fn teardown(self) -> I2C {
        log::info!("AXP192 torn down");
        self.driver.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Channel, Model};
    use crate::mock::MockBus;
    use crate::readings::Measurement;
    use crate::registers as reg;
    use core::cell::RefCell;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(Channel, Measurement)>>);

    impl MeasurementSubscriber for Recorder {
        fn on_update(&self, channel: Channel, measurement: Measurement) {
            self.0.borrow_mut().push((channel, measurement));
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn m5core2_battery() -> Config {
        Config::new(Model::M5Core2)
            .with_channel(Channel::BatteryVoltage)
            .with_channel(Channel::BatteryLevel)
            .with_update_interval(secs(10))
            .unwrap()
    }

    #[test]
    fn m5core2_battery_end_to_end() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        bus.set_adc_12(reg::BATTERY_VOLTAGE, 3636); // ~4.0 V
        bus.set_adc_13(reg::BATTERY_DISCHARGE_CURRENT, 200);
        let recorder = Recorder::default();
        let mut axp: Axp192Component<'_, _, 1> =
            Axp192Component::new(bus.clone(), m5core2_battery());
        axp.subscribe(&recorder).unwrap();
        axp.setup().unwrap();

        let readings = axp.tick(secs(0)).unwrap().unwrap();
        assert_eq!(readings.len(), 2);
        assert!(!readings.contains(Channel::BatteryCurrent));
        let voltage = readings.get(Channel::BatteryVoltage).unwrap();
        let level = readings.get(Channel::BatteryLevel).unwrap();
        assert!((3.0..=4.3).contains(&voltage), "{voltage}");
        assert!((0.0..=100.0).contains(&level), "{level}");

        let seen = recorder.0.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, Channel::BatteryLevel);
        assert_eq!(seen[1].0, Channel::BatteryVoltage);
        assert_eq!(seen[1].1.unit, crate::config::Unit::Volt);
        assert_eq!(seen[1].1.timestamp, secs(0));
    }

    #[test]
    fn polls_once_per_interval() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        let mut axp: Axp192Component<'_, _, 1> = Axp192Component::new(bus, m5core2_battery());
        axp.setup().unwrap();

        let polled: Vec<u64> = (0..35)
            .filter(|&s| axp.tick(secs(s)).unwrap().is_some())
            .collect();
        assert_eq!(polled, [0, 10, 20, 30]);
    }

    #[test]
    fn tick_before_setup() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        let mut axp: Axp192Component<'_, _, 1> =
            Axp192Component::new(bus.clone(), m5core2_battery());
        assert_eq!(axp.tick(secs(0)).unwrap_err(), Error::NotInitialized);
        assert_eq!(bus.transactions(), 0);
    }

    #[test]
    fn failed_setup_is_reported() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        bus.fail_everything(true);
        let mut axp: Axp192Component<'_, _, 1> = Axp192Component::new(bus, m5core2_battery());
        assert!(matches!(axp.setup(), Err(Error::Init(_))));
        assert_eq!(axp.tick(secs(0)).unwrap_err(), Error::NotInitialized);
    }

    #[test]
    fn failed_poll_publishes_nothing_and_retries_next_interval() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        bus.set_adc_12(reg::BATTERY_VOLTAGE, 3636);
        let recorder = Recorder::default();
        let mut axp: Axp192Component<'_, _, 1> =
            Axp192Component::new(bus.clone(), m5core2_battery());
        axp.subscribe(&recorder).unwrap();
        axp.setup().unwrap();
        let first = axp.tick(secs(0)).unwrap().unwrap();

        bus.fail_everything(true);
        assert!(matches!(axp.tick(secs(10)), Err(Error::Poll(_))));
        assert_eq!(axp.readings(), first);
        assert_eq!(recorder.0.borrow().len(), 2);

        bus.fail_everything(false);
        assert_eq!(axp.tick(secs(15)).unwrap(), None);
        let next = axp.tick(secs(20)).unwrap().unwrap();
        assert_eq!(next.timestamp(), secs(20));
        assert_eq!(recorder.0.borrow().len(), 4);
    }

    #[test]
    fn update_ignores_schedule() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        let mut axp: Axp192Component<'_, _, 1> = Axp192Component::new(bus, m5core2_battery());
        axp.setup().unwrap();
        axp.tick(secs(0)).unwrap();
        assert!(axp.update(secs(1)).is_ok());
        assert_eq!(axp.readings().timestamp(), secs(1));
        assert_eq!(axp.tick(secs(5)).unwrap(), None);
    }

    #[test]
    fn schedule_saturates_instead_of_overflowing() {
        let config = Config::new(Model::M5Core2)
            .with_channel(Channel::BatteryVoltage)
            .with_update_interval(Duration::MAX)
            .unwrap();
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        let mut axp: Axp192Component<'_, _, 1> = Axp192Component::new(bus, config);
        axp.setup().unwrap();
        assert!(axp.tick(secs(1)).unwrap().is_some());
        assert_eq!(axp.tick(secs(2)).unwrap(), None);

        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        let mut axp: Axp192Component<'_, _, 1> = Axp192Component::new(bus, m5core2_battery());
        axp.setup().unwrap();
        assert!(axp.tick(Duration::MAX).unwrap().is_some());
        assert_eq!(axp.tick(secs(3)).unwrap(), None);
    }

    #[test]
    fn brightness_and_teardown() {
        let bus = MockBus::new(reg::DEFAULT_ADDRESS);
        let mut axp: Axp192Component<'_, _, 1> =
            Axp192Component::new(bus.clone(), m5core2_battery());
        axp.setup().unwrap();
        axp.set_brightness(Brightness::OFF).unwrap();
        assert_eq!(bus.register(reg::DCDC3_VOLTAGE) & 0x7f, 7 << 3);
        axp.driver().set_ldo3_on(true).unwrap();
        assert_ne!(bus.register(reg::OUTPUT_CONTROL) & reg::output::LDO3, 0);
        let _bus: MockBus = axp.teardown();
    }
}
