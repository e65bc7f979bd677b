//! The AXP192 driver proper

use core::time::Duration;

use embedded_hal::i2c;

use crate::bus::RegisterIo;
use crate::config::{Brightness, Channel, ChargeCurrent, Config, Model};
use crate::error::{BusError, Error};
use crate::readings::Readings;
use crate::registers::{self as reg, output, scale};

/// Lifecycle of [`Axp192`]
///
/// Teardown is [`Axp192::release`], which consumes the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Uninitialized,
    Initialized,
}

/// Power key press latched by the chip
///
/// Returned by [`Axp192::pek_press`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PekPress {
    None,
    Short,
    Long,
}

/// Board-specific startup values
struct ModelDefaults {
    /// Display supply voltages, written first
    display_rails: &'static [(u8, u8)],
    /// Outputs left off after startup
    disabled_outputs: u8,
    /// Whether GPIO0 is run as the 3.3 V LDO feeding the RTC
    rtc_ldo: bool,
}

impl ModelDefaults {
    fn for_model(model: Model) -> Self {
        match model {
            // LDO2 & LDO3: backlight and display, 3.0V
            Model::M5StickC => Self {
                display_rails: &[(reg::LDO23_VOLTAGE, 0xcc)],
                disabled_outputs: 0,
                rtc_ldo: true,
            },
            // LDO3 drives the vibration motor, keep it quiet
            Model::M5Core2 => Self {
                display_rails: &[(reg::DCDC3_VOLTAGE, 0xcc), (reg::LDO23_VOLTAGE, 0xcc)],
                disabled_outputs: output::LDO3,
                rtc_ldo: true,
            },
            Model::M5Tough => Self {
                display_rails: &[(reg::DCDC3_VOLTAGE, 0xcc), (reg::LDO23_VOLTAGE, 0xcc)],
                disabled_outputs: 0,
                rtc_ldo: true,
            },
            Model::TtgoTCall => Self {
                display_rails: &[],
                disabled_outputs: 0,
                rtc_ldo: false,
            },
        }
    }
}

/// Battery charge estimate from its voltage, linear between 3.0V and 4.2V
pub fn battery_level(voltage: f32) -> f32 {
    let level = 100.0 * (voltage - reg::BATTERY_EMPTY_VOLTAGE)
        / (reg::BATTERY_FULL_VOLTAGE - reg::BATTERY_EMPTY_VOLTAGE);
    level.clamp(0.0, 100.0)
}

/// The Axp192 struct is the main interface for this crate
///
/// Construct it with [`Axp192::new`], call [`Axp192::initialize`] once, then [`Axp192::poll`]
/// from the scheduler.
pub struct Axp192<I2C> {
    io: RegisterIo<I2C>,
    config: Config,
    state: State,
    /// Brightness last written to the backlight regulator
    brightness: Option<Brightness>,
    readings: Readings,
}

impl<I2C, E> Axp192<I2C>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Construct a new [`Axp192`]
    ///
    /// `i2c` must be an object which implements the I2C trait from embedded-hal. Nothing is sent
    /// on the bus until [`Axp192::initialize`].
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self {
            io: RegisterIo::new(i2c, config.address()),
            config,
            state: State::Uninitialized,
            brightness: None,
            readings: Readings::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Give the bus back, tearing the driver down
    pub fn release(self) -> I2C {
        self.io.release()
    }

    /// Bring the chip up for the configured model
    ///
    /// Writes the model's register defaults, then the charge current limit if one is
    /// configured, then the configured backlight brightness. Calling this again re-applies the
    /// same values.
    ///
    /// ***Warning!*** This chip probably powers the microcontroller running this code. The
    /// defaults keep DC-DC1 on, but a wrong model can still cut power to peripherals.
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        let model = self.config.model();
        log::info!(
            "initializing AXP192 ({}) at {:#04x}",
            model,
            self.io.address()
        );

        self.state = State::Uninitialized;
        self.brightness = None;

        self.apply_defaults(model).map_err(Error::Init)?;
        if let Some(current) = self.config.charge_current() {
            log::debug!("charge current limit {} mA", current.milliamps());
            self.write_charge_current(current).map_err(Error::Init)?;
        }
        self.apply_brightness(self.config.brightness()).map_err(Error::Init)?;

        self.state = State::Initialized;
        Ok(())
    }

    fn apply_defaults(&mut self, model: Model) -> Result<(), BusError<E>> {
        let defaults = ModelDefaults::for_model(model);

        for &(register, value) in defaults.display_rails {
            self.io.write(register, value)?;
        }

        // ADC sample rate 200Hz, every ADC on
        self.io.write(reg::ADC_SAMPLE_RATE, 0b1111_0010)?;
        self.io.write(reg::ADC_ENABLE_1, 0xff)?;

        // Charge to 4.2V at 100mA
        self.io.write(reg::CHARGE_CONTROL_1, 0xc0)?;

        let outputs = (self.io.read(reg::OUTPUT_CONTROL)? & !output::DCDC2)
            | output::EXTEN
            | output::LDO3
            | output::LDO2
            | output::DCDC1;
        self.io
            .write(reg::OUTPUT_CONTROL, outputs & !defaults.disabled_outputs)?;

        // 128ms power on, 4s power off
        self.io.write(reg::PEK_PARAMETERS, 0x0c)?;

        if defaults.rtc_ldo {
            // GPIO0 as a 3.3V LDO
            self.io.write(reg::GPIO0_LDO_VOLTAGE, 0xf0)?;
            self.io.write(reg::GPIO0_FUNCTION, 0x02)?;
        }

        // No VBUS hold limit
        self.io.write(reg::VBUS_IPSOUT, 0x80)?;
        self.io.write(reg::TEMPERATURE_PROTECTION, 0xfc)?;

        let backup = if defaults.rtc_ldo { 0xa2 } else { 0x22 };
        self.io.write(reg::BACKUP_CHARGE, backup)?;

        // Battery detection on
        self.io.write(reg::SHUTDOWN_CONTROL, 0x46)?;

        log::debug!("model defaults applied");
        Ok(())
    }

    fn write_charge_current(&mut self, current: ChargeCurrent) -> Result<(), BusError<E>> {
        self.io.update_bits(reg::CHARGE_CONTROL_1, 0x0f, current as u8)
    }

    fn ensure_initialized(&self) -> Result<(), Error<E>> {
        match self.state {
            State::Initialized => Ok(()),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    /// Backlight brightness last written
    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    /// Set the display backlight
    ///
    /// Brightness maps onto the regulator feeding the backlight: LDO2 on the M5StickC, DC-DC3
    /// on the Core 2 and Tough. The TTGO T-Call has no display and ignores this.
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<(), Error<E>> {
        self.ensure_initialized()?;
        Ok(self.apply_brightness(brightness)?)
    }

    fn apply_brightness(&mut self, brightness: Brightness) -> Result<(), BusError<E>> {
        if self.brightness == Some(brightness) {
            return Ok(());
        }

        let code = brightness.backlight_code();
        let was_off = self.brightness.is_some_and(Brightness::is_off);
        log::debug!(
            "brightness {} (code {}, was {:?})",
            brightness.fraction(),
            code,
            self.brightness.map(Brightness::fraction)
        );

        let rail = match self.config.model() {
            Model::M5StickC => {
                self.io.update_bits(reg::LDO23_VOLTAGE, 0xf0, code << 4)?;
                Some(output::LDO2)
            }
            Model::M5Core2 => {
                self.io.update_bits(reg::DCDC3_VOLTAGE, 0x7f, code << 3)?;
                None
            }
            Model::M5Tough => {
                self.io.update_bits(reg::DCDC3_VOLTAGE, 0x7f, code << 3)?;
                Some(output::LDO3)
            }
            Model::TtgoTCall => None,
        };

        if let Some(rail) = rail {
            if brightness.is_off() {
                self.io.set_flag(reg::OUTPUT_CONTROL, rail, false)?;
            } else if was_off {
                self.io.set_flag(reg::OUTPUT_CONTROL, rail, true)?;
            }
        }

        self.brightness = Some(brightness);
        Ok(())
    }

    /// Read the enabled channels
    ///
    /// Same as [`Axp192::poll_at`] with a zero timestamp.
    pub fn poll(&mut self) -> Result<Readings, Error<E>> {
        self.poll_at(Duration::ZERO)
    }

    /// Read the enabled channels, stamping them with `timestamp`
    ///
    /// Only the registers behind enabled channels are read. On a bus error nothing is stored
    /// and the previous snapshot stays as it was.
    pub fn poll_at(&mut self, timestamp: Duration) -> Result<Readings, Error<E>> {
        self.ensure_initialized()?;
        let readings = self.read_channels(timestamp).map_err(Error::Poll)?;
        self.readings = readings;
        Ok(readings)
    }

    /// Copy of the last successful poll
    pub fn readings(&self) -> Readings {
        self.readings
    }

    fn read_channels(&mut self, timestamp: Duration) -> Result<Readings, BusError<E>> {
        let channels = self.config.channels();
        let mut readings = Readings::new(timestamp);

        if channels.contains(Channel::BatteryVoltage) || channels.contains(Channel::BatteryLevel) {
            let voltage = self.io.read_12(reg::BATTERY_VOLTAGE)? as f32 * scale::BATTERY_VOLTAGE;
            if channels.contains(Channel::BatteryVoltage) {
                readings.set(Channel::BatteryVoltage, voltage);
            }
            if channels.contains(Channel::BatteryLevel) {
                readings.set(Channel::BatteryLevel, battery_level(voltage));
            }
        }

        if channels.contains(Channel::BatteryCurrent) {
            let charge = self.io.read_13(reg::BATTERY_CHARGE_CURRENT)? as f32;
            let discharge = self.io.read_13(reg::BATTERY_DISCHARGE_CURRENT)? as f32;
            readings.set(
                Channel::BatteryCurrent,
                (charge - discharge) * scale::BATTERY_CURRENT,
            );
        }

        if channels.contains(Channel::BusVoltage) {
            let v = self.io.read_12(reg::VBUS_VOLTAGE)?;
            readings.set(Channel::BusVoltage, v as f32 * scale::BUS_VOLTAGE);
        }

        if channels.contains(Channel::BusCurrent) {
            let v = self.io.read_12(reg::VBUS_CURRENT)?;
            readings.set(Channel::BusCurrent, v as f32 * scale::VBUS_CURRENT);
        }

        if channels.contains(Channel::VinCurrent) {
            let v = self.io.read_12(reg::ACIN_CURRENT)?;
            readings.set(Channel::VinCurrent, v as f32 * scale::ACIN_CURRENT);
        }

        if channels.contains(Channel::Temperature) {
            let v = self.io.read_12(reg::INTERNAL_TEMPERATURE)?;
            readings.set(
                Channel::Temperature,
                v as f32 * scale::TEMPERATURE + scale::TEMPERATURE_OFFSET,
            );
        }

        Ok(readings)
    }

    // Direct chip access, usable in any state

    /// Battery presence, from the power mode register (01)
    pub fn battery_present(&mut self) -> Result<bool, Error<E>> {
        Ok(self.io.get_flag(reg::CHARGE_STATUS, 0b0010_0000)?)
    }

    /// Instructions VBUS it's usable or not
    pub fn vbus_usable(&mut self) -> Result<bool, Error<E>> {
        Ok(self.io.get_flag(reg::POWER_STATUS, 0b0001_0000)?)
    }

    /// LDO2 Switch control
    pub fn set_ldo2_on(&mut self, state: bool) -> Result<(), Error<E>> {
        log::debug!("LDO2 {}", state);
        Ok(self.io.set_flag(reg::OUTPUT_CONTROL, output::LDO2, state)?)
    }

    /// LDO3 Switch control
    pub fn set_ldo3_on(&mut self, state: bool) -> Result<(), Error<E>> {
        log::debug!("LDO3 {}", state);
        Ok(self.io.set_flag(reg::OUTPUT_CONTROL, output::LDO3, state)?)
    }

    /// Battery charge current limit, overriding the configured one until the next
    /// [`Axp192::initialize`]
    pub fn set_charge_current(&mut self, current: ChargeCurrent) -> Result<(), Error<E>> {
        Ok(self.write_charge_current(current)?)
    }

    /// Switch every ADC of enable register 1 on or off
    pub fn set_adc_enabled(&mut self, state: bool) -> Result<(), Error<E>> {
        let enable = if state { 0xff } else { 0x00 };
        Ok(self.io.write(reg::ADC_ENABLE_1, enable)?)
    }

    /// Prepare for MCU sleep
    ///
    /// Sets the sleep bit of the VOFF register, floats GPIO0, stops the ADCs and switches off
    /// every output except DC-DC1.
    pub fn sleep(&mut self) -> Result<(), Error<E>> {
        self.io.set_flag(reg::VOFF_VOLTAGE, 0b0000_1000, true)?;
        self.io.update_bits(reg::GPIO0_FUNCTION, 0x07, 0x07)?;
        self.io.write(reg::ADC_ENABLE_1, 0x00)?;
        self.io.update_bits(reg::OUTPUT_CONTROL, !0xa1, 0)?;
        Ok(())
    }

    /// Cut all power
    ///
    /// ***Warning!*** Only the power key or a charger brings the device back.
    pub fn power_off(&mut self) -> Result<(), Error<E>> {
        log::info!("power off");
        Ok(self.io.set_flag(reg::SHUTDOWN_CONTROL, 0b1000_0000, true)?)
    }

    /// ACIN Voltage ADC
    ///
    /// Return unit: volts
    pub fn vin_voltage(&mut self) -> Result<f32, Error<E>> {
        let v = self.io.read_12(reg::ACIN_VOLTAGE)?;
        Ok(v as f32 * scale::BUS_VOLTAGE)
    }

    /// APS (IPSOUT) voltage
    ///
    /// Return unit: volts
    pub fn aps_voltage(&mut self) -> Result<f32, Error<E>> {
        let v = self.io.read_12(reg::APS_VOLTAGE)?;
        Ok(v as f32 * scale::APS_VOLTAGE)
    }

    /// Battery instantaneous power
    ///
    /// Return unit: milliwatts
    pub fn battery_power(&mut self) -> Result<f32, Error<E>> {
        let v = self.io.read_24(reg::BATTERY_POWER)?;
        Ok(v as f32 * scale::BATTERY_POWER)
    }

    /// Low battery warning level 1 latched
    pub fn low_battery_warning(&mut self) -> Result<bool, Error<E>> {
        Ok(self.io.get_flag(reg::IRQ_STATUS_4, 0b0000_0001)?)
    }

    /// Read and clear the latched power key press
    pub fn pek_press(&mut self) -> Result<PekPress, Error<E>> {
        let state = self.io.read(reg::IRQ_STATUS_3)? & 0b0000_0011;
        if state == 0 {
            return Ok(PekPress::None);
        }
        // Write 1 to clear
        self.io.write(reg::IRQ_STATUS_3, state)?;
        Ok(if state & 0b01 != 0 {
            PekPress::Long
        } else {
            PekPress::Short
        })
    }

    pub fn enable_coulomb_counter(&mut self) -> Result<(), Error<E>> {
        Ok(self.io.write(reg::COULOMB_CONTROL, 0x80)?)
    }

    pub fn disable_coulomb_counter(&mut self) -> Result<(), Error<E>> {
        Ok(self.io.write(reg::COULOMB_CONTROL, 0x00)?)
    }

    /// Pause counting, keeping the counts
    pub fn stop_coulomb_counter(&mut self) -> Result<(), Error<E>> {
        Ok(self.io.write(reg::COULOMB_CONTROL, 0xc0)?)
    }

    /// Zero both counts and keep counting
    pub fn clear_coulomb_counter(&mut self) -> Result<(), Error<E>> {
        Ok(self.io.write(reg::COULOMB_CONTROL, 0xa0)?)
    }

    /// Raw charge count
    pub fn coulomb_charge_count(&mut self) -> Result<u32, Error<E>> {
        Ok(self.io.read_32(reg::COULOMB_CHARGE)?)
    }

    /// Raw discharge count
    pub fn coulomb_discharge_count(&mut self) -> Result<u32, Error<E>> {
        Ok(self.io.read_32(reg::COULOMB_DISCHARGE)?)
    }

    /// Charge put into the battery since the counter was last cleared
    ///
    /// Return unit: mAh. Assumes the 25Hz ADC sample rate.
    pub fn coulomb_charged_mah(&mut self) -> Result<f32, Error<E>> {
        Ok(self.coulomb_charge_count()? as f32 * scale::COULOMB)
    }

    /// Charge taken out of the battery since the counter was last cleared
    ///
    /// Return unit: mAh. Assumes the 25Hz ADC sample rate.
    pub fn coulomb_discharged_mah(&mut self) -> Result<f32, Error<E>> {
        Ok(self.coulomb_discharge_count()? as f32 * scale::COULOMB)
    }

    /// Net charge into the battery since the counter was last cleared
    ///
    /// Return unit: mAh. Assumes the 25Hz ADC sample rate.
    pub fn coulomb_net_charge(&mut self) -> Result<f32, Error<E>> {
        let charged = self.coulomb_charge_count()? as i64;
        let discharged = self.coulomb_discharge_count()? as i64;
        Ok((charged - discharged) as f32 * scale::COULOMB)
    }

    /// Battery charging current, ignoring discharge
    ///
    /// Return unit: amperes
    pub fn battery_charge_current(&mut self) -> Result<f32, Error<E>> {
        let v = self.io.read_13(reg::BATTERY_CHARGE_CURRENT)?;
        Ok(v as f32 * scale::BATTERY_CURRENT)
    }
}
