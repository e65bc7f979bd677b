//! Configuration surface
//!
//! Everything here is checked when it is built, so a [`Config`] that exists is one the driver can
//! apply without further validation.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use crate::error::ConfigError;
use crate::registers;

/// Board the chip is soldered to
///
/// Selects the display rail defaults and which regulator drives the backlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Model {
    /// [M5StickC](https://docs.m5stack.com/en/core/m5stickc): LDO2 backlight, LDO3 display
    M5StickC,
    /// [M5Stack Core 2](https://docs.m5stack.com/en/core/core2): DC-DC3 backlight, LDO3
    /// vibration motor
    M5Core2,
    /// [M5Stack Tough](https://docs.m5stack.com/en/core/tough): DC-DC3 backlight, LDO3 display
    M5Tough,
    /// TTGO T-Call: no display, LDO3 GPS supply, GPIO0 not used as the RTC LDO
    ///
    /// Startup still writes the common defaults, including the output switches, which turn on
    /// LDO3 and EXTEN. Only the display rails and the GPIO0 RTC LDO are skipped.
    TtgoTCall,
}

impl Model {
    pub const ALL: [Model; 4] = [
        Model::M5StickC,
        Model::M5Core2,
        Model::M5Tough,
        Model::TtgoTCall,
    ];

    /// Configuration name, e.g. `M5CORE2`
    pub fn name(self) -> &'static str {
        match self {
            Model::M5StickC => "M5STICKC",
            Model::M5Core2 => "M5CORE2",
            Model::M5Tough => "M5TOUGH",
            Model::TtgoTCall => "TTGO_TCALL",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names are matched case-insensitively, with spaces read as `_`
impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| matches_name(s, m.name(), Some('_')))
            .ok_or(ConfigError::UnknownModel)
    }
}

/// Battery charge current limit
///
/// The discriminant is the value of the low three bits of charge control register 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeCurrent {
    Ma100 = 0,
    Ma190 = 1,
    Ma280 = 2,
    Ma360 = 3,
    Ma450 = 4,
    Ma550 = 5,
    Ma630 = 6,
    Ma700 = 7,
}

impl ChargeCurrent {
    pub const ALL: [ChargeCurrent; 8] = [
        ChargeCurrent::Ma100,
        ChargeCurrent::Ma190,
        ChargeCurrent::Ma280,
        ChargeCurrent::Ma360,
        ChargeCurrent::Ma450,
        ChargeCurrent::Ma550,
        ChargeCurrent::Ma630,
        ChargeCurrent::Ma700,
    ];

    pub fn milliamps(self) -> u16 {
        match self {
            ChargeCurrent::Ma100 => 100,
            ChargeCurrent::Ma190 => 190,
            ChargeCurrent::Ma280 => 280,
            ChargeCurrent::Ma360 => 360,
            ChargeCurrent::Ma450 => 450,
            ChargeCurrent::Ma550 => 550,
            ChargeCurrent::Ma630 => 630,
            ChargeCurrent::Ma700 => 700,
        }
    }

    /// Configuration name, e.g. `450MA`
    pub fn name(self) -> &'static str {
        match self {
            ChargeCurrent::Ma100 => "100MA",
            ChargeCurrent::Ma190 => "190MA",
            ChargeCurrent::Ma280 => "280MA",
            ChargeCurrent::Ma360 => "360MA",
            ChargeCurrent::Ma450 => "450MA",
            ChargeCurrent::Ma550 => "550MA",
            ChargeCurrent::Ma630 => "630MA",
            ChargeCurrent::Ma700 => "700MA",
        }
    }
}

/// Names are matched case-insensitively, with spaces ignored (`"450 mA"`)
impl FromStr for ChargeCurrent {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChargeCurrent::ALL
            .into_iter()
            .find(|c| matches_name(s, c.name(), None))
            .ok_or(ConfigError::UnknownChargeCurrent)
    }
}

fn matches_name(input: &str, name: &str, space: Option<char>) -> bool {
    input
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => space,
            c => Some(c.to_ascii_uppercase()),
        })
        .eq(name.chars())
}

/// Physical unit of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Percent,
    Volt,
    Ampere,
    Celsius,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Celsius => "°C",
        }
    }
}

/// One measurement stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Charge estimate from battery voltage, 0-100 %
    BatteryLevel = 0,
    BatteryVoltage = 1,
    /// Positive while charging, negative while discharging
    BatteryCurrent = 2,
    /// VBUS (USB) voltage
    BusVoltage = 3,
    /// VBUS (USB) current
    BusCurrent = 4,
    /// ACIN current
    VinCurrent = 5,
    /// Die temperature
    Temperature = 6,
}

impl Channel {
    pub const COUNT: usize = 7;

    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::BatteryLevel,
        Channel::BatteryVoltage,
        Channel::BatteryCurrent,
        Channel::BusVoltage,
        Channel::BusCurrent,
        Channel::VinCurrent,
        Channel::Temperature,
    ];

    pub fn unit(self) -> Unit {
        match self {
            Channel::BatteryLevel => Unit::Percent,
            Channel::BatteryVoltage | Channel::BusVoltage => Unit::Volt,
            Channel::BatteryCurrent | Channel::BusCurrent | Channel::VinCurrent => Unit::Ampere,
            Channel::Temperature => Unit::Celsius,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of enabled channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Channel::ALL.into_iter().collect()
    }

    pub fn with(mut self, channel: Channel) -> Self {
        self.insert(channel);
        self
    }

    pub fn insert(&mut self, channel: Channel) {
        self.0 |= channel.bit();
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.0 & channel.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled channels in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<T: IntoIterator<Item = Channel>>(iter: T) -> Self {
        let mut set = ChannelSet::empty();
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

/// Backlight brightness as a fraction of full scale, always within 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(f32);

impl Brightness {
    pub const OFF: Brightness = Brightness(0.0);
    pub const FULL: Brightness = Brightness(1.0);

    pub fn new(fraction: f32) -> Result<Self, ConfigError> {
        if (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(ConfigError::BrightnessOutOfRange)
        }
    }

    pub fn fraction(self) -> f32 {
        self.0
    }

    pub fn is_off(self) -> bool {
        self.0 == 0.0
    }

    /// Backlight regulator code, 7 at zero up to 12 at full brightness
    pub fn backlight_code(self) -> u8 {
        let span = registers::BACKLIGHT_CODE_MAX - registers::BACKLIGHT_CODE_MIN;
        let code = registers::BACKLIGHT_CODE_MIN + (self.0 * span as f32) as u8;
        code.min(registers::BACKLIGHT_CODE_MAX)
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Brightness::FULL
    }
}

/// Accepts a fraction (`0.25`) or a percentage (`25%`)
impl FromStr for Brightness {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let fraction = match s.strip_suffix('%') {
            Some(percent) => percent.trim_end().parse::<f32>().map(|p| p / 100.0),
            None => s.parse::<f32>(),
        };
        fraction
            .map_err(|_| ConfigError::BrightnessOutOfRange)
            .and_then(Brightness::new)
    }
}

/// Validated driver configuration
///
/// ```
/// use axp192_sensor::{Channel, ChargeCurrent, Config, Model};
/// # fn main() -> Result<(), axp192_sensor::ConfigError> {
/// let config = Config::new(Model::M5Core2)
///     .with_charge_current(ChargeCurrent::Ma280)
///     .with_channel(Channel::BatteryVoltage)
///     .with_channel(Channel::BatteryLevel)
///     .with_brightness(0.5)?;
/// assert_eq!(config.channels().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    model: Model,
    address: u8,
    charge_current: Option<ChargeCurrent>,
    channels: ChannelSet,
    brightness: Brightness,
    update_interval: Duration,
}

impl Config {
    pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

    /// Defaults: address 0x77, chip charge current, no channels, full brightness, 60 s interval
    pub fn new(model: Model) -> Self {
        Self {
            model,
            address: registers::DEFAULT_ADDRESS,
            charge_current: None,
            channels: ChannelSet::empty(),
            brightness: Brightness::default(),
            update_interval: Self::DEFAULT_UPDATE_INTERVAL,
        }
    }

    pub fn with_address(mut self, address: u8) -> Result<Self, ConfigError> {
        if address > 0x7f {
            return Err(ConfigError::InvalidAddress);
        }
        self.address = address;
        Ok(self)
    }

    pub fn with_charge_current(mut self, current: ChargeCurrent) -> Self {
        self.charge_current = Some(current);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.insert(channel);
        self
    }

    pub fn with_channels(mut self, channels: ChannelSet) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_brightness(mut self, fraction: f32) -> Result<Self, ConfigError> {
        self.brightness = Brightness::new(fraction)?;
        Ok(self)
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidUpdateInterval);
        }
        self.update_interval = interval;
        Ok(self)
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn charge_current(&self) -> Option<ChargeCurrent> {
        self.charge_current
    }

    pub fn channels(&self) -> ChannelSet {
        self.channels
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Config {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "{} at {=u8:#x}, charge {}, channels {}, brightness {}, every {=u64} ms",
            self.model,
            self.address,
            self.charge_current,
            self.channels,
            self.brightness,
            self.update_interval.as_millis() as u64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names() {
        assert_eq!("M5CORE2".parse(), Ok(Model::M5Core2));
        assert_eq!("m5stickc".parse(), Ok(Model::M5StickC));
        assert_eq!("ttgo tcall".parse(), Ok(Model::TtgoTCall));
        assert_eq!(" M5Tough ".parse(), Ok(Model::M5Tough));
        assert_eq!("M5CORE3".parse::<Model>(), Err(ConfigError::UnknownModel));
        for m in Model::ALL {
            assert_eq!(m.name().parse(), Ok(m));
        }
    }

    #[test]
    fn charge_current_names() {
        assert_eq!("450MA".parse(), Ok(ChargeCurrent::Ma450));
        assert_eq!("700 mA".parse(), Ok(ChargeCurrent::Ma700));
        assert_eq!(
            "500MA".parse::<ChargeCurrent>(),
            Err(ConfigError::UnknownChargeCurrent)
        );
        for (code, c) in ChargeCurrent::ALL.into_iter().enumerate() {
            assert_eq!(c as usize, code);
        }
        assert_eq!(ChargeCurrent::Ma630.milliamps(), 630);
    }

    #[test]
    fn brightness_range() {
        assert!(Brightness::new(0.0).is_ok());
        assert!(Brightness::new(1.0).is_ok());
        for bad in [-0.01, 1.01, f32::NAN, f32::INFINITY, -f32::INFINITY] {
            assert_eq!(Brightness::new(bad), Err(ConfigError::BrightnessOutOfRange));
            assert_eq!(
                Config::new(Model::M5Core2).with_brightness(bad),
                Err(ConfigError::BrightnessOutOfRange)
            );
        }
    }

    #[test]
    fn brightness_parsing() {
        assert_eq!("0.25".parse(), Ok(Brightness(0.25)));
        assert_eq!("50%".parse(), Ok(Brightness(0.5)));
        assert_eq!("100 %".parse(), Ok(Brightness(1.0)));
        for bad in ["120%", "-5%", "bright"] {
            assert_eq!(
                bad.parse::<Brightness>(),
                Err(ConfigError::BrightnessOutOfRange)
            );
        }
    }

    #[test]
    fn backlight_code_is_monotonic() {
        assert_eq!(Brightness::OFF.backlight_code(), 7);
        assert_eq!(Brightness::FULL.backlight_code(), 12);
        let mut previous = 0;
        for step in 0..=1000 {
            let brightness = Brightness::new(step as f32 / 1000.0).unwrap();
            let code = brightness.backlight_code();
            assert!(code >= previous, "code dropped at step {step}");
            assert!((7..=12).contains(&code));
            previous = code;
        }
    }

    #[test]
    fn defaults() {
        let config = Config::new(Model::M5StickC);
        assert_eq!(config.address(), 0x77);
        assert_eq!(config.charge_current(), None);
        assert!(config.channels().is_empty());
        assert_eq!(config.brightness(), Brightness::FULL);
        assert_eq!(config.update_interval(), Duration::from_secs(60));
    }

    #[test]
    fn rejected_values() {
        let config = Config::new(Model::M5Core2);
        assert_eq!(config.with_address(0x80), Err(ConfigError::InvalidAddress));
        assert_eq!(
            config.with_update_interval(Duration::ZERO),
            Err(ConfigError::InvalidUpdateInterval)
        );
        assert_eq!(config.with_address(0x34).unwrap().address(), 0x34);
    }

    #[test]
    fn channels_are_independent() {
        for channel in Channel::ALL {
            let set = ChannelSet::empty().with(channel);
            assert_eq!(set.len(), 1);
            assert!(set.iter().eq([channel]));
        }
        let set: ChannelSet = [Channel::Temperature, Channel::BatteryLevel]
            .into_iter()
            .collect();
        assert!(set.iter().eq([Channel::BatteryLevel, Channel::Temperature]));
        assert_eq!(ChannelSet::all().len(), Channel::COUNT);
    }
}
