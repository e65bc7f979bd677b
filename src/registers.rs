//! AXP192 register map and ADC scale factors
//!
//! Only the registers this crate touches are listed. Names follow the datasheet sections.

/// Default bus address of the device
pub const DEFAULT_ADDRESS: u8 = 0x77;

/// Input power status (00)
pub const POWER_STATUS: u8 = 0x00;
/// Power mode / charging status (01)
pub const CHARGE_STATUS: u8 = 0x01;
/// DC-DC1/2/3, LDO2/3 and EXTEN output switches (12)
pub const OUTPUT_CONTROL: u8 = 0x12;
/// DC-DC3 output voltage (27)
pub const DCDC3_VOLTAGE: u8 = 0x27;
/// LDO2 (high nibble) and LDO3 (low nibble) output voltage (28)
pub const LDO23_VOLTAGE: u8 = 0x28;
/// VBUS-IPSOUT path management (30)
pub const VBUS_IPSOUT: u8 = 0x30;
/// VOFF shutdown voltage (31)
pub const VOFF_VOLTAGE: u8 = 0x31;
/// Shutdown, battery detection and CHGLED control (32)
pub const SHUTDOWN_CONTROL: u8 = 0x32;
/// Charge control 1: target voltage and current (33)
pub const CHARGE_CONTROL_1: u8 = 0x33;
/// Backup (RTC) battery charge control (35)
pub const BACKUP_CHARGE: u8 = 0x35;
/// PEK key parameters (36)
pub const PEK_PARAMETERS: u8 = 0x36;
/// Battery high temperature threshold (39)
pub const TEMPERATURE_PROTECTION: u8 = 0x39;
/// IRQ status 3, holds the PEK press flags (46)
pub const IRQ_STATUS_3: u8 = 0x46;
/// IRQ status 4, holds the low battery warning flag (47)
pub const IRQ_STATUS_4: u8 = 0x47;

/// ACIN voltage ADC, 12 bit (56)
pub const ACIN_VOLTAGE: u8 = 0x56;
/// ACIN current ADC, 12 bit (58)
pub const ACIN_CURRENT: u8 = 0x58;
/// VBUS voltage ADC, 12 bit (5A)
pub const VBUS_VOLTAGE: u8 = 0x5a;
/// VBUS current ADC, 12 bit (5C)
pub const VBUS_CURRENT: u8 = 0x5c;
/// Internal temperature ADC, 12 bit (5E)
pub const INTERNAL_TEMPERATURE: u8 = 0x5e;
/// Battery instantaneous power, 24 bit (70)
pub const BATTERY_POWER: u8 = 0x70;
/// Battery voltage ADC, 12 bit (78)
pub const BATTERY_VOLTAGE: u8 = 0x78;
/// Battery charge current ADC, 13 bit (7A)
pub const BATTERY_CHARGE_CURRENT: u8 = 0x7a;
/// Battery discharge current ADC, 13 bit (7C)
pub const BATTERY_DISCHARGE_CURRENT: u8 = 0x7c;
/// APS (IPSOUT) voltage ADC, 12 bit (7E)
pub const APS_VOLTAGE: u8 = 0x7e;
/// ADC enable 1 (82)
pub const ADC_ENABLE_1: u8 = 0x82;
/// ADC sample rate and TS pin control (84)
pub const ADC_SAMPLE_RATE: u8 = 0x84;
/// GPIO0 function (90)
pub const GPIO0_FUNCTION: u8 = 0x90;
/// GPIO0 LDO mode output voltage (91)
pub const GPIO0_LDO_VOLTAGE: u8 = 0x91;
/// Coulomb counter charge count, 32 bit (B0)
pub const COULOMB_CHARGE: u8 = 0xb0;
/// Coulomb counter discharge count, 32 bit (B4)
pub const COULOMB_DISCHARGE: u8 = 0xb4;
/// Coulomb counter control (B8)
pub const COULOMB_CONTROL: u8 = 0xb8;

/// Bits of [`OUTPUT_CONTROL`]
pub mod output {
    pub const DCDC1: u8 = 0b0000_0001;
    pub const DCDC3: u8 = 0b0000_0010;
    pub const LDO2: u8 = 0b0000_0100;
    pub const LDO3: u8 = 0b0000_1000;
    pub const DCDC2: u8 = 0b0001_0000;
    pub const EXTEN: u8 = 0b0100_0000;
}

/// ADC steps, in the unit the driver reports
pub mod scale {
    /// Battery voltage, V/LSB
    pub const BATTERY_VOLTAGE: f32 = 0.0011;
    /// Battery charge/discharge current, A/LSB
    pub const BATTERY_CURRENT: f32 = 0.0005;
    /// ACIN and VBUS voltage, V/LSB
    pub const BUS_VOLTAGE: f32 = 0.0017;
    /// VBUS current, A/LSB
    pub const VBUS_CURRENT: f32 = 0.000375;
    /// ACIN current, A/LSB
    pub const ACIN_CURRENT: f32 = 0.000625;
    /// Internal temperature, °C/LSB
    pub const TEMPERATURE: f32 = 0.1;
    /// Internal temperature at code zero, °C
    pub const TEMPERATURE_OFFSET: f32 = -144.7;
    /// APS voltage, V/LSB
    pub const APS_VOLTAGE: f32 = 0.0014;
    /// Battery power, mW/LSB (1.1 mV × 0.5 mA / 1000)
    pub const BATTERY_POWER: f32 = 1.1 * 0.5 / 1000.0;
    /// Coulomb counter, mAh per count at the 25 Hz ADC rate
    pub const COULOMB: f32 = 65536.0 * 0.5 / 3600.0 / 25.0;
}

/// Battery voltage treated as empty, V
pub const BATTERY_EMPTY_VOLTAGE: f32 = 3.0;
/// Battery voltage treated as full, V
pub const BATTERY_FULL_VOLTAGE: f32 = 4.2;

/// Lowest usable backlight regulator code
pub const BACKLIGHT_CODE_MIN: u8 = 7;
/// Highest usable backlight regulator code
pub const BACKLIGHT_CODE_MAX: u8 = 12;
