//! AXP192 power management chip sensor driver
//!
//! [`Axp192Component`] is the starting-point interface for this crate: give it a bus and a
//! [`Config`], call `setup` once, then `tick` it from your scheduler. Readings for the channels
//! you enabled are handed to every [`MeasurementSubscriber`] after each successful poll.
//! [`Axp192`] is the driver underneath, for when you want to run the polling yourself.
//!
//! Some devices which include this IC:
//!
//!  * [M5Stack Core 2](https://docs.m5stack.com/en/core/core2) (including the [Core 2 for
//!    AWS](https://docs.m5stack.com/en/core/core2_for_aws) variant)
//!  * [M5Stack Tough](https://docs.m5stack.com/en/core/tough)
//!  * [M5StickC](https://docs.m5stack.com/en/core/m5stickc)
//!  * [M5StickC PLUS](https://docs.m5stack.com/en/core/m5stickc_plus)
//!  * LilyGO TTGO T-Call
//!
//! ***Warning!*** This chip probably controls power to the microcontroller you are running the
//! code on, and bricking the entire device is a possibility! Pick the [`Model`] that matches
//! your board.
//!
//! The bus is any `embedded-hal` 1.0 [`I2c`](embedded_hal::i2c::I2c) implementation. To share it
//! with other devices, pass one of the `embedded-hal-bus` shared device types; each register
//! access is a single transaction.
//!
//! Logging goes through the [`log`] facade. Enable the `defmt` feature to derive
//! `defmt::Format` on the public types.
//!
//! Datasheet:
//! [https://github.com/m5stack/M5-Schematic/blob/master/Core/AXP192%20Datasheet_v1.1_en_draft_2211.pdf
//! ](https://github.com/m5stack/M5-Schematic/blob/master/Core/AXP192%20Datasheet_v1.1_en_draft_2211.pdf)

#![warn(rust_2018_idioms)]
#![cfg_attr(not(test), no_std)]

mod bus;
mod component;
mod config;
mod driver;
mod error;
mod publisher;
mod readings;
pub mod registers;

#[cfg(test)]
mod mock;

pub use bus::RegisterIo;
pub use component::Axp192Component;
pub use config::{Brightness, Channel, ChannelSet, ChargeCurrent, Config, Model, Unit};
pub use driver::{battery_level, Axp192, PekPress, State};
pub use error::{BusError, ConfigError, Error};
pub use publisher::{MeasurementPublisher, MeasurementSubscriber};
pub use readings::{Measurement, Readings};
