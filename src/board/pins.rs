//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  0   | ADC - Battery   | Voltage divider (2x100K), reads 1/2 actual voltage
//!  3   | Digital - Power | Active LOW, internal pullup
//! 12   | Status LED      | Flash pin freed by DIO mode, raw register driver

pub const BATTERY_ADC: u8 = 0;
pub const BTN_POWER: u8 = 3;
pub const STATUS_LED: u8 = 12;
