// cooperative-routine demo firmware for the XTEink X4 (ESP32-C3)

#![no_std]

pub mod board;
pub mod clock;
pub mod workers;
