//! XTEink X4 board support, trimmed to what the routine demo drives.
//!
//! The demo leaves the e-paper and SD card untouched; it needs the
//! battery ADC, the power button, and one spare GPIO for a status LED.

pub mod pins;
pub mod raw_gpio;

pub use raw_gpio::RawOutputPin;

use esp_hal::{
    Blocking,
    analog::adc::{Adc, AdcCalCurve, AdcConfig, AdcPin, Attenuation},
    gpio::{Input, InputConfig, Pull},
    peripherals::{ADC1, GPIO0, Peripherals},
};

/// Battery measurement hardware: ADC1 on GPIO0 behind the divider.
pub struct BatteryHw {
    pub adc: Adc<'static, ADC1<'static>, Blocking>,
    pub vbat: AdcPin<GPIO0<'static>, ADC1<'static>, AdcCalCurve<ADC1<'static>>>,
}

/// Board hardware the demo routines own.
pub struct Board {
    pub battery: BatteryHw,
    pub power: Input<'static>,
    pub led: RawOutputPin,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        let mut adc_cfg = AdcConfig::new();

        // 11dB attenuation for the full 0-3.3V range, calibration curve
        // so the reading comes back in millivolts.
        let vbat = adc_cfg
            .enable_pin_with_cal::<_, AdcCalCurve<ADC1>>(p.GPIO0, Attenuation::_11dB);
        let adc = Adc::new(p.ADC1, adc_cfg);

        let power = Input::new(p.GPIO3, InputConfig::default().with_pull(Pull::Up));

        // GPIO12 is a flash pin freed by DIO mode; esp-hal has no
        // peripheral type for it, so the LED goes through the raw
        // register driver. Off at boot.
        let led = unsafe { RawOutputPin::new(pins::STATUS_LED) };

        Board {
            battery: BatteryHw { adc, vbat },
            power,
            led,
        }
    }
}
