//! Raw GPIO output for pins esp-hal exposes no peripheral type for.
//!
//! The XTEink X4 runs its flash in DIO mode, which frees GPIO12 (SPIHD)
//! and GPIO13 (SPIWP) for general use; esp-hal 1.0 doesn't generate
//! types for GPIO12-17 on ESP32-C3, so the status LED is driven with
//! direct register writes.

const GPIO_OUT_W1TS: u32 = 0x6000_4008; // Set output high (write-1-to-set)
const GPIO_OUT_W1TC: u32 = 0x6000_400C; // Set output low  (write-1-to-clear)
const GPIO_ENABLE_W1TS: u32 = 0x6000_4024; // Enable output (write-1-to-set)
const GPIO_FUNC_OUT_SEL_BASE: u32 = 0x6000_4554; // Output signal select, 4B stride
const IO_MUX_BASE: u32 = 0x6000_9000; // IO_MUX register base
const IO_MUX_PIN_STRIDE: u32 = 0x04; // Each pin has a 4-byte register

const SIG_GPIO_OUT: u32 = 0x80; // "simple GPIO output" signal index

/// Minimal output-only pin driver using direct register access.
pub struct RawOutputPin {
    mask: u32, // 1 << pin_number
}

impl RawOutputPin {
    /// Configure a GPIO as push-pull output, initially LOW.
    ///
    /// Safety: caller must ensure the pin is physically free (not a
    /// live flash line) and that no other driver touches it.
    pub unsafe fn new(pin: u8) -> Self {
        let mask = 1u32 << pin;

        unsafe {
            // IO_MUX: function select to GPIO (MCU_SEL = 1), input
            // disabled, no pulls. Read-modify-write keeps the reserved
            // bits.
            let mux_reg = (IO_MUX_BASE + pin as u32 * IO_MUX_PIN_STRIDE) as *mut u32;
            let val = mux_reg.read_volatile();
            mux_reg.write_volatile((val & !0b111) | 1);

            // Route the plain GPIO output signal to this pin.
            let out_sel = (GPIO_FUNC_OUT_SEL_BASE + pin as u32 * 4) as *mut u32;
            out_sel.write_volatile(SIG_GPIO_OUT);

            (GPIO_ENABLE_W1TS as *mut u32).write_volatile(mask);

            // Start LOW (LED off).
            (GPIO_OUT_W1TC as *mut u32).write_volatile(mask);
        }

        Self { mask }
    }
}

impl embedded_hal::digital::ErrorType for RawOutputPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for RawOutputPin {
    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        unsafe {
            (GPIO_OUT_W1TS as *mut u32).write_volatile(self.mask);
        }
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        unsafe {
            (GPIO_OUT_W1TC as *mut u32).write_volatile(self.mask);
        }
        Ok(())
    }
}
