//! stm32f0xx-hal pins implement the embedded-hal 0.2 traits; the debounce crate
//! wants 1.0 ones.

use core::convert::Infallible;

use embedded_hal_02::digital::v2::InputPin as InputPin02;

pub struct InputPinAdapter<T> {
    wrapped: T,
}

impl<T> InputPinAdapter<T> {
    pub fn new(wrapped: T) -> Self {
        Self { wrapped }
    }
}

impl<T> embedded_hal::digital::ErrorType for InputPinAdapter<T>
where
    T: InputPin02<Error = Infallible>,
{
    type Error = Infallible;
}

impl<T> embedded_hal::digital::InputPin for InputPinAdapter<T>
where
    T: InputPin02<Error = Infallible>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.wrapped.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.wrapped.is_low()
    }
}
