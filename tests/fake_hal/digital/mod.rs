use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// A pin that replays a scripted sequence of line levels, consuming one
/// sample per poll of `is_high`/`is_low`.
#[derive(Debug)]
pub struct Pin {
    data_to_read: Option<Vec<u8>>,
    index: usize,
    default_data: bool,
}

impl Pin {
    pub fn new() -> Pin {
        Pin {
            data_to_read: None,
            index: 0,
            default_data: false,
        }
    }

    /// Level reported on every poll when no script is set.
    pub fn set_default_data(&mut self, default: bool) {
        self.default_data = default;
        self.data_to_read = None;
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data_to_read = Some(data);
        self.index = 0;
    }

    fn sample(&mut self) -> bool {
        match &self.data_to_read {
            None => self.default_data,
            Some(data) => {
                let index = self.index;
                self.index += 1;
                data[index] > 0
            }
        }
    }
}

impl ErrorType for Pin {
    type Error = Infallible;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sample())
    }
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
