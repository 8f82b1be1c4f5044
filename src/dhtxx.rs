use crate::single_wire;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

pub use crate::single_wire::Error;

/// Which sensor of the family is on the line.
///
/// The variants report humidity identically; they differ in how the
/// temperature word is interpreted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Reports the full 16-bit temperature word as magnitude.
    Dht11,
    /// Uses bit 15 of the temperature word as a sign flag.
    Dht22,
}

/// One decoded measurement.
///
/// The sensors report tenths, so both values carry one decimal place of
/// real precision.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Temperature in degrees Celsius.
    pub temperature: f32,
}

/// Humidity is in bytes 0-1, temperature in bytes 2-3, big-endian tenths.
/// The sign flag in bit 15 of the temperature word only exists on
/// [`SensorKind::Dht22`].
pub(crate) fn decode_frame(kind: SensorKind, frame: &[u8; single_wire::FRAME_SIZE]) -> Reading {
    let humidity = u16::from_be_bytes([frame[0], frame[1]]) as f32 / 10.0;
    let temperature = match kind {
        SensorKind::Dht11 => u16::from_be_bytes([frame[2], frame[3]]) as f32 / 10.0,
        SensorKind::Dht22 => {
            let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]) as f32 / 10.0;
            if frame[2] & 0x80 != 0 {
                -magnitude
            } else {
                magnitude
            }
        }
    };
    Reading {
        humidity,
        temperature,
    }
}

macro_rules! dht_impl {
    ($name:ident, kind: $kind:expr) => {
        #[derive(Debug)]
        pub struct $name<TPin, TDelay> {
            pin: TPin,
            delay: TDelay,
        }

        impl<TPin, TDelay, TIoError> $name<TPin, TDelay>
        where
            TPin: InputPin<Error = TIoError> + OutputPin<Error = TIoError>,
            TDelay: DelayNs,
        {
            /// Constructs a driver that owns the sensor's data pin.
            ///
            /// The pin must be configured as an open-drain output with the
            /// line pulled up and any pin interrupt disabled, so that it
            /// reads high while the line is idle and `set_high` releases
            /// the line to the sensor.
            pub fn new(pin: TPin, delay: TDelay) -> $name<TPin, TDelay> {
                $name { pin, delay }
            }

            /// Performs one blocking read.
            ///
            /// This holds the line low for 10ms and then decodes the
            /// response under a critical section, so a call blocks for
            /// roughly 10-15ms and never longer than the sum of the
            /// protocol stage timeouts. There is no internal retry; the
            /// sensors need 1-2 seconds between reads, so callers that
            /// retry on failure should wait at least that long.
            pub fn read(&mut self) -> Result<Reading, Error<TIoError>> {
                let frame = single_wire::read_frame(&mut self.pin, &mut self.delay)?;
                Ok(decode_frame($kind, &frame))
            }

            /// Releases the pin and the delay.
            pub fn free(self) -> (TPin, TDelay) {
                (self.pin, self.delay)
            }
        }
    };
}

dht_impl!(Dht11, kind: SensorKind::Dht11);
dht_impl!(Dht22, kind: SensorKind::Dht22);
