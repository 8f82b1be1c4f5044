use crate::dhtxx::Reading;
use embedded_hal::i2c::{I2c, SevenBitAddress};

/// The sensor's 7-bit bus address.
pub const SENSOR_ADDRESS: SevenBitAddress = 0x5C;

// Function code 0x03 (read registers), start register 0x00, 4 registers.
const READ_COMMAND: [u8; 3] = [0x03, 0x00, 0x04];

/// The number of bytes in a bus frame: the echoed command header, 4 data
/// bytes and a 16-bit CRC.
pub const FRAME_SIZE: usize = 8;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<TBusError> {
    /// Wrapped error from the bus implementation.
    Wrapped(TBusError),
    /// A full frame was received but its CRC did not match.
    Checksum,
}

impl<TBusError> From<TBusError> for Error<TBusError> {
    fn from(error: TBusError) -> Error<TBusError> {
        Error::Wrapped(error)
    }
}

/// The transactions the driver needs from a bus implementation.
///
/// Implementations decide how transactions are bounded in time; a probe or
/// transfer that can hang forever should be configured with a deadline at
/// the bus level.
pub trait BusIo {
    type Error;

    /// Address-only transaction, checking that the sensor responds.
    fn probe(&mut self) -> Result<(), Self::Error>;
    /// Writes `bytes` to the sensor.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
    /// Fills `buffer` from the sensor.
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// [`BusIo`] over any `embedded-hal` I2C bus, addressing the sensor at
/// [`SENSOR_ADDRESS`].
#[derive(Debug)]
pub struct I2cBus<TI2c> {
    i2c: TI2c,
}

impl<TI2c> I2cBus<TI2c>
where
    TI2c: I2c<SevenBitAddress>,
{
    pub fn new(i2c: TI2c) -> I2cBus<TI2c> {
        I2cBus { i2c }
    }

    /// Releases the underlying bus.
    pub fn free(self) -> TI2c {
        self.i2c
    }
}

impl<TI2c> BusIo for I2cBus<TI2c>
where
    TI2c: I2c<SevenBitAddress>,
{
    type Error = TI2c::Error;

    fn probe(&mut self) -> Result<(), Self::Error> {
        self.i2c.write(SENSOR_ADDRESS, &[])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(SENSOR_ADDRESS, bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(SENSOR_ADDRESS, buffer)
    }
}

/// Reads one 8-byte frame: wakes the sensor, sends the read command and
/// validates the trailing CRC. Transport failures are surfaced as
/// [`Error::Wrapped`] without reinterpretation.
pub fn read_frame<TBus>(bus: &mut TBus) -> Result<[u8; FRAME_SIZE], Error<TBus::Error>>
where
    TBus: BusIo,
{
    // The sensor sleeps between reads to keep self-heating out of the
    // humidity measurement; the first transmit only wakes it.
    bus.write(&[0x00])?;
    bus.write(&READ_COMMAND)?;

    let mut frame = [0u8; FRAME_SIZE];
    bus.read(&mut frame)?;

    let received = u16::from_le_bytes([frame[6], frame[7]]);
    if crc16(&frame[..FRAME_SIZE - 2]) != received {
        return Err(Error::Checksum);
    }
    Ok(frame)
}

/// Humidity is in bytes 2-3, temperature in bytes 4-5 with bit 15 as a sign
/// flag. Both are big-endian tenths.
pub(crate) fn decode_frame(frame: &[u8; FRAME_SIZE]) -> Reading {
    let humidity = u16::from_be_bytes([frame[2], frame[3]]) as f32 / 10.0;
    let magnitude = u16::from_be_bytes([frame[4] & 0x7F, frame[5]]) as f32 / 10.0;
    let temperature = if frame[4] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };
    Reading {
        humidity,
        temperature,
    }
}

/// CRC-16 with reflected polynomial 0xA001 and initial value 0xFFFF,
/// processed one bit at a time, LSB first.
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= *byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc16_of_empty_is_initial_value() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn crc16_matches_reference_values() {
        // The standard check value for this polynomial and init.
        assert_eq!(crc16(b"123456789"), 0x4B37);
        assert_eq!(crc16(&[0x03, 0x04, 0x02, 0x36, 0x00, 0xDB]), 0x0550);
    }

    #[test]
    fn decode_uses_bus_byte_offsets() {
        let frame = [0x03, 0x04, 0x02, 0x58, 0x00, 0x96, 0x00, 0x00];
        let reading = decode_frame(&frame);
        assert_eq!(reading.humidity, 60.0);
        assert_eq!(reading.temperature, 15.0);
    }

    #[test]
    fn decode_negates_on_sign_bit() {
        let frame = [0x03, 0x04, 0x02, 0x58, 0x80, 0x96, 0x00, 0x00];
        let reading = decode_frame(&frame);
        assert_eq!(reading.temperature, -15.0);
    }
}
