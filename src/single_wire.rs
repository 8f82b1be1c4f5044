use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

// All single-wire timings are in microseconds unless suffixed otherwise.
// A bit is a low phase of up to 55us followed by a high phase of up to 75us;
// a high phase longer than 30us is a logical 1.
const HOST_START_LOW_MS: u32 = 10;
const HOST_RELEASE_MAX_US: u16 = 200;
const RESPONSE_MAX_US: u16 = 85;
const BIT_START_MAX_US: u16 = 55;
const BIT_HIGH_MAX_US: u16 = 75;
const BIT_ONE_THRESHOLD_US: u16 = 30;

const FRAME_BITS: usize = 40;

/// The number of bytes in a single-wire frame.
pub const FRAME_SIZE: usize = FRAME_BITS / 8;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<TIoError> {
    /// Wrapped error from the HAL.
    Wrapped(TIoError),
    /// The line did not read high when the read started. Another transfer may
    /// still be in progress, or the pull-up is missing.
    LineBusy,
    /// A protocol stage exceeded its maximum duration.
    Timeout,
    /// A full frame was received but its checksum did not match.
    Checksum,
}

impl<TIoError> From<TIoError> for Error<TIoError> {
    fn from(error: TIoError) -> Error<TIoError> {
        Error::Wrapped(error)
    }
}

/// Reads one 5-byte frame from the sensor on the given line.
///
/// The pin must be an open-drain output with the line pulled up, so that
/// `set_high` releases the line to the sensor. The caller is responsible for
/// pin mode and pull-up configuration.
///
/// The sensor's response and the 40 data bits are timed in tens of
/// microseconds, shorter than a typical scheduler quantum, so everything from
/// the release of the line to the final bit runs inside one critical section.
/// The section is bounded by the stage timeouts at a few milliseconds total
/// and is left on every path, including timeouts.
pub fn read_frame<TPin, TDelay, TIoError>(
    pin: &mut TPin,
    delay: &mut TDelay,
) -> Result<[u8; FRAME_SIZE], Error<TIoError>>
where
    TPin: InputPin<Error = TIoError> + OutputPin<Error = TIoError>,
    TDelay: DelayNs,
{
    if pin.is_low()? {
        return Err(Error::LineBusy);
    }

    // Start signal: hold the line low long enough for the sensor to notice.
    // Millisecond granularity is fine here, nothing is decoded yet.
    pin.set_low()?;
    delay.delay_ms(HOST_START_LOW_MS);

    let mut frame = [0u8; FRAME_SIZE];
    critical_section::with(|_| -> Result<(), Error<TIoError>> {
        pin.set_high()?;
        wait_while(pin, delay, PinState::High, HOST_RELEASE_MAX_US)?;
        wait_while(pin, delay, PinState::Low, RESPONSE_MAX_US)?;
        wait_while(pin, delay, PinState::High, RESPONSE_MAX_US)?;

        for bit in 0..FRAME_BITS {
            if read_bit(pin, delay)? {
                frame[bit / 8] |= 1 << (7 - bit % 8);
            }
        }
        Ok(())
    })?;

    if frame[FRAME_SIZE - 1] != checksum(&frame[..FRAME_SIZE - 1]) {
        return Err(Error::Checksum);
    }
    Ok(frame)
}

/// Reads one bit: waits out the low phase, then classifies the bit by how
/// long the line stays high.
fn read_bit<TPin, TDelay, TIoError>(
    pin: &mut TPin,
    delay: &mut TDelay,
) -> Result<bool, Error<TIoError>>
where
    TPin: InputPin<Error = TIoError>,
    TDelay: DelayNs,
{
    wait_while(pin, delay, PinState::Low, BIT_START_MAX_US)?;
    let high_time = wait_while(pin, delay, PinState::High, BIT_HIGH_MAX_US)?;
    Ok(high_time > BIT_ONE_THRESHOLD_US)
}

/// Polls until the line leaves `level`, busy-waiting 1us between polls, and
/// returns the elapsed microseconds. Fails once `max_us` is exceeded.
fn wait_while<TPin, TDelay, TIoError>(
    pin: &mut TPin,
    delay: &mut TDelay,
    level: PinState,
    max_us: u16,
) -> Result<u16, Error<TIoError>>
where
    TPin: InputPin<Error = TIoError>,
    TDelay: DelayNs,
{
    let mut elapsed = 0u16;
    loop {
        let held = match level {
            PinState::High => pin.is_high()?,
            PinState::Low => pin.is_low()?,
        };
        if !held {
            return Ok(elapsed);
        }
        if elapsed > max_us {
            return Err(Error::Timeout);
        }
        delay.delay_us(1);
        elapsed += 1;
    }
}

/// The low 8 bits of the byte sum; the sensor sends this as the 5th byte.
fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}
