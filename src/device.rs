use core::convert::Infallible;

use crate::bus::{self, BusIo};
use crate::dhtxx::{self, Reading, SensorKind};
use crate::single_wire;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<TIoError, TBusError> {
    /// Wrapped error from the pin HAL.
    Pin(TIoError),
    /// Wrapped error from the bus implementation.
    Bus(TBusError),
    /// The sensor did not respond to the bus probe during init.
    NotFound,
    /// The single-wire line did not read high when the read started.
    LineBusy,
    /// A protocol stage exceeded its maximum duration.
    Timeout,
    /// A full frame was received but failed checksum validation.
    Checksum,
}

impl<TIoError, TBusError> From<single_wire::Error<TIoError>> for Error<TIoError, TBusError> {
    fn from(error: single_wire::Error<TIoError>) -> Error<TIoError, TBusError> {
        match error {
            single_wire::Error::Wrapped(e) => Error::Pin(e),
            single_wire::Error::LineBusy => Error::LineBusy,
            single_wire::Error::Timeout => Error::Timeout,
            single_wire::Error::Checksum => Error::Checksum,
        }
    }
}

impl<TIoError, TBusError> From<bus::Error<TBusError>> for Error<TIoError, TBusError> {
    fn from(error: bus::Error<TBusError>) -> Error<TIoError, TBusError> {
        match error {
            bus::Error::Wrapped(e) => Error::Bus(e),
            bus::Error::Checksum => Error::Checksum,
        }
    }
}

/// How the sensor is wired to the host.
#[derive(Debug)]
pub enum Connection<TPin, TBus> {
    /// A timing-decoded single-wire line on a GPIO.
    SingleWire { kind: SensorKind, pin: TPin },
    /// A byte-oriented bus endpoint.
    Bus(TBus),
}

/// Placeholder pin for a bus-connected device. Uninhabited, so the
/// single-wire code paths compile away.
#[derive(Debug)]
pub enum NoPin {}

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        match *self {}
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        match *self {}
    }
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        match *self {}
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        match *self {}
    }
}

/// Placeholder bus for a single-wire device.
#[derive(Debug)]
pub enum NoBus {}

impl BusIo for NoBus {
    type Error = Infallible;

    fn probe(&mut self) -> Result<(), Infallible> {
        match *self {}
    }

    fn write(&mut self, _bytes: &[u8]) -> Result<(), Infallible> {
        match *self {}
    }

    fn read(&mut self, _buffer: &mut [u8]) -> Result<(), Infallible> {
        match *self {}
    }
}

/// A sensor that was successfully initialized over one [`Connection`].
///
/// The device is a plain value owned by the caller; reads on one device are
/// serialized by `&mut self`, while devices on distinct pins or buses are
/// independent. There is deliberately no process-wide state.
#[derive(Debug)]
pub struct Device<TPin, TBus, TDelay> {
    connection: Connection<TPin, TBus>,
    delay: TDelay,
}

impl<TPin, TBus, TDelay, TIoError> Device<TPin, TBus, TDelay>
where
    TPin: InputPin<Error = TIoError> + OutputPin<Error = TIoError>,
    TBus: BusIo,
    TDelay: DelayNs,
{
    /// Initializes the sensor over the given connection.
    ///
    /// Bus-connected sensors are probed; one that does not answer its
    /// address fails with [`Error::NotFound`]. Single-wire pins must already
    /// be configured by the caller (open-drain output, pull-up enabled, pin
    /// interrupt disabled) and are not touched here.
    ///
    /// Reading is only possible through the returned device, so a read can
    /// never happen before a successful init.
    pub fn init(
        mut connection: Connection<TPin, TBus>,
        delay: TDelay,
    ) -> Result<Device<TPin, TBus, TDelay>, Error<TIoError, TBus::Error>> {
        if let Connection::Bus(io) = &mut connection {
            io.probe().map_err(|_| Error::NotFound)?;
        }
        Ok(Device { connection, delay })
    }

    /// Performs one blocking read and returns the decoded measurement.
    ///
    /// Each call is a single attempt; the sensors need 1-2 seconds between
    /// reads, so callers that retry on failure should wait at least that
    /// long. On failure nothing of the partial frame is exposed.
    pub fn read(&mut self) -> Result<Reading, Error<TIoError, TBus::Error>> {
        match &mut self.connection {
            Connection::SingleWire { kind, pin } => {
                let frame = single_wire::read_frame(pin, &mut self.delay)?;
                Ok(dhtxx::decode_frame(*kind, &frame))
            }
            Connection::Bus(io) => {
                let frame = bus::read_frame(io)?;
                Ok(bus::decode_frame(&frame))
            }
        }
    }

    /// Releases the connection and the delay.
    pub fn free(self) -> (Connection<TPin, TBus>, TDelay) {
        (self.connection, self.delay)
    }
}

impl<TPin, TDelay, TIoError> Device<TPin, NoBus, TDelay>
where
    TPin: InputPin<Error = TIoError> + OutputPin<Error = TIoError>,
    TDelay: DelayNs,
{
    /// Initializes a sensor on a single-wire line.
    pub fn single_wire(
        kind: SensorKind,
        pin: TPin,
        delay: TDelay,
    ) -> Result<Device<TPin, NoBus, TDelay>, Error<TIoError, Infallible>> {
        Device::init(Connection::SingleWire { kind, pin }, delay)
    }
}

impl<TBus, TDelay> Device<NoPin, TBus, TDelay>
where
    TBus: BusIo,
    TDelay: DelayNs,
{
    /// Initializes a bus-connected sensor, probing its address.
    pub fn bus(
        io: TBus,
        delay: TDelay,
    ) -> Result<Device<NoPin, TBus, TDelay>, Error<Infallible, TBus::Error>> {
        Device::init(Connection::Bus(io), delay)
    }
}
