#![no_std]

/// Byte-oriented bus transport for bus-capable sensors of the family.
pub mod bus;
/// A configured driver that reads one sensor over either transport.
pub mod device;
/// Drivers for reading DHT11 or DHT22 sensors over their single-wire line.
pub mod dhtxx;
/// The timing-decoded single-wire protocol shared by the drivers.
pub mod single_wire;
