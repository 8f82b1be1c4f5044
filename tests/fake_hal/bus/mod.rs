use simple_dht::bus::BusIo;

/// Opaque transport-level failure, as a bus implementation would surface it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusError;

/// A bus endpoint that records every write and replays canned results.
#[derive(Debug)]
pub struct Bus {
    probe_result: Result<(), BusError>,
    /// Consumed front-first, one per write; writes beyond the script succeed.
    write_results: Vec<Result<(), BusError>>,
    read_result: Result<Vec<u8>, BusError>,
    pub writes: Vec<Vec<u8>>,
}

impl Bus {
    /// A healthy sensor that answers every read with `frame`.
    pub fn with_frame(frame: &[u8]) -> Bus {
        Bus {
            probe_result: Ok(()),
            write_results: Vec::new(),
            read_result: Ok(frame.to_vec()),
            writes: Vec::new(),
        }
    }

    /// A sensor that is absent from the bus.
    pub fn failing_probe() -> Bus {
        Bus {
            probe_result: Err(BusError),
            ..Bus::with_frame(&[])
        }
    }

    /// A sensor that rejects the wakeup transmit.
    pub fn failing_wakeup() -> Bus {
        Bus {
            write_results: vec![Err(BusError)],
            ..Bus::with_frame(&[])
        }
    }

    /// A sensor that acks the wakeup but rejects the read command.
    pub fn failing_command() -> Bus {
        Bus {
            write_results: vec![Ok(()), Err(BusError)],
            ..Bus::with_frame(&[])
        }
    }

    /// A sensor that accepts writes but fails the read back.
    pub fn failing_read() -> Bus {
        Bus {
            read_result: Err(BusError),
            ..Bus::with_frame(&[])
        }
    }
}

impl BusIo for Bus {
    type Error = BusError;

    fn probe(&mut self) -> Result<(), BusError> {
        self.probe_result
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.writes.push(bytes.to_vec());
        if self.write_results.is_empty() {
            Ok(())
        } else {
            self.write_results.remove(0)
        }
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), BusError> {
        match &self.read_result {
            Ok(frame) => {
                buffer.copy_from_slice(frame);
                Ok(())
            }
            Err(error) => Err(*error),
        }
    }
}
