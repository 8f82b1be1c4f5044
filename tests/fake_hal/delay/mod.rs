use embedded_hal::delay::DelayNs;

/// A delay that returns immediately. The scripted fakes advance one sample
/// per poll, not per microsecond, so wall-clock time is irrelevant.
#[derive(Debug)]
pub struct Delay;

impl DelayNs for Delay {
    fn delay_ns(&mut self, _ns: u32) {}
}
