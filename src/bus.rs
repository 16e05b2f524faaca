//! I2C target-side bus abstraction.
//!
//! The controller is the bus master; this device only ever answers. A
//! [`TargetBus`] implementation wraps whatever peripheral the platform
//! provides (a hardware I2C target, a PIO shim, a test double) and reduces
//! it to the three things the protocol needs: poll, receive, respond.

/// One bus event observed by the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusRequest {
    /// The controller wants to read from us.
    Read,
    /// The controller is writing to us.
    Write,
}

/// Hardware interface for the target end of the link.
///
/// Deployments typically sit at a fixed 7-bit address (0x40 in the
/// reference wiring); addressing is the implementation's concern and never
/// reaches the protocol layer.
pub trait TargetBus {
    /// Returns the pending request, if the controller has addressed us.
    fn poll(&mut self) -> Option<BusRequest>;

    /// Receives one frame into `buffer`, returning the byte count.
    ///
    /// A return of 0 means the controller sent nothing this frame; the
    /// assembler treats that as an empty frame, not an error.
    fn read_frame(&mut self, buffer: &mut [u8]) -> usize;

    /// Sends a response to a controller read.
    fn respond(&mut self, data: &[u8]);
}
