//! Command transmit primitive

/// Fire-and-forget command sink toward the motor controller
///
/// Implementations must not block for longer than it takes to queue the
/// bytes. The line terminator is the implementation's concern; the
/// command text passed in carries none.
pub trait CommandLink {
    /// Transport error
    type Error;

    /// Queue one command for transmission
    fn transmit(&mut self, command: &str) -> Result<(), Self::Error>;
}

impl<T: CommandLink + ?Sized> CommandLink for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, command: &str) -> Result<(), Self::Error> {
        (**self).transmit(command)
    }
}
