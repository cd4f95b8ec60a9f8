use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IoError {
    /// A transfer of zero bytes was requested.
    EmptyBuffer,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IoError::EmptyBuffer => f.write_str("zero-length I/O transfer"),
        }
    }
}

impl StdError for IoError {}

/// Peripheral attached to the CPU.
///
/// The machine defines the transfer contract but no device semantics; no
/// executor touches the peripheral, it only has to exist for the CPU to be
/// constructed.
pub trait Io {
    /// Fills `buf` from the device. `buf` must not be empty.
    fn read(&mut self, buf: &mut [u8]) -> Result<(), IoError>;

    /// Sends `buf` to the device. `buf` must not be empty.
    fn write(&mut self, buf: &[u8]) -> Result<(), IoError>;
}

/// An [`Io`] implementation that validates its arguments and transfers
/// nothing.
pub struct StubIo;

impl Io for StubIo {
    fn read(&mut self, buf: &mut [u8]) -> Result<(), IoError> {
        if buf.is_empty() {
            Err(IoError::EmptyBuffer)
        } else {
            Ok(())
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), IoError> {
        if buf.is_empty() {
            Err(IoError::EmptyBuffer)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stub_rejects_empty_buffers() {
        let mut io = StubIo;
        let mut buf = [0u8; 4];
        assert_eq!(io.read(&mut buf), Ok(()));
        assert_eq!(io.read(&mut buf[..0]), Err(IoError::EmptyBuffer));
        assert_eq!(io.write(&buf), Ok(()));
        assert_eq!(io.write(&[]), Err(IoError::EmptyBuffer));
    }
}
