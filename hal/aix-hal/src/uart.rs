//! UART serial link abstractions
//!
//! The command protocol assumes a reliable, in-order link where every
//! read and write blocks until the full byte count has been transferred.
//! Partial progress is the implementation's concern, never the caller's.

/// Error type shared by both halves of a link
///
/// Both directions of one peripheral fail in the same way, so the
/// dispatcher can surface a single error type.
pub trait ErrorType {
    /// Error type for link operations
    type Error;
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

/// UART transmitter
pub trait UartTx: ErrorType {
    /// Write all of `data` to the UART
    ///
    /// Blocks until every byte has been handed to the peripheral or an
    /// error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx: ErrorType {
    /// Read exactly `buf.len()` bytes from the UART
    ///
    /// Blocks until the buffer is filled or an error occurs. There is no
    /// timeout.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_blocking(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

impl<T: UartRx + ?Sized> UartRx for &mut T {
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_blocking(buf)
    }
}

/// Combined UART interface
///
/// For links that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// 8N1 configuration at the given baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Default::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneShot {
        bytes: [u8; 4],
        pos: usize,
    }

    impl ErrorType for OneShot {
        type Error = ();
    }

    impl UartRx for OneShot {
        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<(), ()> {
            let end = self.pos + buf.len();
            if end > self.bytes.len() {
                return Err(());
            }
            buf.copy_from_slice(&self.bytes[self.pos..end]);
            self.pos = end;
            Ok(())
        }
    }

    #[test]
    fn test_read_byte_consumes_one() {
        let mut rx = OneShot {
            bytes: [0x01, 0x02, 0x03, 0x04],
            pos: 0,
        };
        assert_eq!(rx.read_byte(), Ok(0x01));
        assert_eq!(rx.read_byte(), Ok(0x02));

        let mut rest = [0u8; 2];
        rx.read_blocking(&mut rest).unwrap();
        assert_eq!(rest, [0x03, 0x04]);
        assert_eq!(rx.read_byte(), Err(()));
    }

    #[test]
    fn test_default_config_is_8n1() {
        let config = UartConfig::with_baudrate(921_600);
        assert_eq!(config.baudrate, 921_600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
