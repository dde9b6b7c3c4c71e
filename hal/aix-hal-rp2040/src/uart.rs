//! Blocking UART link for RP2040

use aix_hal::uart::{DataBits, ErrorType, Parity, StopBits, UartConfig, UartRx, UartTx};
use embassy_rp::uart::{self, Blocking, Error as RpUartError, Uart};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Break condition on the line
    Break,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Other error
    Other,
}

impl From<RpUartError> for UartBusError {
    fn from(e: RpUartError) -> Self {
        match e {
            RpUartError::Framing => UartBusError::Framing,
            RpUartError::Break => UartBusError::Break,
            RpUartError::Overrun => UartBusError::Overrun,
            RpUartError::Parity => UartBusError::Parity,
            _ => UartBusError::Other,
        }
    }
}

/// Translate a link configuration into the embassy-rp one
pub fn rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// Command link over a blocking embassy-rp UART
pub struct BlockingUart<'d> {
    inner: Uart<'d, Blocking>,
}

impl<'d> BlockingUart<'d> {
    /// Wrap an already configured UART
    pub fn new(inner: Uart<'d, Blocking>) -> Self {
        Self { inner }
    }

    /// Release the UART
    pub fn into_inner(self) -> Uart<'d, Blocking> {
        self.inner
    }
}

impl ErrorType for BlockingUart<'_> {
    type Error = UartBusError;
}

impl UartTx for BlockingUart<'_> {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartBusError> {
        self.inner.blocking_write(data).map_err(UartBusError::from)
    }

    fn flush(&mut self) -> Result<(), UartBusError> {
        self.inner.blocking_flush().map_err(UartBusError::from)
    }
}

impl UartRx for BlockingUart<'_> {
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<(), UartBusError> {
        self.inner.blocking_read(buf).map_err(UartBusError::from)
    }
}
