//! Host command client
//!
//! Each method performs one complete command exchange. Every status the
//! board sends is compared against the literal expected at that point, so a
//! desynchronised link shows up as [`HostError::UnexpectedStatus`] instead
//! of silently misread data.

use aix_protocol::{
    Command, ConfigEntry, Descriptor, Status, CONFIG_SLOTS, ECHO_LEN, STATUS_LEN, WORD_LEN,
};
use embedded_io::{Read, ReadExactError, Write};

/// Errors from a host exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostError<E> {
    /// The port failed
    Io(E),
    /// The port closed in the middle of a reply
    UnexpectedEof,
    /// The board sent something other than the expected status
    UnexpectedStatus {
        /// Status the protocol requires at this point
        expected: Status,
        /// The 16 bytes actually received
        received: [u8; STATUS_LEN],
    },
    /// More words than a descriptor can describe
    TransferTooLong,
}

impl<E> From<ReadExactError<E>> for HostError<E> {
    fn from(e: ReadExactError<E>) -> Self {
        match e {
            ReadExactError::UnexpectedEof => HostError::UnexpectedEof,
            ReadExactError::Other(e) => HostError::Io(e),
        }
    }
}

/// Host end of the link
pub struct HostLink<P> {
    port: P,
}

impl<P: Read + Write> HostLink<P> {
    /// Wrap a connected port
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Release the port
    pub fn into_inner(self) -> P {
        self.port
    }

    /// Access the port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// HELLO: check the board is alive
    pub fn hello(&mut self) -> Result<(), HostError<P::Error>> {
        self.send_command(Command::Hello)?;
        self.expect(Status::Hello)
    }

    /// ECHO: send 16 bytes and return what came back
    pub fn echo(
        &mut self,
        payload: &[u8; ECHO_LEN],
    ) -> Result<[u8; ECHO_LEN], HostError<P::Error>> {
        self.send_command(Command::Echo)?;
        self.send(payload)?;
        let mut reply = [0u8; ECHO_LEN];
        self.port.read_exact(&mut reply)?;
        Ok(reply)
    }

    /// STORE_RAM: write `words` at byte offset `address` of the memory window
    pub fn store_ram(&mut self, address: u32, words: &[u32]) -> Result<(), HostError<P::Error>> {
        self.store_ram_iter(address, words.iter().copied())
    }

    /// STORE_RAM from any exact-size word source
    pub fn store_ram_iter<I>(&mut self, address: u32, words: I) -> Result<(), HostError<P::Error>>
    where
        I: IntoIterator<Item = u32>,
        I::IntoIter: ExactSizeIterator,
    {
        let words = words.into_iter();
        let count = u32::try_from(words.len()).map_err(|_| HostError::TransferTooLong)?;

        self.send_command(Command::StoreRam)?;
        self.expect(Status::Waiting)?;
        self.send(&Descriptor::new(address, count).encode())?;
        self.expect(Status::CommandReceived)?;

        for word in words {
            self.send(&word.to_le_bytes())?;
        }
        self.flush()?;

        self.expect(Status::StoreComplete)
    }

    /// LOAD_RAM: fill `out` with words read from byte offset `address`
    pub fn load_ram(&mut self, address: u32, out: &mut [u32]) -> Result<(), HostError<P::Error>> {
        let count = u32::try_from(out.len()).map_err(|_| HostError::TransferTooLong)?;

        self.send_command(Command::LoadRam)?;
        self.expect(Status::Waiting)?;
        self.send(&Descriptor::new(address, count).encode())?;
        self.flush()?;
        self.expect(Status::CommandReceived)?;

        // The stream ends after exactly `count` words; there is no status
        for word in out.iter_mut() {
            let mut bytes = [0u8; WORD_LEN];
            self.port.read_exact(&mut bytes)?;
            *word = u32::from_le_bytes(bytes);
        }
        Ok(())
    }

    /// STORE_CFG: program all configuration slots
    pub fn store_cfg(
        &mut self,
        entries: &[ConfigEntry; CONFIG_SLOTS],
    ) -> Result<(), HostError<P::Error>> {
        self.send_command(Command::StoreCfg)?;
        self.expect(Status::Waiting)?;
        for entry in entries {
            self.send(&entry.encode())?;
        }
        self.flush()?;
        self.expect(Status::StoreComplete)
    }

    /// RUN_ENGINE: start the engine and wait until the board reports completion
    pub fn run_engine(&mut self) -> Result<(), HostError<P::Error>> {
        self.send_command(Command::RunEngine)?;
        self.expect(Status::EngineRunning)?;
        self.expect(Status::EngineComplete)
    }

    /// PAUSE: wait out the board's pause
    pub fn pause(&mut self) -> Result<(), HostError<P::Error>> {
        self.send_command(Command::Pause)?;
        self.expect(Status::Paused)?;
        self.expect(Status::Resumed)
    }

    fn send_command(&mut self, command: Command) -> Result<(), HostError<P::Error>> {
        self.send(&[command.to_byte()])?;
        self.flush()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), HostError<P::Error>> {
        self.port.write_all(bytes).map_err(HostError::Io)
    }

    fn flush(&mut self) -> Result<(), HostError<P::Error>> {
        self.port.flush().map_err(HostError::Io)
    }

    fn expect(&mut self, expected: Status) -> Result<(), HostError<P::Error>> {
        let mut received = [0u8; STATUS_LEN];
        self.port.read_exact(&mut received)?;
        if &received != expected.as_bytes() {
            return Err(HostError::UnexpectedStatus { expected, received });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::vec::Vec;

    /// Port with canned board replies that records what the host sent
    struct CannedPort {
        replies: Vec<u8>,
        pos: usize,
        sent: Vec<u8>,
    }

    impl CannedPort {
        fn new(replies: &[&[u8]]) -> Self {
            Self {
                replies: replies.concat(),
                pos: 0,
                sent: Vec::new(),
            }
        }
    }

    impl embedded_io::ErrorType for CannedPort {
        type Error = Infallible;
    }

    impl Read for CannedPort {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            let n = buf.len().min(self.replies.len() - self.pos);
            buf[..n].copy_from_slice(&self.replies[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl Write for CannedPort {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    #[test]
    fn test_hello() {
        let mut host = HostLink::new(CannedPort::new(&[Status::Hello.as_bytes()]));
        host.hello().unwrap();
        assert_eq!(host.into_inner().sent, [0x01]);
    }

    #[test]
    fn test_wrong_status_reported() {
        let mut host = HostLink::new(CannedPort::new(&[Status::Waiting.as_bytes()]));
        assert_eq!(
            host.hello(),
            Err(HostError::UnexpectedStatus {
                expected: Status::Hello,
                received: *Status::Waiting.as_bytes(),
            })
        );
    }

    #[test]
    fn test_short_reply_is_eof() {
        let mut host = HostLink::new(CannedPort::new(&[b"  Hello"]));
        assert_eq!(host.hello(), Err(HostError::UnexpectedEof));
    }

    #[test]
    fn test_store_ram_bytes_on_the_wire() {
        let mut host = HostLink::new(CannedPort::new(&[
            Status::Waiting.as_bytes(),
            Status::CommandReceived.as_bytes(),
            Status::StoreComplete.as_bytes(),
        ]));
        host.store_ram(0x20, &[0x1122_3344, 0x5566_7788]).unwrap();

        let sent = host.into_inner().sent;
        assert_eq!(
            sent,
            [
                0x03, // opcode
                0x20, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, // descriptor
                0x44, 0x33, 0x22, 0x11, 0x88, 0x77, 0x66, 0x55, // words
            ]
        );
    }

    #[test]
    fn test_load_ram_reads_exactly_count_words() {
        let mut host = HostLink::new(CannedPort::new(&[
            Status::Waiting.as_bytes(),
            Status::CommandReceived.as_bytes(),
            &[0x44, 0x33, 0x22, 0x11, 0x88, 0x77, 0x66, 0x55],
            Status::Hello.as_bytes(),
        ]));
        let mut words = [0u32; 2];
        host.load_ram(0, &mut words).unwrap();
        assert_eq!(words, [0x1122_3344, 0x5566_7788]);

        // Bytes after the stream belong to the next exchange
        host.hello().unwrap();
    }

    #[test]
    fn test_store_cfg_sends_all_entries() {
        let mut host = HostLink::new(CannedPort::new(&[
            Status::Waiting.as_bytes(),
            Status::StoreComplete.as_bytes(),
        ]));
        let entries: [ConfigEntry; CONFIG_SLOTS] =
            core::array::from_fn(|i| ConfigEntry::new(i as u32, -(i as i32)));
        host.store_cfg(&entries).unwrap();

        let sent = host.into_inner().sent;
        assert_eq!(sent.len(), 1 + CONFIG_SLOTS * 8);
        assert_eq!(sent[0], 0x05);
        assert_eq!(&sent[9..17], &ConfigEntry::new(1, -1).encode());
    }

    #[test]
    fn test_run_engine_and_pause() {
        let mut host = HostLink::new(CannedPort::new(&[
            Status::EngineRunning.as_bytes(),
            Status::EngineComplete.as_bytes(),
            Status::Paused.as_bytes(),
            Status::Resumed.as_bytes(),
        ]));
        host.run_engine().unwrap();
        host.pause().unwrap();
        assert_eq!(host.into_inner().sent, [0x06, 0x07]);
    }
}
