//! Command dispatcher
//!
//! Reads one opcode at a time from the link and runs the matching command
//! sub-protocol to completion before reading the next opcode. Unknown
//! opcodes are dropped silently. There is no cancellation: once a command
//! starts, the host cannot interrupt it.
//!
//! Per-command exchanges (H = host, B = board):
//!
//! ```text
//! HELLO       H: 01                 B: Hello
//! ECHO        H: 02 <16B>           B: <same 16B>
//! STORE_RAM   H: 03                 B: Waiting
//!             H: <addr,count>       B: CMD_Receive
//!             H: <4B> × count       B: Store complete
//! LOAD_RAM    H: 04                 B: Waiting
//!             H: <addr,count>       B: CMD_Receive, <4B> × count
//! STORE_CFG   H: 05                 B: Waiting
//!             H: <offset,value>×22  B: Store complete
//! RUN_ENGINE  H: 06                 B: Engine Run, ..., Engine complete
//! PAUSE       H: 07                 B: Pause, ..., Resume
//! ```

use aix_hal::{DelayNs, MemoryBus, Uart};
use aix_protocol::{
    Command, ConfigEntry, Descriptor, Status, CONFIG_ENTRY_LEN, CONFIG_SLOTS, DESCRIPTOR_LEN,
    ECHO_LEN, WORD_LEN,
};

use crate::config::{ConfigTable, DispatchConfig};
use crate::engine::Completion;
use crate::error::DispatchError;
use crate::memory;

/// Result of one dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// The opcode selected a command, which ran to completion
    Handled(Command),
    /// The opcode was not a command; nothing was sent
    Ignored(u8),
}

/// The board side of the command protocol
///
/// Owns its collaborators: the serial link `L`, the memory bus `M`, the
/// delay provider `D` used by PAUSE and the engine completion strategy `C`.
pub struct Dispatcher<L, M, D, C> {
    link: L,
    bus: M,
    delay: D,
    completion: C,
    table: ConfigTable,
    config: DispatchConfig,
}

impl<L, M, D, C> Dispatcher<L, M, D, C>
where
    L: Uart,
    M: MemoryBus,
    D: DelayNs,
    C: Completion,
{
    /// Create a dispatcher
    pub fn new(
        link: L,
        bus: M,
        delay: D,
        completion: C,
        table: ConfigTable,
        config: DispatchConfig,
    ) -> Self {
        Self {
            link,
            bus,
            delay,
            completion,
            table,
            config,
        }
    }

    /// Dispatch commands until the link fails
    ///
    /// On a healthy link this never returns.
    pub fn run(&mut self) -> DispatchError<L::Error> {
        info!("Dispatcher running");
        loop {
            if let Err(e) = self.step() {
                return e;
            }
        }
    }

    /// Read one opcode and run its command to completion
    pub fn step(&mut self) -> Result<Dispatch, DispatchError<L::Error>> {
        let opcode = self.link.read_byte().map_err(DispatchError::Link)?;

        let Some(command) = Command::from_byte(opcode) else {
            trace!("Ignoring unknown opcode {:#x}", opcode);
            return Ok(Dispatch::Ignored(opcode));
        };

        debug!("Command {:?}", command);
        match command {
            Command::Hello => self.hello()?,
            Command::Echo => self.echo()?,
            Command::StoreRam => self.store_ram()?,
            Command::LoadRam => self.load_ram()?,
            Command::StoreCfg => self.store_cfg()?,
            Command::RunEngine => self.run_engine()?,
            Command::Pause => self.pause()?,
        }
        self.link.flush().map_err(DispatchError::Link)?;

        Ok(Dispatch::Handled(command))
    }

    /// Configuration table as programmed by the host
    pub fn config_table(&self) -> &ConfigTable {
        &self.table
    }

    /// Board configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// The memory bus
    pub fn bus(&self) -> &M {
        &self.bus
    }

    /// The serial link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Take the dispatcher apart
    pub fn into_parts(self) -> (L, M, D, C, ConfigTable) {
        (self.link, self.bus, self.delay, self.completion, self.table)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), DispatchError<L::Error>> {
        self.link.write_blocking(bytes).map_err(DispatchError::Link)
    }

    fn send_status(&mut self, status: Status) -> Result<(), DispatchError<L::Error>> {
        trace!("Status {:?}", status);
        self.send(status.as_bytes())
    }

    fn recv<const N: usize>(&mut self) -> Result<[u8; N], DispatchError<L::Error>> {
        let mut buf = [0u8; N];
        self.link
            .read_blocking(&mut buf)
            .map_err(DispatchError::Link)?;
        Ok(buf)
    }

    fn hello(&mut self) -> Result<(), DispatchError<L::Error>> {
        self.send_status(Status::Hello)
    }

    fn echo(&mut self) -> Result<(), DispatchError<L::Error>> {
        let payload: [u8; ECHO_LEN] = self.recv()?;
        self.send(&payload)
    }

    fn store_ram(&mut self) -> Result<(), DispatchError<L::Error>> {
        self.send_status(Status::Waiting)?;
        let desc = Descriptor::decode(&self.recv::<DESCRIPTOR_LEN>()?);
        self.send_status(Status::CommandReceived)?;
        debug!("STORE_RAM addr={:#x} count={}", desc.address, desc.count);

        let mut dropped: u32 = 0;
        for index in 0..desc.count {
            let word: [u8; WORD_LEN] = self.recv()?;
            match self.config.window.word_address(desc.address, index) {
                Some(address) => memory::write_word(&mut self.bus, address, &word),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(
                "STORE_RAM dropped {} words outside the memory window",
                dropped
            );
        }

        self.send_status(Status::StoreComplete)
    }

    fn load_ram(&mut self) -> Result<(), DispatchError<L::Error>> {
        self.send_status(Status::Waiting)?;
        let desc = Descriptor::decode(&self.recv::<DESCRIPTOR_LEN>()?);
        self.send_status(Status::CommandReceived)?;
        debug!("LOAD_RAM addr={:#x} count={}", desc.address, desc.count);

        let mut zeroed: u32 = 0;
        for index in 0..desc.count {
            let word = match self.config.window.word_address(desc.address, index) {
                Some(address) => memory::read_word(&mut self.bus, address),
                None => {
                    zeroed += 1;
                    [0u8; WORD_LEN]
                }
            };
            self.send(&word)?;
        }
        if zeroed > 0 {
            warn!(
                "LOAD_RAM zero-filled {} words outside the memory window",
                zeroed
            );
        }

        // No trailing status: the host counts 4 * count bytes
        Ok(())
    }

    fn store_cfg(&mut self) -> Result<(), DispatchError<L::Error>> {
        self.send_status(Status::Waiting)?;

        for _ in 0..CONFIG_SLOTS {
            let entry = ConfigEntry::decode(&self.recv::<CONFIG_ENTRY_LEN>()?);
            if let Err(e) = self.table.apply(entry) {
                warn!("STORE_CFG skipped entry: {:?}", e);
            }
        }

        self.send_status(Status::StoreComplete)
    }

    fn run_engine(&mut self) -> Result<(), DispatchError<L::Error>> {
        let engine = self.config.engine;
        engine.program_pointers(&mut self.bus);

        self.send_status(Status::EngineRunning)?;
        engine.pulse_start(&mut self.bus);

        let polls = engine.wait_done(&mut self.bus, &mut self.completion);
        debug!("Engine done after {} polls", polls);

        self.send_status(Status::EngineComplete)
    }

    fn pause(&mut self) -> Result<(), DispatchError<L::Error>> {
        self.send_status(Status::Paused)?;
        self.link.flush().map_err(DispatchError::Link)?;

        self.delay.delay_ms(self.config.pause_ms);

        self.send_status(Status::Resumed)
    }
}
