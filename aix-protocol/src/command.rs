//! Command opcodes
//!
//! One byte selects the command at the start of every dispatch cycle.

// Opcode values: Host → Board
pub const OP_HELLO: u8 = 0x01;
pub const OP_ECHO: u8 = 0x02;
pub const OP_STORE_RAM: u8 = 0x03;
pub const OP_LOAD_RAM: u8 = 0x04;
pub const OP_STORE_CFG: u8 = 0x05;
pub const OP_RUN_ENGINE: u8 = 0x06;
pub const OP_PAUSE: u8 = 0x07;

/// Commands understood by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Liveness check, answered with the greeting literal
    Hello = OP_HELLO,
    /// 16 bytes echoed back verbatim
    Echo = OP_ECHO,
    /// Host → board block write
    StoreRam = OP_STORE_RAM,
    /// Board → host block read
    LoadRam = OP_LOAD_RAM,
    /// Program the configuration table
    StoreCfg = OP_STORE_CFG,
    /// Start the compute engine and wait for it
    RunEngine = OP_RUN_ENGINE,
    /// Host-visible delay
    Pause = OP_PAUSE,
}

impl Command {
    /// Every command, in opcode order
    pub const ALL: [Command; 7] = [
        Command::Hello,
        Command::Echo,
        Command::StoreRam,
        Command::LoadRam,
        Command::StoreCfg,
        Command::RunEngine,
        Command::Pause,
    ];

    /// Decode an opcode byte
    ///
    /// Returns `None` for bytes outside the command set; the dispatcher
    /// ignores those.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            OP_HELLO => Some(Command::Hello),
            OP_ECHO => Some(Command::Echo),
            OP_STORE_RAM => Some(Command::StoreRam),
            OP_LOAD_RAM => Some(Command::LoadRam),
            OP_STORE_CFG => Some(Command::StoreCfg),
            OP_RUN_ENGINE => Some(Command::RunEngine),
            OP_PAUSE => Some(Command::Pause),
            _ => None,
        }
    }

    /// Opcode byte for this command
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Command::from_byte(byte).ok_or(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_values_match_wire_table() {
        assert_eq!(Command::Hello.to_byte(), 0x01);
        assert_eq!(Command::Echo.to_byte(), 0x02);
        assert_eq!(Command::StoreRam.to_byte(), 0x03);
        assert_eq!(Command::LoadRam.to_byte(), 0x04);
        assert_eq!(Command::StoreCfg.to_byte(), 0x05);
        assert_eq!(Command::RunEngine.to_byte(), 0x06);
        assert_eq!(Command::Pause.to_byte(), 0x07);
    }

    #[test]
    fn test_every_command_decodes_from_its_byte() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_byte(cmd.to_byte()), Some(cmd));
        }
    }

    #[test]
    fn test_unknown_bytes_rejected() {
        assert_eq!(Command::from_byte(0x00), None);
        assert_eq!(Command::from_byte(0x08), None);
        assert_eq!(Command::from_byte(0xFF), None);
        assert_eq!(Command::try_from(0x42), Err(0x42));
    }
}
