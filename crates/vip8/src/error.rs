use core::fmt;

/// Faults surfaced by the machine. None of them leave the machine in a
/// half-updated state; the host decides whether to halt, reset or carry on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MachineError {
    /// Program image does not fit between the program origin and the end of memory.
    ProgramTooLarge { len: usize, capacity: usize },

    /// Font image does not fit below the program origin.
    FontTooLarge { len: usize, capacity: usize },

    /// `00EE` executed with an empty call stack.
    StackUnderflow { address: u16 },

    /// Instruction word matches no known operation. The program counter has
    /// already moved past it, so continuing treats the word as a no-op.
    InvalidOpcode { opcode: u16, address: u16 },

    /// Key index outside the 16-key keypad.
    InvalidKey(usize),
}

impl MachineError {
    /// Whether stepping may continue without resetting the machine.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MachineError::InvalidOpcode { .. })
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::ProgramTooLarge { len, capacity } => write!(
                f,
                "program of {len} bytes does not fit in {capacity} bytes of program memory"
            ),
            MachineError::FontTooLarge { len, capacity } => write!(
                f,
                "font of {len} bytes does not fit in {capacity} bytes of reserved memory"
            ),
            MachineError::StackUnderflow { address } => {
                write!(f, "return with empty call stack at {address:#05X}")
            }
            MachineError::InvalidOpcode { opcode, address } => {
                write!(f, "invalid opcode {opcode:04X} at {address:#05X}")
            }
            MachineError::InvalidKey(key) => write!(f, "invalid key index: {key}"),
        }
    }
}

impl std::error::Error for MachineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_decode_failures_are_recoverable() {
        assert!(MachineError::InvalidOpcode {
            opcode: 0x5121,
            address: 0x200
        }
        .is_recoverable());
        assert!(!MachineError::StackUnderflow { address: 0x200 }.is_recoverable());
        assert!(!MachineError::ProgramTooLarge {
            len: 4000,
            capacity: 3584
        }
        .is_recoverable());
    }

    #[test]
    fn test_display_names_opcode_and_address() {
        let err = MachineError::InvalidOpcode {
            opcode: 0xE0FF,
            address: 0x2A4,
        };
        assert_eq!(err.to_string(), "invalid opcode E0FF at 0x2A4");
    }
}
