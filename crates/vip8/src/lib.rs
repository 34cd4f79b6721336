mod config;
mod error;
mod font;
mod instruction;
mod machine;

pub use config::{MachineConfig, SpritePolicy};
pub use error::MachineError;
pub use font::{FONTSET, FONTSET_SIZE, FONT_ADDRESS, FONT_GLYPH_SIZE};
pub use instruction::{Instruction, Opcode};
pub use machine::{Machine, StepOutcome};

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 64;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Total addressable memory (4 KiB).
pub const RAM_SIZE: usize = 4096;
pub const NUM_REGS: usize = 16;
pub const NUM_KEYS: usize = 16;
/// Programs are loaded here; everything below is reserved for the font.
pub const START_ADDRESS: u16 = 0x200;

/// Index of the flag register VF.
pub const FLAG_REG: usize = 0xF;
