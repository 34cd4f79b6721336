/// # Opcodes
///
/// Instruction words are 16 bits, fetched big-endian. The top nibble picks the
/// family; families `0x0`, `0x8`, `0xE` and `0xF` use the low nibble or low
/// byte to pick the operation. The remaining nibbles carry operands:
/// - `[_x__]` register Vx, or the last register of the range V0..=Vx
/// - `[__y_]` register Vy
/// - `[___n]` sprite height
/// - `[__nn]` immediate byte
/// - `[_nnn]` 12-bit address
pub trait Opcode {
    /// `[f___]`
    fn family(&self) -> u8;
    /// `[_x__]`
    fn x(&self) -> u8;
    /// `[__y_]`
    fn y(&self) -> u8;
    /// `[___n]`
    fn n(&self) -> u8;
    /// `[__nn]`
    fn nn(&self) -> u8;
    /// `[_nnn]`
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn family(&self) -> u8 {
        ((self & 0xF000) >> 12) as u8
    }

    fn x(&self) -> u8 {
        ((self & 0x0F00) >> 8) as u8
    }

    fn y(&self) -> u8 {
        ((self & 0x00F0) >> 4) as u8
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn nn(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}

/// A decoded operation with its operands. Register operands are always
/// indices in `0..=15`, never register values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Instruction {
    /// 0NNN - legacy machine-code call, ignored
    Sys(u16),
    /// 00E0 - CLS
    ClearScreen,
    /// 00EE - RET
    Return,
    /// 1NNN - JP addr
    Jump(u16),
    /// 2NNN - CALL addr
    Call(u16),
    /// 3XNN - SE Vx, byte
    SkipIfEqual { x: u8, nn: u8 },
    /// 4XNN - SNE Vx, byte
    SkipIfNotEqual { x: u8, nn: u8 },
    /// 5XY0 - SE Vx, Vy
    SkipIfRegsEqual { x: u8, y: u8 },
    /// 6XNN - LD Vx, byte
    Load { x: u8, nn: u8 },
    /// 7XNN - ADD Vx, byte (no carry)
    AddImmediate { x: u8, nn: u8 },
    /// 8XY0 - LD Vx, Vy
    Move { x: u8, y: u8 },
    /// 8XY1 - OR Vx, Vy
    Or { x: u8, y: u8 },
    /// 8XY2 - AND Vx, Vy
    And { x: u8, y: u8 },
    /// 8XY3 - XOR Vx, Vy
    Xor { x: u8, y: u8 },
    /// 8XY4 - ADD Vx, Vy, VF = carry
    Add { x: u8, y: u8 },
    /// 8XY5 - SUB Vx, Vy, VF = !borrow
    Sub { x: u8, y: u8 },
    /// 8XY6 - SHR Vx, Vy, VF = lsb of Vy
    ShiftRight { x: u8, y: u8 },
    /// 8XY7 - SUBN Vx, Vy, VF = !borrow
    SubReverse { x: u8, y: u8 },
    /// 8XYE - SHL Vx, Vy, VF = msb of Vy
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0 - SNE Vx, Vy
    SkipIfRegsNotEqual { x: u8, y: u8 },
    /// ANNN - LD I, addr
    LoadIndex(u16),
    /// BNNN - JP V0, addr
    JumpOffset(u16),
    /// CXNN - RND Vx, byte
    Random { x: u8, nn: u8 },
    /// DXYN - DRW Vx, Vy, n
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E - SKP Vx
    SkipIfKeyPressed { x: u8 },
    /// EXA1 - SKNP Vx
    SkipIfKeyNotPressed { x: u8 },
    /// FX07 - LD Vx, DT
    LoadDelayTimer { x: u8 },
    /// FX0A - LD Vx, K
    WaitForKey { x: u8 },
    /// FX15 - LD DT, Vx
    SetDelayTimer { x: u8 },
    /// FX18 - LD ST, Vx
    SetSoundTimer { x: u8 },
    /// FX1E - ADD I, Vx
    AddIndex { x: u8 },
    /// FX29 - LD F, Vx
    LoadGlyph { x: u8 },
    /// FX33 - LD B, Vx
    StoreBcd { x: u8 },
    /// FX55 - LD [I], Vx
    StoreRegisters { x: u8 },
    /// FX65 - LD Vx, [I]
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// Maps an instruction word to exactly one operation, or `None` when the
    /// word is not part of the instruction set. Every family that inspects a
    /// sub-selector ends in its own catch-all, so an unknown sub-selector can
    /// never reach a sibling family.
    pub fn decode(op: u16) -> Option<Instruction> {
        let (x, y, n, nn, nnn) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        let instruction = match op.family() {
            0x0 => match op {
                0x00E0 => Instruction::ClearScreen,
                0x00EE => Instruction::Return,
                _ => Instruction::Sys(nnn),
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipIfEqual { x, nn },
            0x4 => Instruction::SkipIfNotEqual { x, nn },
            0x5 => match n {
                0x0 => Instruction::SkipIfRegsEqual { x, y },
                _ => return None,
            },
            0x6 => Instruction::Load { x, nn },
            0x7 => Instruction::AddImmediate { x, nn },
            0x8 => match n {
                0x0 => Instruction::Move { x, y },
                0x1 => Instruction::Or { x, y },
                0x2 => Instruction::And { x, y },
                0x3 => Instruction::Xor { x, y },
                0x4 => Instruction::Add { x, y },
                0x5 => Instruction::Sub { x, y },
                0x6 => Instruction::ShiftRight { x, y },
                0x7 => Instruction::SubReverse { x, y },
                0xE => Instruction::ShiftLeft { x, y },
                _ => return None,
            },
            0x9 => match n {
                0x0 => Instruction::SkipIfRegsNotEqual { x, y },
                _ => return None,
            },
            0xA => Instruction::LoadIndex(nnn),
            0xB => Instruction::JumpOffset(nnn),
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::SkipIfKeyPressed { x },
                0xA1 => Instruction::SkipIfKeyNotPressed { x },
                _ => return None,
            },
            0xF => match nn {
                0x07 => Instruction::LoadDelayTimer { x },
                0x0A => Instruction::WaitForKey { x },
                0x15 => Instruction::SetDelayTimer { x },
                0x18 => Instruction::SetSoundTimer { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::LoadGlyph { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_fields() {
        let op: u16 = 0xABCD;
        assert_eq!(op.family(), 0xA);
        assert_eq!(op.x(), 0xB);
        assert_eq!(op.y(), 0xC);
        assert_eq!(op.n(), 0xD);
        assert_eq!(op.nn(), 0xCD);
        assert_eq!(op.nnn(), 0x0BCD);
    }

    #[test]
    fn test_decode_system_family() {
        assert_eq!(Instruction::decode(0x00E0), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(0x00EE), Some(Instruction::Return));
        assert_eq!(Instruction::decode(0x0123), Some(Instruction::Sys(0x123)));
        assert_eq!(Instruction::decode(0x0000), Some(Instruction::Sys(0)));
    }

    #[test]
    fn test_decode_alu_family() {
        assert_eq!(
            Instruction::decode(0x8AB1),
            Some(Instruction::Or { x: 0xA, y: 0xB })
        );
        assert_eq!(
            Instruction::decode(0x8F0E),
            Some(Instruction::ShiftLeft { x: 0xF, y: 0x0 })
        );
        for n in [0x8, 0x9, 0xA, 0xB, 0xC, 0xD, 0xF] {
            assert_eq!(Instruction::decode(0x8120 | n), None, "8XY{n:X}");
        }
    }

    #[test]
    fn test_decode_key_skips_are_distinct() {
        assert_eq!(
            Instruction::decode(0xE39E),
            Some(Instruction::SkipIfKeyPressed { x: 3 })
        );
        assert_eq!(
            Instruction::decode(0xE3A1),
            Some(Instruction::SkipIfKeyNotPressed { x: 3 })
        );
    }

    #[test]
    fn test_unknown_sub_selector_does_not_fall_through() {
        // An unmatched 0xE/0xF selector must not decode as a neighbouring family.
        assert_eq!(Instruction::decode(0xE1FF), None);
        assert_eq!(Instruction::decode(0xF1FF), None);
        assert_eq!(Instruction::decode(0x5121), None);
        assert_eq!(Instruction::decode(0x912F), None);
    }

    #[test]
    fn test_decode_timer_and_memory_family() {
        let cases = [
            (0xF207, Instruction::LoadDelayTimer { x: 2 }),
            (0xF20A, Instruction::WaitForKey { x: 2 }),
            (0xF215, Instruction::SetDelayTimer { x: 2 }),
            (0xF218, Instruction::SetSoundTimer { x: 2 }),
            (0xF21E, Instruction::AddIndex { x: 2 }),
            (0xF229, Instruction::LoadGlyph { x: 2 }),
            (0xF233, Instruction::StoreBcd { x: 2 }),
            (0xF255, Instruction::StoreRegisters { x: 2 }),
            (0xF265, Instruction::LoadRegisters { x: 2 }),
        ];
        for (op, expected) in cases {
            assert_eq!(Instruction::decode(op), Some(expected), "{op:04X}");
        }
    }

    #[test]
    fn test_decode_draw() {
        assert_eq!(
            Instruction::decode(0xD125),
            Some(Instruction::Draw { x: 1, y: 2, n: 5 })
        );
    }
}
