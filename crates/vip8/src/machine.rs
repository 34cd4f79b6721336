use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    Instruction, MachineConfig, MachineError, SpritePolicy, FLAG_REG, FONT_ADDRESS,
    FONT_GLYPH_SIZE, NUM_KEYS, NUM_REGS, RAM_SIZE, SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH,
    START_ADDRESS,
};

/// Result of a successful [`Machine::step`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// The instruction ran to completion.
    Executed(Instruction),
    /// `FX0A` found no key down; the same instruction runs again on the next step.
    AwaitingKey { register: u8 },
}

/// The CHIP-8 machine: memory, registers, call stack, timers, keypad and
/// display, plus the fetch-decode-execute cycle driving them.
///
/// The host owns all pacing: it calls [`Machine::step`] at the instruction
/// rate and [`Machine::tick`] at the timer rate (usually 60 Hz).
pub struct Machine {
    /// program counter
    pc: u16,
    ram: [u8; RAM_SIZE],
    /// display
    screen: [bool; SCREEN_SIZE],
    /// V Registers
    v_reg: [u8; NUM_REGS],
    /// I Register
    i_reg: u16,
    /// return addresses, most recent last
    stack: Vec<u16>,
    keys: [bool; NUM_KEYS],
    /// delay timer
    delay_timer: u8,
    /// sound timer
    sound_timer: u8,
    rng: StdRng,
    sprite_policy: SpritePolicy,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut machine = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [false; SCREEN_SIZE],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack: Vec::new(),
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            rng,
            sprite_policy: config.sprite_policy,
        };
        machine.reset();
        machine
    }

    /// Zeroes every register, memory, the stack, keys, timers and the display,
    /// then points PC at the program origin. The random generator keeps its
    /// state.
    pub fn reset(&mut self) {
        self.pc = START_ADDRESS;
        self.ram = [0; RAM_SIZE];
        self.v_reg = [0; NUM_REGS];
        self.i_reg = 0;
        self.stack.clear();
        self.keys = [false; NUM_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.clear_screen();
        log::debug!("Machine reset");
    }

    /// Copies `program` into memory at the program origin. Registers, PC and
    /// the stack are left alone; call [`Machine::reset`] first for a clean run.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MachineError> {
        let start = START_ADDRESS as usize;
        let capacity = RAM_SIZE - start;
        if program.len() > capacity {
            return Err(MachineError::ProgramTooLarge {
                len: program.len(),
                capacity,
            });
        }
        self.ram[start..start + program.len()].copy_from_slice(program);
        log::debug!("Loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    /// Writes a hex-digit font image at [`FONT_ADDRESS`], usually [`crate::FONTSET`].
    pub fn load_font(&mut self, font: &[u8]) -> Result<(), MachineError> {
        let start = FONT_ADDRESS as usize;
        let capacity = START_ADDRESS as usize - start;
        if font.len() > capacity {
            return Err(MachineError::FontTooLarge {
                len: font.len(),
                capacity,
            });
        }
        self.ram[start..start + font.len()].copy_from_slice(font);
        Ok(())
    }

    /// One timer tick: both timers count down by one and stop at zero.
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn display(&self) -> &[bool; SCREEN_SIZE] {
        &self.screen
    }

    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<(), MachineError> {
        let slot = self
            .keys
            .get_mut(key)
            .ok_or(MachineError::InvalidKey(key))?;
        *slot = pressed;
        Ok(())
    }

    pub fn is_key_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Whether the audio device should be beeping.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i_reg
    }

    /// Value of register V`index`; `index` is reduced to its low nibble.
    pub fn v(&self, index: usize) -> u8 {
        self.v_reg[index & 0xF]
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    /// Fetches, decodes and executes exactly one instruction.
    ///
    /// PC moves past the fetched word before execution. On
    /// [`MachineError::InvalidOpcode`] nothing else changes, so stepping again
    /// skips the bad word.
    pub fn step(&mut self) -> Result<StepOutcome, MachineError> {
        let address = self.pc;
        let opcode = self.fetch_opcode();
        let Some(instruction) = Instruction::decode(opcode) else {
            log::warn!("Invalid opcode {:04X} at {:#05X}", opcode, address);
            return Err(MachineError::InvalidOpcode { opcode, address });
        };
        log::trace!("{:#05X}: {:04X} {:?}", address, opcode, instruction);
        self.execute(instruction, address)
    }

    fn fetch_opcode(&mut self) -> u16 {
        let hi = self.read(self.pc) as u16;
        let lo = self.read(self.pc.wrapping_add(1)) as u16;
        self.pc = self.pc.wrapping_add(2);
        hi << 8 | lo
    }

    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize % RAM_SIZE]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize % RAM_SIZE] = val;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn clear_screen(&mut self) {
        self.screen = [false; SCREEN_SIZE];
    }

    /// Writes the flag first and the destination second, so when `x` is VF the
    /// result of the operation is what remains.
    fn set_with_flag(&mut self, x: u8, val: u8, flag: bool) {
        self.v_reg[FLAG_REG] = flag as u8;
        self.v_reg[x as usize] = val;
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        address: u16,
    ) -> Result<StepOutcome, MachineError> {
        match instruction {
            Instruction::Sys(_) => {}
            Instruction::ClearScreen => self.clear_screen(),
            Instruction::Return => {
                self.pc = self
                    .stack
                    .pop()
                    .ok_or(MachineError::StackUnderflow { address })?;
            }
            Instruction::Jump(nnn) => self.pc = nnn,
            Instruction::Call(nnn) => {
                self.stack.push(self.pc);
                self.pc = nnn;
            }
            Instruction::SkipIfEqual { x, nn } => self.skip_if(self.v_reg[x as usize] == nn),
            Instruction::SkipIfNotEqual { x, nn } => self.skip_if(self.v_reg[x as usize] != nn),
            Instruction::SkipIfRegsEqual { x, y } => {
                self.skip_if(self.v_reg[x as usize] == self.v_reg[y as usize])
            }
            Instruction::Load { x, nn } => self.v_reg[x as usize] = nn,
            Instruction::AddImmediate { x, nn } => {
                self.v_reg[x as usize] = self.v_reg[x as usize].wrapping_add(nn)
            }
            Instruction::Move { x, y } => self.v_reg[x as usize] = self.v_reg[y as usize],
            Instruction::Or { x, y } => self.v_reg[x as usize] |= self.v_reg[y as usize],
            Instruction::And { x, y } => self.v_reg[x as usize] &= self.v_reg[y as usize],
            Instruction::Xor { x, y } => self.v_reg[x as usize] ^= self.v_reg[y as usize],
            Instruction::Add { x, y } => {
                let (val, carry) = self.v_reg[x as usize].overflowing_add(self.v_reg[y as usize]);
                self.set_with_flag(x, val, carry);
            }
            Instruction::Sub { x, y } => {
                let (val, borrow) = self.v_reg[x as usize].overflowing_sub(self.v_reg[y as usize]);
                self.set_with_flag(x, val, !borrow);
            }
            Instruction::ShiftRight { x, y } => {
                let vy = self.v_reg[y as usize];
                self.set_with_flag(x, vy >> 1, vy & 0x1 == 1);
            }
            Instruction::SubReverse { x, y } => {
                let (val, borrow) = self.v_reg[y as usize].overflowing_sub(self.v_reg[x as usize]);
                self.set_with_flag(x, val, !borrow);
            }
            Instruction::ShiftLeft { x, y } => {
                let vy = self.v_reg[y as usize];
                self.set_with_flag(x, vy << 1, vy & 0x80 != 0);
            }
            Instruction::SkipIfRegsNotEqual { x, y } => {
                self.skip_if(self.v_reg[x as usize] != self.v_reg[y as usize])
            }
            Instruction::LoadIndex(nnn) => self.i_reg = nnn,
            Instruction::JumpOffset(nnn) => self.pc = nnn + self.v_reg[0] as u16,
            Instruction::Random { x, nn } => {
                let rand: u8 = self.rng.gen();
                self.v_reg[x as usize] = rand & nn;
            }
            Instruction::Draw { x, y, n } => {
                let x_coord = self.v_reg[x as usize] as usize % SCREEN_WIDTH;
                let y_coord = self.v_reg[y as usize] as usize % SCREEN_HEIGHT;
                self.draw_sprite(x_coord, y_coord, n as usize);
            }
            Instruction::SkipIfKeyPressed { x } => {
                let key = (self.v_reg[x as usize] & 0xF) as usize;
                self.skip_if(self.keys[key]);
            }
            Instruction::SkipIfKeyNotPressed { x } => {
                let key = (self.v_reg[x as usize] & 0xF) as usize;
                self.skip_if(!self.keys[key]);
            }
            Instruction::LoadDelayTimer { x } => self.v_reg[x as usize] = self.delay_timer,
            Instruction::WaitForKey { x } => match self.keys.iter().rposition(|&down| down) {
                Some(key) => self.v_reg[x as usize] = key as u8,
                None => {
                    // Rewind so the host's next step retries this instruction.
                    self.pc = address;
                    return Ok(StepOutcome::AwaitingKey { register: x });
                }
            },
            Instruction::SetDelayTimer { x } => self.delay_timer = self.v_reg[x as usize],
            Instruction::SetSoundTimer { x } => self.sound_timer = self.v_reg[x as usize],
            Instruction::AddIndex { x } => {
                self.i_reg = self.i_reg.wrapping_add(self.v_reg[x as usize] as u16)
            }
            Instruction::LoadGlyph { x } => {
                let digit = (self.v_reg[x as usize] & 0xF) as u16;
                self.i_reg = FONT_ADDRESS + digit * FONT_GLYPH_SIZE as u16;
            }
            Instruction::StoreBcd { x } => {
                let val = self.v_reg[x as usize];
                let i = self.i_reg;
                self.write(i, val / 100);
                self.write(i.wrapping_add(1), (val / 10) % 10);
                self.write(i.wrapping_add(2), val % 10);
            }
            Instruction::StoreRegisters { x } => {
                for offset in 0..=x as u16 {
                    self.write(self.i_reg.wrapping_add(offset), self.v_reg[offset as usize]);
                }
                self.i_reg = self.i_reg.wrapping_add(x as u16 + 1);
            }
            Instruction::LoadRegisters { x } => {
                for offset in 0..=x as u16 {
                    self.v_reg[offset as usize] = self.read(self.i_reg.wrapping_add(offset));
                }
                self.i_reg = self.i_reg.wrapping_add(x as u16 + 1);
            }
        }
        Ok(StepOutcome::Executed(instruction))
    }

    /// XORs an 8-pixel-wide, `height`-row sprite read from I onto the screen.
    /// VF ends up 1 when any set sprite pixel lands on an already-set pixel.
    fn draw_sprite(&mut self, x_coord: usize, y_coord: usize, height: usize) {
        let mut collision = false;
        for row in 0..height {
            let pixels = self.read(self.i_reg.wrapping_add(row as u16));
            for col in 0..8 {
                if (pixels >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let Some(index) = self.screen_index(x_coord + col, y_coord + row) else {
                    continue;
                };
                let screen_pixel = &mut self.screen[index];
                collision |= *screen_pixel;
                *screen_pixel ^= true;
            }
        }
        self.v_reg[FLAG_REG] = collision as u8;
    }

    /// Maps sprite-space coordinates to a screen index, or `None` when the
    /// pixel is clipped.
    fn screen_index(&self, x: usize, y: usize) -> Option<usize> {
        let (x, y) = match self.sprite_policy {
            SpritePolicy::Wrap => (x % SCREEN_WIDTH, y % SCREEN_HEIGHT),
            SpritePolicy::Clip => (x, y),
        };
        (x < SCREEN_WIDTH && y < SCREEN_HEIGHT).then_some(x + y * SCREEN_WIDTH)
    }
}
