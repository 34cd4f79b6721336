use std::path::Path;

use anyhow::{Context, Result};
use vip8::{Machine, MachineConfig, StepOutcome, FONTSET};

/// Host-side pacing and seeding for a headless run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Upper bound on executed steps.
    pub cycles: u64,
    /// Steps between two timer ticks; 10 steps per tick is roughly 600 Hz
    /// against a 60 Hz timer.
    pub steps_per_tick: u64,
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cycles: 10_000,
            steps_per_tick: 10,
            seed: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// The cycle budget ran out.
    CycleLimit,
    /// `FX0A` is waiting and a headless host never presses keys.
    AwaitingKey,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub ticks: u64,
    pub skipped: u64,
    pub halt: Halt,
}

pub fn load_rom(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).with_context(|| format!("Failed to read ROM file '{}'", path.display()))
}

/// Builds a machine with the built-in font and `rom` loaded at the program origin.
pub fn boot(rom: &[u8], options: &RunOptions) -> Result<Machine> {
    let config = match options.seed {
        Some(seed) => MachineConfig::builder().seed(seed).build(),
        None => MachineConfig::default(),
    };
    let mut machine = Machine::new(config);
    machine.load_font(&FONTSET)?;
    machine
        .load_program(rom)
        .context("ROM does not fit in program memory")?;
    Ok(machine)
}

/// Steps the machine until the cycle budget runs out or it stalls on input.
/// Invalid opcodes are logged and skipped; any other fault ends the run.
pub fn run(machine: &mut Machine, options: &RunOptions) -> Result<RunSummary> {
    let steps_per_tick = options.steps_per_tick.max(1);
    let mut summary = RunSummary {
        steps: 0,
        ticks: 0,
        skipped: 0,
        halt: Halt::CycleLimit,
    };

    while summary.steps < options.cycles {
        match machine.step() {
            Ok(StepOutcome::Executed(_)) => {}
            Ok(StepOutcome::AwaitingKey { register }) => {
                log::info!("Program waits for a key into V{:X}, stopping", register);
                summary.halt = Halt::AwaitingKey;
                break;
            }
            Err(err) if err.is_recoverable() => {
                log::warn!("Skipping: {}", err);
                summary.skipped += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Halted after {} steps", summary.steps))
            }
        }
        summary.steps += 1;
        if summary.steps % steps_per_tick == 0 {
            machine.tick();
            summary.ticks += 1;
        }
    }
    Ok(summary)
}
