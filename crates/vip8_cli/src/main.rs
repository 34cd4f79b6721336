use anyhow::{Context, Result};
use vip8_cli::{Halt, RunOptions};

const USAGE: &str = "Usage: vip8 <rom-path> [cycles] [steps-per-tick] [seed]";

fn parse_arg(arg: Option<String>, name: &str, default: u64) -> Result<u64> {
    match arg {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid {} '{}'", name, value)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(rom_path) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };
    let defaults = RunOptions::default();
    let options = RunOptions {
        cycles: parse_arg(args.next(), "cycle count", defaults.cycles)?,
        steps_per_tick: parse_arg(args.next(), "steps per tick", defaults.steps_per_tick)?,
        seed: args
            .next()
            .map(|seed| parse_arg(Some(seed), "seed", 0))
            .transpose()?,
    };

    log::info!("Running ROM path: '{}'", rom_path);
    let rom = vip8_cli::load_rom(&rom_path)?;
    let mut machine = vip8_cli::boot(&rom, &options)?;
    let summary = vip8_cli::run(&mut machine, &options)?;

    let halt = match summary.halt {
        Halt::CycleLimit => "cycle limit reached",
        Halt::AwaitingKey => "waiting for key input",
    };
    println!(
        "{} after {} steps ({} ticks, {} skipped)",
        halt, summary.steps, summary.ticks, summary.skipped
    );
    println!(
        "pc={:#05X} i={:#05X} v={:02X?}",
        machine.pc(),
        machine.i(),
        machine.registers()
    );
    Ok(())
}
