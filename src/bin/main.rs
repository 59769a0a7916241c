//! Command line front end: load a hex program, poke some values, then step
//! or run it and dump the machine.

use std::path::PathBuf;
use std::{fs, process};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use emulator::config::Config;
use emulator::patch::{parse_byte, Patch};
use emulator::region::Chunk;
use emulator::vm::{Error, LastWrite, Vm};

#[derive(Parser, Debug)]
#[command(name = "main", version, about = "Run a program on the 16 register teaching machine")]
struct Cli {
  /// Program image: whitespace separated hex bytes, `#` comments.
  program: PathBuf,

  /// Load address of the program (hex).
  #[arg(long, default_value = "00", value_parser = byte)]
  origin: u8,

  /// Start execution here instead of the configured start pc (hex).
  #[arg(long, value_parser = byte)]
  pc: Option<u8>,

  /// JSON configuration file.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Assignments applied after loading, e.g. `r3=1f` or `m80=ff`.
  #[arg(long = "set", value_parser = patch)]
  patches: Vec<Patch>,

  /// Single-step this many instructions instead of running to halt.
  #[arg(long)]
  steps: Option<usize>,

  /// Log every executed instruction.
  #[arg(long)]
  trace: bool,

  /// Write the final machine state here as JSON.
  #[arg(long)]
  snapshot: Option<PathBuf>,
}

fn byte(text: &str) -> Result<u8, Error> {
  parse_byte(text)
}

fn patch(text: &str) -> Result<Patch, Error> {
  text.parse()
}

fn main() {
  let cli = Cli::parse();
  let config = match &cli.config {
    Some(path) => match fs::read_to_string(path)
      .map_err(|e| e.to_string())
      .and_then(|text| Config::from_json(&text).map_err(|e| e.to_string()))
    {
      Ok(config) => config,
      Err(e) => {
        eprintln!("error: {}: {e}", path.display());
        process::exit(2);
      }
    },
    None => Config::default(),
  };

  let level = if cli.trace || config.trace { "trace" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
    .with_writer(std::io::stderr)
    .init();

  let text = match fs::read_to_string(&cli.program) {
    Ok(text) => text,
    Err(e) => {
      eprintln!("error: {}: {e}", cli.program.display());
      process::exit(2);
    }
  };

  if let Err(e) = session(&cli, &config, &text) {
    eprintln!("error: {e}");
    process::exit(1);
  }
}

fn session(cli: &Cli, config: &Config, text: &str) -> Result<(), Error> {
  let chunk = text.parse::<Chunk>()?.at(cli.origin);
  let mut vm = Vm::with_config(config);
  vm.load(&chunk)?;
  if let Some(pc) = cli.pc {
    vm.set_pc(pc);
  }
  for patch in &cli.patches {
    vm.apply(patch)?;
  }

  let outcome = match cli.steps {
    Some(steps) => single_step(&mut vm, steps),
    None => vm.run(config.step_limit).map(|executed| {
      println!("halted after {executed} instructions");
    }),
  };

  dump(&vm);
  if let Some(path) = &cli.snapshot {
    vm.snapshot().save(path)?;
  }
  outcome
}

fn single_step(vm: &mut Vm, steps: usize) -> Result<(), Error> {
  for _ in 0..steps {
    let pc = vm.pc();
    let instruction = vm.step()?;
    let written = match vm.last_write() {
      LastWrite::None => String::from("-"),
      LastWrite::Register(index) => format!("r{index:X}"),
      LastWrite::Memory(address) => format!("m{address:02X}"),
    };
    let name = instruction
      .opcode()
      .map_or_else(|| String::from("undefined"), |op| format!("{op:?}"));
    println!("{pc:02X}: {name:<13} {instruction:?} -> {written}");
    if vm.is_halted() {
      break;
    }
  }
  Ok(())
}

fn dump(vm: &Vm) {
  println!("pc={:02X} halted={} retired={}", vm.pc(), vm.is_halted(), vm.retired());
  for (index, value) in vm.registers().iter().enumerate() {
    print!("r{index:X}={value:02X} ");
    if index % 8 == 7 {
      println!();
    }
  }
  for (address, value) in vm.memory().iter().enumerate() {
    if *value != 0 {
      println!("m{address:02X}={value:02X}");
    }
  }
}
