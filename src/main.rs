use std::error::Error;
use std::fs::File;
use std::process::exit;

use chip8_vm::config::{Config, Timing};
use chip8_vm::display::MonoTermDisplay;
use chip8_vm::environment::Environment;
use chip8_vm::framebuffer::{CHIP8_SCREEN_HEIGHT, CHIP8_SCREEN_WIDTH};
use chip8_vm::input::TermInput;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};
use chip8_vm::Chip8Interpreter;
use clap::Parser;

fn main() {
    env_logger::init();
    let config = Config::parse();

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        eprintln!("chip8-vm: {}", e);
        exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    // open the program before touching the terminal so a bad path fails cleanly
    let mut f = File::open(&config.rom)?;

    let mut display = MonoTermDisplay::new(CHIP8_SCREEN_WIDTH, CHIP8_SCREEN_HEIGHT)?;
    let mut input = TermInput::new(config.keymap)?;
    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let interpreter = match config.seed {
        Some(seed) => Chip8Interpreter::with_seed(seed),
        None => Chip8Interpreter::new(),
    };

    let mut environment = Environment::new(
        interpreter,
        &mut display,
        &mut input,
        sound.as_mut(),
        Timing::from(config),
    );
    environment.load_program(&mut f)?;
    let cycles = environment.main_loop(config.cycles)?;
    log::info!("stopped after {} cycles", cycles);

    // hand the terminal back before writing to it
    drop(environment);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..(CHIP8_SCREEN_HEIGHT / 2) {
        println!();
    }
    Ok(())
}
