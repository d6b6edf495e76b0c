//! # chip8-vm
//!
//! ## Design
//!
//! * one instruction per step; no attempt at COSMAC VIP cycle timing
//! * the interpreter owns all machine state and never touches a device, so it
//!   can be stepped from tests exactly as from the terminal
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * instructions run as fast as the environment lets them, then it sleeps
//!
//! Pieces:
//!
//! * memory map
//!    - 4K of RAM with the hex font at 0x000 and programs at 0x200
//!    - anything outside 4K is an error rather than a wrap
//! * instruction set
//!    - decoded from the 16-bit word into an enum the interpreter matches on
//! * the interpreter itself
//!    - pub .step() -- one fetch/decode/execute
//!    - simple state machine: Running, or AwaitingKey after LD Vx, K; whilst
//!      waiting .step() does nothing until .deliver_key()
//!    - keypad is released at the end of every step
//! * some config (CLI flags for pacing, keymap, sound, RNG seed)
//! * the environment
//!    - sets everything up; runs the main loop
//!    - counts the timers down at 60Hz, independent of instruction rate
//! * display, with trait for rendering
//! * input device, with trait for reading key-presses
//! * audio device, with trait for making beeps
//!
//! Model
//!
//! ```text
//! Environment
//!  |-- display, input, sound, timing(config)
//!  |-- interpreter
//!  |    |-- memory, registers, framebuffer, keypad, rng
//!  |    `-- instruction set
//!  `-- main loop
//!       |-- forward keys; interpreter.step()
//!       |-- if it drew: display.draw(framebuffer)
//!       |-- if AwaitingKey: block on input.wait_key(); interpreter.deliver_key()
//!       |-- tick timers for however many 1/60s have passed; beep if ST > 0
//!       `-- sleep(cycle interval)
//! ```
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;

pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, MachineState, Step};
