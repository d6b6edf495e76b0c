//! The environment wires the interpreter to a display, an input and a sound
//! device and runs the main loop: step, render on draw, block for LD Vx, K,
//! count the timers down and pace everything with spin_sleep.

use crate::config::Timing;
use crate::display::Display;
use crate::input::Input;
use crate::interpreter::{Chip8Interpreter, MachineState};
use crate::sound::Sound;
use std::error::Error;
use std::io;
use std::time::Instant;

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    timing: Timing,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        timing: Timing,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            timing,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Box<dyn Error>> {
        Ok(self.interpreter.load_program(reader)?)
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// Run until the user quits, `limit` cycles have gone by, or the program
    /// does something fatal. Returns the number of cycles run.
    pub fn main_loop(&mut self, limit: Option<u64>) -> Result<u64, Box<dyn Error>> {
        let mut cycles = 0;
        let mut last_tick = Instant::now();
        self.render()?;

        while limit.map_or(true, |limit| cycles < limit) {
            if self.input.quit_requested() {
                log::info!("quit requested after {} cycles", cycles);
                break;
            }
            if !self.cycle()? {
                break;
            }
            cycles += 1;

            // catch the timers up with the wall clock; this can be more than
            // one tick if we were blocked waiting for a key
            while last_tick.elapsed() >= self.timing.timer_interval {
                self.interpreter.tick_timers();
                last_tick += self.timing.timer_interval;
            }
            self.sound.follow_timer(self.interpreter.sound_active())?;

            spin_sleep::sleep(self.timing.cycle_interval);
        }

        self.sound.follow_timer(false)?;
        Ok(cycles)
    }

    /// one instruction cycle; false if the input went away while we were
    /// waiting for a key
    fn cycle(&mut self) -> Result<bool, Box<dyn Error>> {
        for key in self.input.peek_keys()? {
            self.interpreter.press_key(*key)?;
        }
        self.input.flush_keys()?;

        if self.interpreter.step()?.drew() {
            self.render()?;
        }

        if let MachineState::AwaitingKey { register } = self.interpreter.state() {
            log::debug!("waiting for a key for V{:X}", register);
            match self.input.wait_key()? {
                Some(key) => {
                    self.interpreter.deliver_key(key)?;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn render(&mut self) -> Result<(), io::Error> {
        self.display.draw(self.interpreter.framebuffer().pixels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::error::Chip8Error;
    use crate::input::DummyInput;
    use crate::sound::Mute;
    use std::time::Duration;

    fn fast() -> Timing {
        Timing {
            cycle_interval: Duration::ZERO,
            timer_interval: Duration::from_secs(3600),
        }
    }

    fn run(
        prog: &[u8],
        input: &mut DummyInput,
        display: &mut DummyDisplay,
        sound: &mut Mute,
        limit: u64,
    ) -> Result<(u64, Chip8Interpreter), Box<dyn Error>> {
        let mut env = Environment::new(Chip8Interpreter::with_seed(1), display, input, sound, fast());
        let mut src: &[u8] = prog;
        env.load_program(&mut src)?;
        let cycles = env.main_loop(Some(limit))?;
        Ok((cycles, env.interpreter))
    }

    #[test]
    fn test_renders_at_start_and_on_draw() {
        let mut display = DummyDisplay::new();
        // CLS; DRW V0, V0, 5; JP 204
        let prog = [0x00, 0xe0, 0xd0, 0x05, 0x12, 0x04];
        let (cycles, m) = run(&prog, &mut DummyInput::new(&[]), &mut display, &mut Mute::new(), 10).unwrap();
        assert_eq!(cycles, 10);
        assert_eq!(display.frames, 2);
        assert_eq!(display.last_frame, m.framebuffer().pixels());
    }

    #[test]
    fn test_keys_forwarded_for_one_cycle() {
        // V0 = 7; SKP V0 -- the key is only down for the first cycle
        let prog = [0x60, 0x07, 0xe0, 0x9e];
        let (_, m) = run(&prog, &mut DummyInput::new(&[7]), &mut DummyDisplay::new(), &mut Mute::new(), 2).unwrap();
        assert_eq!(m.registers().pc, 0x204);

        // SKP V0 with V0 = 0 sees key 0 on the very first cycle
        let prog = [0xe0, 0x9e];
        let (_, m) = run(&prog, &mut DummyInput::new(&[0]), &mut DummyDisplay::new(), &mut Mute::new(), 1).unwrap();
        assert_eq!(m.registers().pc, 0x204);
    }

    #[test]
    fn test_wait_key_delivers() {
        // LD V5, K; JP 202
        let prog = [0xf5, 0x0a, 0x12, 0x02];
        let mut input = DummyInput::with_waits(&[], &[0xc]);
        let (cycles, m) = run(&prog, &mut input, &mut DummyDisplay::new(), &mut Mute::new(), 3).unwrap();
        assert_eq!(cycles, 3);
        assert_eq!(m.registers().v(5), 0xc);
        assert_eq!(m.state(), MachineState::Running);
    }

    #[test]
    fn test_wait_key_without_input_stops() {
        let prog = [0xf5, 0x0a];
        let (cycles, m) = run(&prog, &mut DummyInput::new(&[]), &mut DummyDisplay::new(), &mut Mute::new(), 5).unwrap();
        assert_eq!(cycles, 0);
        assert_eq!(m.state(), MachineState::AwaitingKey { register: 5 });
    }

    #[test]
    fn test_unknown_instruction_stops_the_loop() {
        let prog = [0x60, 0x01, 0x0a, 0xbc];
        let err = run(&prog, &mut DummyInput::new(&[]), &mut DummyDisplay::new(), &mut Mute::new(), 5)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<Chip8Error>(),
            Some(Chip8Error::UnknownInstruction { opcode: 0x0abc, pc: 0x202 })
        ));
    }

    #[test]
    fn test_timers_tick_and_beep() {
        // V0 = 16; LD ST, V0; JP 204
        let prog = [0x60, 0x10, 0xf0, 0x18, 0x12, 0x04];
        let mut sound = Mute::new();
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let timing = Timing {
            cycle_interval: Duration::from_millis(1),
            timer_interval: Duration::from_millis(1),
        };
        let mut env = Environment::new(Chip8Interpreter::with_seed(1), &mut display, &mut input, &mut sound, timing);
        let mut src: &[u8] = &prog;
        env.load_program(&mut src).unwrap();
        env.main_loop(Some(60)).unwrap();
        assert_eq!(env.interpreter().registers().sound_timer, 0);
        drop(env);
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
    }
}
