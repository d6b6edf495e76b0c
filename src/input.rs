use crate::error::Chip8Error;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// number of keys on the hex keypad
pub const CHIP8_KEY_COUNT: usize = 16;

/// The hex keypad as the machine sees it. Keys go down when the driver says
/// so and all come back up at the end of every instruction cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keypad {
    pressed: [bool; CHIP8_KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    pub fn set_pressed(&mut self, key: u8) -> Result<(), Chip8Error> {
        let slot = self
            .pressed
            .get_mut(key as usize)
            .ok_or(Chip8Error::InvalidKey(key))?;
        *slot = true;
        Ok(())
    }

    /// anything off the keypad reads as not pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed.get(key as usize).copied().unwrap_or(false)
    }

    pub fn clear_all(&mut self) {
        self.pressed = [false; CHIP8_KEY_COUNT];
    }
}

/// map of characters read from the keyboard to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// which host keys stand in for the hex keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Keymap {
    /// 1234 / qwer / asdf / zxcv
    #[default]
    Conventional,
    /// 0-9 and a-f
    Literal,
}

impl Keymap {
    pub fn to_map(self) -> HashMap<char, u8> {
        match self {
            Keymap::Conventional => HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            Keymap::Literal => HashMap::from(CHIP8_LITERAL_KEYMAP),
        }
    }
}

/// reads keypresses
pub trait Input {
    /// get a list of all the mapped keys that have been pressed recently,
    /// without flushing them from the buffer
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// flush all the keypresses from the buffer
    fn flush_keys(&mut self) -> Result<(), io::Error>;

    /// block until a mapped key is pressed; None means the user asked to quit
    /// while we were waiting
    fn wait_key(&mut self) -> Result<Option<u8>, io::Error>;

    /// has the user asked to stop the machine
    fn quit_requested(&self) -> bool;
}

/// what a single terminal event means to us
#[derive(Debug, PartialEq, Eq)]
enum Keypress {
    Mapped(u8),
    Quit,
    Unmapped,
}

/// Input from the terminal, read with crossterm in raw mode
pub struct TermInput {
    buffer: Vec<u8>,
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl TermInput {
    pub fn new(keymap: Keymap) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            buffer: Vec::new(),
            keymap: keymap.to_map(),
            quit: false,
        })
    }

    fn classify(&self, event: Event) -> Keypress {
        match event {
            Event::Key(KeyEvent { code, modifiers, .. }) => match code {
                // raw mode swallows ^C so handle it ourselves
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Keypress::Quit,
                KeyCode::Esc => Keypress::Quit,
                KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                    Some(mapped_key) => Keypress::Mapped(*mapped_key),
                    None => {
                        log::debug!("can't map {:?} to a keypad key", key);
                        Keypress::Unmapped
                    }
                },
                _ => Keypress::Unmapped,
            },
            _ => Keypress::Unmapped,
        }
    }

    fn read_terminal(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match self.classify(read()?) {
                Keypress::Mapped(key) => self.buffer.push(key),
                Keypress::Quit => self.quit = true,
                Keypress::Unmapped => {}
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("couldn't restore the terminal: {}", e);
        }
    }
}

impl Input for TermInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_terminal()?;
        Ok(self.buffer.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        // only what peek_keys handed out; anything newer waits for the next peek
        self.buffer.clear();
        Ok(())
    }

    fn wait_key(&mut self) -> Result<Option<u8>, io::Error> {
        while !self.quit {
            match self.classify(read()?) {
                Keypress::Mapped(key) => return Ok(Some(key)),
                Keypress::Quit => self.quit = true,
                Keypress::Unmapped => {}
            }
        }
        Ok(None)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing: `keys` are reported as pressed
/// until the first flush, `waits` answer wait_key one at a time
pub struct DummyInput {
    bytes: Vec<u8>,
    waits: VecDeque<u8>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            bytes: Vec::from(keys),
            waits: VecDeque::new(),
        }
    }

    pub fn with_waits(keys: &[u8], waits: &[u8]) -> Self {
        DummyInput {
            bytes: Vec::from(keys),
            waits: waits.iter().copied().collect(),
        }
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        Ok(self.bytes.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.bytes.clear();
        Ok(())
    }

    fn wait_key(&mut self) -> Result<Option<u8>, io::Error> {
        Ok(self.waits.pop_front())
    }

    fn quit_requested(&self) -> bool {
        false
    }
}
