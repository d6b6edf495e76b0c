use crate::input::Keymap;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Run a CHIP-8 program in the terminal
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// program image to load at 0x200
    pub rom: PathBuf,

    /// microseconds to sleep between instructions
    #[arg(long, default_value_t = 2000)]
    pub cycle_us: u64,

    /// how often the delay and sound timers count down
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub timer_hz: u32,

    /// stop after this many instruction cycles
    #[arg(long)]
    pub cycles: Option<u64>,

    /// which host keys stand in for the hex keypad
    #[arg(long, value_enum, default_value_t = Keymap::Conventional)]
    pub keymap: Keymap,

    /// don't beep
    #[arg(long)]
    pub mute: bool,

    /// fix the random number sequence
    #[arg(long)]
    pub seed: Option<u64>,
}

/// how the environment paces the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub cycle_interval: Duration,
    pub timer_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            cycle_interval: Duration::from_micros(2000),
            timer_interval: Duration::from_secs(1) / 60,
        }
    }
}

impl From<&Config> for Timing {
    fn from(config: &Config) -> Self {
        Timing {
            cycle_interval: Duration::from_micros(config.cycle_us),
            timer_interval: Duration::from_secs(1) / config.timer_hz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["chip8-vm", "pong.ch8"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.keymap, Keymap::Conventional);
        assert_eq!(config.cycles, None);
        assert!(!config.mute);
        assert_eq!(Timing::from(&config), Timing::default());
    }

    #[test]
    fn test_options() {
        let config = Config::try_parse_from([
            "chip8-vm",
            "--cycle-us",
            "500",
            "--timer-hz",
            "100",
            "--keymap",
            "literal",
            "--cycles",
            "10",
            "--seed",
            "7",
            "--mute",
            "maze.ch8",
        ])
        .unwrap();
        assert_eq!(config.keymap, Keymap::Literal);
        assert_eq!(config.cycles, Some(10));
        assert_eq!(config.seed, Some(7));
        assert!(config.mute);
        let timing = Timing::from(&config);
        assert_eq!(timing.cycle_interval, Duration::from_micros(500));
        assert_eq!(timing.timer_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_rom_required() {
        assert!(Config::try_parse_from(["chip8-vm"]).is_err());
    }

    #[test]
    fn test_zero_timer_rate_rejected() {
        assert!(Config::try_parse_from(["chip8-vm", "--timer-hz", "0", "a.ch8"]).is_err());
    }
}
