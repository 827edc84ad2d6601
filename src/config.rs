use log::warn;
use std::env;

use crate::ledger::DEFAULT_DIFFICULTY;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub difficulty: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let difficulty = match lookup("LEDGER_DIFFICULTY") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("LEDGER_DIFFICULTY={raw:?} is not a number, using {DEFAULT_DIFFICULTY}");
                DEFAULT_DIFFICULTY
            }),
            None => DEFAULT_DIFFICULTY,
        };
        Self { difficulty }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn missing_variable_uses_default() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn reads_difficulty() {
        let cfg = Config::from_lookup(|k| (k == "LEDGER_DIFFICULTY").then(|| " 2 ".to_string()));
        assert_eq!(cfg.difficulty, 2);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let cfg = Config::from_lookup(|_| Some("hard".to_string()));
        assert_eq!(cfg, Config::default());
    }
}
