//! Machine settings.
//!
//! Resolution order is flags > environment > config file > defaults. The
//! CLI applies its flags on top of [`VmConfig::load`].

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;

use crate::debugger::DEFAULT_CONTINUE_KEY;
use crate::error::ConfigError;
use crate::output::DEFAULT_HISTORY_SIZE;
use crate::program::DEFAULT_MAX_PROGRAM_LEN;
use crate::tape::DEFAULT_TAPE_SIZE;
use crate::theme::{parse_color, Palette};

#[derive(Debug, Clone, PartialEq)]
pub struct VmConfig {
    pub tape_size: usize,
    pub max_program_len: usize,
    pub history_size: usize,
    pub start_paused: bool,
    pub continue_key: char,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub palette: Palette,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            max_program_len: DEFAULT_MAX_PROGRAM_LEN,
            history_size: DEFAULT_HISTORY_SIZE,
            start_paused: false,
            continue_key: DEFAULT_CONTINUE_KEY,
            max_steps: None,
            timeout_ms: None,
            palette: Palette::default(),
        }
    }
}

type Sections = HashMap<String, HashMap<String, String>>;

impl VmConfig {
    /// Defaults, then the config file (if any), then `BFCKR_*` variables.
    ///
    /// Not validated: callers layer their own overrides on top and call
    /// [`VmConfig::validate`] once at the end.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some((path, explicit)) = config_path() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    log::debug!("reading config from {}", path.display());
                    cfg.apply_file(&content)?;
                }
                Err(e) if explicit => {
                    log::warn!("cannot read config file {}: {e}", path.display());
                }
                Err(e) => log::debug!("no config file at {}: {e}", path.display()),
            }
        }
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Parse a config file body and apply it on top of the defaults.
    pub fn from_file_str(content: &str) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_file(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_file(&mut self, content: &str) -> Result<(), ConfigError> {
        let sections = parse_sections(content);

        if let Some(vm) = sections.get("vm") {
            for (key, value) in vm {
                self.set(key, value)?;
            }
        }

        if let Some(colors) = sections.get("colors") {
            let pal = &mut self.palette;

            macro_rules! set {
                ($field:ident) => {
                    if let Some(v) = colors.get(stringify!($field)).and_then(|s| parse_color(s)) {
                        pal.$field = v;
                    }
                };
            }

            set!(op_right);
            set!(op_left);
            set!(op_inc);
            set!(op_dec);
            set!(op_output);
            set!(op_input);
            set!(op_bracket);
            set!(op_breakpoint);
            set!(heading);
            set!(dim);
            set!(tape_cell_empty);
            set!(tape_cell_nonzero);
            set!(tape_cell_pointer);
        }
        Ok(())
    }

    /// Apply `BFCKR_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const VARS: [(&str, &str); 7] = [
            ("BFCKR_TAPE_SIZE", "tape_size"),
            ("BFCKR_MAX_PROGRAM", "max_program_len"),
            ("BFCKR_HISTORY_SIZE", "history_size"),
            ("BFCKR_START_PAUSED", "start_paused"),
            ("BFCKR_CONTINUE_KEY", "continue_key"),
            ("BFCKR_MAX_STEPS", "max_steps"),
            ("BFCKR_TIMEOUT_MS", "timeout_ms"),
        ];
        for (var, key) in VARS {
            if let Some(value) = lookup(var) {
                self.set(key, &value).map_err(|_| ConfigError::InvalidValue {
                    key: var.to_string(),
                    value,
                })?;
            }
        }
        Ok(())
    }

    /// Set one `[vm]` key from its text form. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let v = value.trim();
        match key {
            "tape_size" => self.tape_size = v.parse().map_err(|_| invalid())?,
            "max_program_len" => self.max_program_len = v.parse().map_err(|_| invalid())?,
            "history_size" => self.history_size = v.parse().map_err(|_| invalid())?,
            "start_paused" => self.start_paused = parse_bool(v).ok_or_else(invalid)?,
            "continue_key" => {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) if !ch.is_whitespace() => self.continue_key = ch,
                    _ => return Err(invalid()),
                }
            }
            "max_steps" => self.max_steps = Some(v.parse().map_err(|_| invalid())?),
            "timeout_ms" => self.timeout_ms = Some(v.parse().map_err(|_| invalid())?),
            other => log::warn!("ignoring unknown config key '{other}'"),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tape_size == 0 {
            return Err(ConfigError::ZeroCapacity { key: "tape_size" });
        }
        Ok(())
    }
}

/// `$BFCKR_CONFIG`, else `<config home>/bfckr.toml`. The flag is set when
/// the path was named explicitly.
fn config_path() -> Option<(PathBuf, bool)> {
    if let Ok(explicit) = std::env::var("BFCKR_CONFIG") {
        return Some((PathBuf::from(explicit), true));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bfckr.toml");
    Some((path, false))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Very small reader for `[section]` headers and `key = value` pairs.
/// Values may be quoted; `#` starts a comment line.
fn parse_sections(content: &str) -> Sections {
    let mut sections: Sections = HashMap::new();
    let mut current = String::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].trim().to_string();
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq + 1..].trim();
            let val = if val_raw.len() >= 2 && val_raw.starts_with('"') && val_raw.ends_with('"') {
                val_raw[1..val_raw.len() - 1].to_string()
            } else {
                val_raw.to_string()
            };
            sections.entry(current.clone()).or_default().insert(key, val);
        }
    }
    sections
}
