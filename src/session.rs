//! Session settings consulted by every compile.
//!
//! Settings start from their defaults, may be overlaid from configuration and
//! are afterwards only changed through [`Settings::set`], which is also what
//! the shell's `set` command calls. A rejected value leaves the setting as it
//! was.

use std::fmt;

use tracing::info;

use crate::error::{ParaqueryError, Result};
use crate::normalize::Field;

pub const DEFAULT_LIMIT: u32 = 10;

pub const SETTING_NAMES: [&str; 8] = [
    "identical",
    "order",
    "limit",
    "debug",
    "group_by",
    "explain",
    "same_pos",
    "unique_tgt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    /// Most probable rule first, i.e. ascending cost.
    #[default]
    HighestFirst,
    LowestFirst,
    Random,
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderMode::HighestFirst => write!(f, "highest first"),
            OrderMode::LowestFirst => write!(f, "lowest first"),
            OrderMode::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `None` means unbounded.
    pub limit: Option<u32>,
    pub order: OrderMode,
    pub include_identity: bool,
    pub same_pos_only: bool,
    pub unique_target_only: bool,
    pub group_by: Option<Field>,
    pub debug: bool,
    pub explain: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            order: OrderMode::default(),
            include_identity: false,
            same_pos_only: false,
            unique_target_only: false,
            group_by: None,
            debug: false,
            explain: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let lowered = value.trim().to_lowercase();
        let value = lowered.as_str();
        match name.trim() {
            "identical" => self.include_identity = parse_switch(name, value)?,
            "debug" => self.debug = parse_switch(name, value)?,
            "explain" => self.explain = parse_switch(name, value)?,
            "same_pos" => self.same_pos_only = parse_switch(name, value)?,
            "unique_tgt" => self.unique_target_only = parse_switch(name, value)?,
            "order" => self.order = parse_order(value).ok_or_else(|| ParaqueryError::setting(name, value))?,
            "limit" => self.limit = parse_limit(name, value)?,
            "group_by" => {
                self.group_by = match value {
                    "none" | "off" => None,
                    field => Some(Field::groupable(field).ok_or_else(|| ParaqueryError::setting(name, value))?),
                }
            }
            other => return Err(ParaqueryError::UnknownSetting(other.to_string())),
        }
        info!(setting = name, value, "setting changed");
        Ok(())
    }
}

fn parse_switch(name: &str, value: &str) -> Result<bool> {
    match value {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        _ => Err(ParaqueryError::setting(name, value)),
    }
}

fn parse_order(value: &str) -> Option<OrderMode> {
    match value {
        "random" | "rand" => Some(OrderMode::Random),
        "prob" | "pe2e1" | "probability" | "highprobfirst" | "desc" | "down" | "decreasing" => {
            Some(OrderMode::HighestFirst)
        }
        "lowprobfirst" | "asc" | "up" | "increasing" => Some(OrderMode::LowestFirst),
        _ => None,
    }
}

// a negative limit switches the limit off, zero is rejected
fn parse_limit(name: &str, value: &str) -> Result<Option<u32>> {
    if matches!(value, "off" | "none") {
        return Ok(None);
    }
    match value.parse::<i64>() {
        Ok(0) | Err(_) => Err(ParaqueryError::setting(name, value)),
        Ok(n) if n < 0 => Ok(None),
        Ok(n) => u32::try_from(n).map(Some).map_err(|_| ParaqueryError::setting(name, value)),
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        writeln!(f, " Current settings:")?;
        match self.limit {
            Some(limit) => writeln!(f, "  limit: {limit}")?,
            None => writeln!(f, "  limit: none")?,
        }
        writeln!(f, "  order: {}", self.order)?;
        writeln!(f, "  identical: {}", on_off(self.include_identity))?;
        writeln!(f, "  same_pos: {}", on_off(self.same_pos_only))?;
        writeln!(f, "  unique_tgt: {}", on_off(self.unique_target_only))?;
        match self.group_by {
            Some(field) => writeln!(f, "  group_by: {field}")?,
            None => writeln!(f, "  group_by: none")?,
        }
        writeln!(f, "  debug: {}", on_off(self.debug))?;
        writeln!(f, "  explain: {}", on_off(self.explain))
    }
}
