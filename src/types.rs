use std::time::Duration;

use serde::Deserialize;

use crate::op::Op;

/// Operation name as written in the config (`ops = ["create", "write"]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpName {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl OpName {
    pub fn to_op(self) -> Op {
        match self {
            OpName::Create => Op::CREATE,
            OpName::Write => Op::WRITE,
            OpName::Remove => Op::REMOVE,
            OpName::Rename => Op::RENAME,
            OpName::Chmod => Op::CHMOD,
        }
    }
}

/// Combine a list of op names into one mask.
pub fn ops_mask(names: &[OpName]) -> Op {
    names.iter().fold(Op::empty(), |acc, name| acc | name.to_op())
}

/// Parse a simple duration string like `"200ms"`, `"2s"`, `"1m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
