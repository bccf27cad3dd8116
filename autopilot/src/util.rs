use anyhow::{anyhow, Context, Result};
use dashbot_core::TuningConfig;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Accepts decimal or `0x`-prefixed hex, with `_` digit separators allowed in
/// either (`0xC0FF_EE11`).
pub fn parse_seed(raw: &str) -> Result<u32> {
    let text = raw.trim();
    let (digits, radix) = match text.get(..2) {
        Some("0x" | "0X") => (&text[2..], 16),
        _ => (text, 10),
    };
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return Err(anyhow!("seed `{text}` has no digits"));
    }
    u32::from_str_radix(&digits, radix)
        .with_context(|| format!("seed `{text}` is not a base-{radix} u32"))
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("{seed:#010x}")
}

/// Comma-separated seeds; blank entries are ignored.
pub fn parse_seed_csv(list: &str) -> Result<Vec<u32>> {
    let seeds = list
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_seed)
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        return Err(anyhow!("seed list `{list}` names no seeds"));
    }
    Ok(seeds)
}

/// `count` seeds starting at `start`, stepped with the usual LCG constants.
pub fn seed_sequence(start: u32, count: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(count as usize);
    let mut cur = start;
    for _ in 0..count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    out
}

pub fn load_tuning(path: Option<&Path>) -> Result<TuningConfig> {
    let Some(path) = path else {
        return Ok(TuningConfig::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading tuning file {}", path.display()))?;
    TuningConfig::from_json(&data).map_err(|err| anyhow!("{}: {err}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(value).context("failed to serialize json")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}
