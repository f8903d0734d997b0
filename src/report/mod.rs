pub mod json;
pub mod text;

use std::path::Path;

use serde::Serialize;

use crate::stats::round_to;

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
    pub git_hash: Option<String>,
}

impl ToolMeta {
    pub fn current(repo_root: &Path) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: read_git_hash(repo_root),
        }
    }
}

pub fn format_rounded(v: f64, decimals: u32) -> String {
    format!("{}", round_to(v, decimals))
}

/// Empty string for a missing or undefined value.
pub fn format_cell(v: Option<f64>, decimals: u32) -> String {
    match v {
        Some(v) if v.is_finite() => format_rounded(v, decimals),
        _ => String::new(),
    }
}

pub fn verdict(passes: bool) -> &'static str {
    if passes { "ok" } else { "below threshold" }
}

fn read_git_hash(repo_root: &Path) -> Option<String> {
    let head = repo_root.join(".git/HEAD");
    let content = std::fs::read_to_string(head).ok()?;
    if let Some(ref_line) = content.strip_prefix("ref: ") {
        let ref_path = repo_root.join(".git").join(ref_line.trim());
        return std::fs::read_to_string(ref_path)
            .ok()
            .map(|s| s.trim().to_string());
    }
    Some(content.trim().to_string())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
