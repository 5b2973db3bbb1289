//! CLI subcommands

pub mod check;
pub mod lower;

use anyhow::Context;
use std::path::Path;
use sysdesc_compiler::{Description, TargetConfig};

/// Load the description and target config shared by every subcommand
pub fn load_inputs(file: &Path, target: Option<&Path>) -> anyhow::Result<(Description, TargetConfig)> {
    let desc = Description::from_file(file)
        .with_context(|| format!("loading description {}", file.display()))?;
    let target = match target {
        Some(path) => TargetConfig::from_file(path)
            .with_context(|| format!("loading target config {}", path.display()))?,
        None => TargetConfig::default(),
    };
    log::debug!(
        "loaded {} declarations for {}/{}",
        desc.nodes.len(),
        target.os,
        target.arch
    );
    Ok((desc, target))
}
