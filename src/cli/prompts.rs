//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm refining a coarse decision with a fine sweep
pub fn confirm_refine(start_count: usize, span: usize) -> Result<bool> {
    let message = format!(
        "Refine around {} feature(s) with a fine search (±{})?",
        start_count, span
    );
    confirm_step(&message)
}
