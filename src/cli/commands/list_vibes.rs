//! cli::commands::list_vibes
//!
//! Print the vibe catalog, custom vibes included.

use super::Env;
use crate::engine::Context;
use anyhow::Result;

/// Print every vibe label with its hint indented beneath.
pub fn list_vibes(ctx: &Context, env: &Env) -> Result<()> {
    let output = ctx.output();
    let vibes = env.vibes()?;

    output.info("\nAvailable Vibes:");
    for vibe in vibes.iter() {
        output.print(format!("  {}", vibe.label));
        output.dim(format!("    {}", vibe.hint));
    }
    output.print("");

    Ok(())
}
