//! Command scripts
//!
//! A script is a `;` or newline separated list of commands such as
//! `lp hdr pq; bw 30; Pw`. The whole script is parsed before anything runs,
//! so a typo never leaves the projector half configured. Text after `#` on a
//! line is ignored.

use std::fs;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, trace};

use super::table::{lookup, Command};
use super::Session;
use crate::RunArgs;

/// One parsed command with its arguments.
#[derive(Debug)]
pub struct Step<'a> {
    /// Table entry for the token.
    pub command: &'static Command,
    /// Positional arguments.
    pub args: Vec<&'a str>,
}

/// Splits `script` into steps, failing on the first unknown token.
pub fn parse(script: &str) -> Result<Vec<Step<'_>>> {
    let mut steps = Vec::new();
    for line in script.lines() {
        let line = line.split('#').next().unwrap_or_default();
        for text in line.split(';') {
            let mut words = text.split_whitespace();
            let Some(token) = words.next() else {
                continue;
            };
            let Some(command) = lookup(token) else {
                bail!("unknown command {token:?}, 'projgamma commands' lists them");
            };
            steps.push(Step {
                command,
                args: words.collect(),
            });
        }
    }
    Ok(steps)
}

/// Parses and runs `script`, stopping at the first failing command.
pub fn run_script(session: &mut Session, script: &str) -> Result<()> {
    let steps = parse(script)?;
    debug!(steps = steps.len(), "script parsed");
    for step in &steps {
        trace!(token = step.command.token, args = ?step.args, "running");
        step.command
            .run(session, &step.args)
            .with_context(|| format!("command {} failed", step.command.token))?;
    }
    Ok(())
}

/// Runs `--file` followed by the commands given on the command line.
pub fn run(args: RunArgs, session: &mut Session, verbose: u8) -> Result<()> {
    let mut script = args.script.join(" ");
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        script = format!("{text}\n{script}");
    }
    if script.trim().is_empty() {
        bail!("Nothing to run, pass commands or --file");
    }
    if verbose > 0 {
        println!("Running: {}", script.trim());
    }
    run_script(session, &script)?;
    info!("script complete");
    Ok(())
}
