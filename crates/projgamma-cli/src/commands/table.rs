//! Script command table.
//!
//! Every token maps to exactly one operation. Arguments are positional and
//! follow the token.

use anyhow::Result;

use super::{curve, device, Session};

/// One script command.
pub struct Command {
    /// Token typed in scripts.
    pub token: &'static str,
    /// Argument synopsis.
    pub args: &'static str,
    /// One line description.
    pub help: &'static str,
    /// Returns true if the command talks to the projector.
    pub device: bool,
    run: fn(&mut Session, &[&str]) -> Result<()>,
}

impl Command {
    /// Runs the command.
    pub fn run(&self, session: &mut Session, args: &[&str]) -> Result<()> {
        (self.run)(session, args)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("token", &self.token).finish()
    }
}

macro_rules! command {
    ($token:literal, $args:literal, $help:literal, $run:path) => {
        Command {
            token: $token,
            args: $args,
            help: $help,
            device: false,
            run: $run,
        }
    };
    (device $token:literal, $args:literal, $help:literal, $run:path) => {
        Command {
            token: $token,
            args: $args,
            help: $help,
            device: true,
            run: $run,
        }
    };
}

/// All commands, in help order.
pub static COMMANDS: &[Command] = &[
    command!("eo", "<eotf>", "EOTF: bt1886, hlg, pq, gamma_2_2, gamma_2_4", curve::set_eotf),
    command!("eb", "<level>", "BT.1886 black level, relative to white", curve::set_eotf_black),
    command!("il", "<level>", "input level: standard, full, super_white", curve::set_input_level),
    command!("bm", "<nits>", "max brightness of the projector", curve::set_max_brightness),
    command!("bw", "<nits>", "reference white brightness", curve::set_ref_white),
    command!("bbi", "<nits>", "black brightness in", curve::set_black_in),
    command!("bbo", "<nits>", "black brightness out", curve::set_black_out),
    command!("bh", "<nits|none>", "hard clip", curve::set_hard_clip),
    command!(
        "sc",
        "<nits|none|rule base min scale [hard_clip_scale]>",
        "soft clip start, or a rule fitting it",
        curve::set_soft_clip
    ),
    command!("se", "<slope>", "soft clip end slope, 0-1", curve::set_end_slope),
    command!("st", "<cubic|quadratic>", "soft clip curve type", curve::set_clip_type),
    command!("sg", "<gamma>", "soft clip gamma", curve::set_clip_gamma),
    command!(
        "bwc",
        "<contrast>",
        "scale reference white from a contrast setting, -50-50",
        curve::contrast_to_ref_white
    ),
    command!("lp", "[preset]", "load a preset, or list them", curve::load_preset),
    command!("show", "", "print parameters and table", curve::show),
    command!("rec", "[path]", "print or save the parameter record", curve::record),
    command!(device "Pw", "", "write the gamma table to the projector", device::write),
    command!(
        device "Pc",
        "",
        "fold projector contrast into reference white, write, reset contrast",
        device::write_with_contrast
    ),
    command!(device "Pr", "[red|green|blue]", "read a raw table from the projector", device::read),
    command!(device "Ps", "<setting> <value>", "change a projector setting", device::set),
    command!(device "Pm", "", "show projector model and gamma settings", device::status),
];

/// Finds a command by token. Tokens are case sensitive: `P` marks device
/// commands.
pub fn lookup(token: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.token == token)
}

/// Prints the command table.
pub fn run(_verbose: u8) -> Result<()> {
    let width = COMMANDS
        .iter()
        .map(|c| c.token.len() + c.args.len() + 1)
        .max()
        .unwrap_or(0);
    for command in COMMANDS {
        let usage = format!("{} {}", command.token, command.args);
        println!("  {usage:<width$}  {}", command.help);
    }
    println!();
    println!("Separate commands with ';'. Commands starting with P talk to the projector.");
    Ok(())
}
