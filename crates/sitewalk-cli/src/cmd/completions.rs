//! `sw completions`: shell completion scripts.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap_complete::{Shell, generate};
use tracing::info;

/// Arguments for `sw completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to FILE instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Execute `sw completions`.
///
/// The script is registered under the command's own name, so a renamed
/// binary still completes.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> anyhow::Result<()> {
    let Some(path) = &args.out else {
        let mut out = io::stdout().lock();
        write_completions(args.shell, command, &mut out);
        return out.flush().context("flush completion script");
    };

    let mut file = File::create(path)
        .with_context(|| format!("create completion script {}", path.display()))?;
    write_completions(args.shell, command, &mut file);
    file.flush().with_context(|| format!("write completion script {}", path.display()))?;
    info!(shell = %args.shell, path = %path.display(), "completion script written");
    Ok(())
}

fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    let name = command.get_name().to_string();
    generate(shell, command, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_command() -> clap::Command {
        clap::Command::new("sw").subcommand(clap::Command::new("progress"))
    }

    #[test]
    fn script_names_the_command_and_its_subcommands() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut demo_command(), &mut buf);
        let script = String::from_utf8(buf).expect("utf8");
        assert!(script.contains("_sw()"));
        assert!(script.contains("progress"));
    }

    #[test]
    fn out_flag_writes_a_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sw.fish");
        let args = CompletionsArgs {
            shell: Shell::Fish,
            out: Some(path.clone()),
        };
        run_completions(&args, &mut demo_command()).expect("write script");

        let script = std::fs::read_to_string(&path).expect("read script");
        assert!(script.contains("complete -c sw"));
    }
}
