use std::path::PathBuf;

use clap::Args;
use clap_complete::{Shell, generate_to};

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Output directory (default: dist/share/completions)
    #[arg(long = "out-dir", default_value = "dist/share/completions")]
    pub out_dir: PathBuf,

    /// Generate only for specific shell (default: all)
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,
}

pub fn cmd_completions(args: CompletionsArgs) -> Result<(), String> {
    let out_dir = crate::output_dir(args.out_dir)?;

    let mut cmd = autobump::command();
    let bin_name = cmd.get_name().to_string();

    let shells = match args.shell {
        Some(shell) => vec![shell],
        None => vec![Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell],
    };

    for shell in shells {
        let path = generate_to(shell, &mut cmd, &bin_name, &out_dir)
            .map_err(|e| format!("generate {shell} completions: {e}"))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
