use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

#[derive(Args, Debug)]
pub struct ManArgs {
    /// Output directory (default: dist/share/man/man1)
    #[arg(long = "out-dir", default_value = "dist/share/man/man1")]
    pub out_dir: PathBuf,
}

pub fn cmd_man(args: ManArgs) -> Result<(), String> {
    let out_dir = crate::output_dir(args.out_dir)?;

    let cmd = autobump::command();
    let bin_name = cmd.get_name().to_string();
    write_page(&out_dir, &bin_name, cmd.clone())?;

    // One page per subcommand, named like git's: autobump-bump.1
    for subcommand in cmd.get_subcommands() {
        let page = format!("{bin_name}-{}", subcommand.get_name());
        write_page(&out_dir, &page, subcommand.clone())?;
    }

    Ok(())
}

fn write_page(out_dir: &Path, page: &str, cmd: clap::Command) -> Result<(), String> {
    let mut buffer: Vec<u8> = Vec::new();
    clap_mangen::Man::new(cmd)
        .title(page.to_uppercase())
        .render(&mut buffer)
        .map_err(|e| format!("render manpage for {page}: {e}"))?;

    let man_path = out_dir.join(format!("{page}.1"));
    fs::write(&man_path, buffer).map_err(|e| format!("{}: {e}", man_path.display()))?;
    println!("wrote {}", man_path.display());
    Ok(())
}
