use anyhow::{bail, Result};
use lombok_cli::{build_cli, config_from_matches, run_clear, run_generate};
use lombok_core::init_tracing;

fn main() -> Result<()> {
    // Initialize logging
    init_tracing();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("generate", sub)) => {
            let config = config_from_matches(sub)?;
            let summary = run_generate(&config)?;
            let report = summary.render(config.format)?;
            if !report.is_empty() {
                print!("{report}");
                if !report.ends_with('\n') {
                    println!();
                }
            }
        }
        Some(("clear", sub)) => {
            let config = config_from_matches(sub)?;
            run_clear(&config)?;
        }
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("no command given"),
    }

    Ok(())
}
