use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{self, bail, WrapErr};
use hyperedit::{config::EditorConfig, edit::Editor, queue::EditQueue};
use scenario::Scenario;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod report;
mod scenario;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Apply a script of orbit edits to a scenario and report the result"
)]
struct Cli {
    /// RON scenario file
    scenario: PathBuf,

    /// TOML editor settings (defaults for anything left out)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail if any edit is refused
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn load_config(path: Option<&PathBuf>) -> eyre::Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let text =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let text = fs::read_to_string(&cli.scenario)
        .wrap_err_with(|| format!("reading {}", cli.scenario.display()))?;
    let scenario: Scenario = ron::from_str(&text)
        .wrap_err_with(|| format!("parsing {}", cli.scenario.display()))?;
    let mut world = scenario.build(&config)?;
    info!(
        bodies = world.bodies.len(),
        vessels = world.vessels.len(),
        commands = scenario.commands.len(),
        "scenario loaded"
    );

    let queue = EditQueue::new();
    let sender = queue.sender();
    let mut refused = 0;
    for (i, command) in scenario.commands.iter().enumerate() {
        let edit = command
            .resolve(&world, &config)
            .wrap_err_with(|| format!("command {} ({command})", i + 1))?;
        sender.send(edit)?;
        for (_, res) in queue.drain(&mut Editor::new(&mut world, &config)) {
            match res {
                Ok(()) => println!("ok       {command}"),
                Err(err) => {
                    refused += 1;
                    println!("refused  {command}: {err}");
                }
            }
        }
    }

    print!("{}", report::Report(&world));

    if refused > 0 {
        warn!(refused, "some edits were refused");
        if cli.strict {
            bail!("{refused} edit(s) refused");
        }
    }
    Ok(())
}
