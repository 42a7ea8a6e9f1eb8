use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use kbboard::{default_config_path, run_config_command, App, Cli, Commands, Config};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

async fn run(cli: Cli) -> kbboard::Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);

    // Handled before the strict load so a broken config can be repaired
    let command = match cli.command {
        Commands::Config { show, set, reset } => {
            return run_config_command(&config_path, cli.data_dir, show, set, reset);
        }
        command => command,
    };

    let mut config = Config::load(&config_path)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    debug!("Using data directory {}", config.data_dir.display());

    let app = App::new(config, config_path, cli.verbose)?;
    app.run(command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);
    info!("kbboard starting up");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_noop() => {
            println!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("Command failed: {:?}", e);
            eprintln!("{} {}", console::style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
