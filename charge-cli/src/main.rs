use clap::Parser;

mod command;
#[cfg(target_os = "macos")]
mod func;

use command::CliArgs;

#[cfg(target_os = "macos")]
fn main() {
    use command::Commands;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = CliArgs::parse();
    let result = match cli.command {
        Commands::Disable => func::disable(),
        Commands::Enable => func::enable(),
        Commands::Limit { percent } => func::limit(percent),
        Commands::Read { key } => func::read(&key),
        Commands::Write { key, value } => func::write(&key, &value),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "macos"))]
fn main() {
    let _ = CliArgs::parse();
    eprintln!("charge requires macOS (the SMC is reached through IOKit)");
    std::process::exit(1);
}
