use clap::Parser;

use tally::cli::{self, Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::List { html: false }) {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            description,
            amount,
            kind,
        } => cli::add::run(&description, &amount, &kind),
        Commands::List { html } => cli::list::run(html),
        Commands::Remove { id } => cli::remove::run(id),
        Commands::Summary => cli::summary::run(),
        Commands::Clear { yes, force } => cli::clear::run(yes, force),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
