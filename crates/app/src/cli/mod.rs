use clap::{Parser, Subcommand};

mod import;
mod migrate;

#[derive(Debug, Parser)]
#[command(name = "eshop-app", about = "Eshop catalog CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),

    /// Import a batch file and print the per-record report
    Import(import::ImportArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Migrate(args) => migrate::run(args).await,
            Commands::Import(args) => import::run(args).await,
        }
    }
}
