use anyhow::Result;
use clap::Parser;

use talkdex_cli::{
    cli::{Cli, Commands},
    commands, init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(cli.config.as_deref(), args).await?,
        Commands::Verify { db } => commands::verify::execute(&db).await?,
        Commands::Optimize { db } => commands::optimize::execute(&db).await?,
    }

    Ok(())
}
