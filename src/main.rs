use clap::Parser;

use courier_rs::cli::Cli;
use courier_rs::dispatch::PushStatus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let status = Cli::parse().run().await?;

    println!("{status}");

    if status != PushStatus::Success {
        std::process::exit(1);
    }

    Ok(())
}
