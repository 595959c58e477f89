mod cli;
mod setup;

use clap::Parser;
use snafu::{prelude::*, Whatever};
use tokio::io::{self, BufReader};

use crate::cli::Arguments;

#[snafu::report]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Whatever> {
    let args = Arguments::parse();
    let terminal = setup::bootstrap(&args).await?;

    terminal
        .run(BufReader::new(io::stdin()))
        .await
        .whatever_context("Terminal failed to run")?;

    Ok(())
}
