// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! resv - automated restaurant reservation scheduler

mod parse;
mod shell;

use anyhow::Result;
use clap::Parser;
use resv_api::ResyApi;
use resv_core::{Registry, SystemClock};
use shell::{Action, Shell};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(
    name = "resv",
    version,
    about = "Automated restaurant reservation scheduler"
)]
struct Cli {
    /// Override the Resy API key
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = match cli.api_key {
        Some(key) => ResyApi::new(key),
        None => ResyApi::with_default_key(),
    };
    tracing::debug!("resy client configured");
    let shell = Shell::new(Registry::new(api, SystemClock));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout
        .write_all(b"Welcome to the resv shell! For help type 'help'\n")
        .await?;
    loop {
        stdout.write_all(b"resv>> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match shell.handle_line(&line).await {
            Ok(Action::Reply(reply)) => {
                stdout.write_all(format!("{reply}\n").as_bytes()).await?;
            }
            Ok(Action::Quit) => break,
            Err(err) => eprintln!("ERROR: {err}"),
        }
    }
    Ok(())
}
