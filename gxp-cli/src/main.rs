use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use gxp_cli::{Cli, Command, InitOutcome, app, console, initialize, logging};
use gxp_rag::{DocumentProcessor, RagConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RagConfig::from_env().context("invalid configuration")?;
    cli.apply_overrides(&mut config);
    logging::init(&config.logs_dir);
    config.validate().context("configuration error; set OPENAI_API_KEY in the environment or a .env file")?;

    let (store, engine) = app::connect(&config).await?;

    match cli.command {
        Command::Init { yes } => {
            let processor = DocumentProcessor::from_config(&config);
            let outcome = initialize(&store, &processor, &config.data_dir, |count| {
                if yes {
                    return Ok(true);
                }
                confirm(&format!(
                    "Vector store already contains {count} documents. Do you want to clear and reinitialize? (yes/no): "
                ))
            })
            .await?;

            match outcome {
                InitOutcome::Kept { count } => println!("Keeping existing {count} documents."),
                InitOutcome::NoDocuments => {
                    println!("No documents were processed from {}.", config.data_dir.display())
                }
                InitOutcome::Indexed { report, count } => {
                    println!(
                        "Database initialized with {count} document chunks ({} indexed, {} failed).",
                        report.indexed, report.failed
                    );
                    println!("You can now run: gxp chat");
                }
            }
        }
        Command::Chat => console::run(&config, &engine).await?,
        Command::Ask { query, json } => {
            let response = engine.generate_response(&query, None).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", console::format_response(&response));
            }
        }
        Command::Status => {
            let count = store.count().await;
            println!("{count} passages indexed in collection '{}'.", store.collection().name);
        }
    }

    Ok(())
}

/// Ask a yes/no question on stdin; only "yes" confirms.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
