use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use isbn_lookup::config::Config;
use isbn_lookup::infrastructure::ReqwestTransport;
use isbn_lookup::{BibRecord, Resolver};

const QUIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];
const RULE: &str = "==================================================";

fn print_banner(resolver: &Resolver) {
    let providers: Vec<&str> = resolver.sources().iter().map(|s| s.label()).collect();
    println!("{}", RULE);
    println!("ISBN bibliographic lookup");
    println!("{}", RULE);
    println!("Data providers: {}", providers.join(" + "));
    println!("Type \"q\" or \"quit\" to exit\n");
}

fn print_record(record: &BibRecord) {
    println!("\n{}", RULE);
    println!("Bibliographic record (source: {})", record.source());
    println!("{}", RULE);
    println!("Title:     {}", record.title());
    println!("Author:    {}", record.author());
    println!("Publisher: {}", record.publisher());
    println!("Published: {}", record.pubdate());
    println!("ISBN:      {}", record.isbn());
    if !record.description().is_empty() {
        println!("Summary:   {}...", record.description());
    }
    println!("{}\n", RULE);
}

/// Look up one raw identifier and print the result. Returns whether a record was found.
async fn lookup_and_print(resolver: &Resolver, raw: &str) -> bool {
    match resolver.resolve(raw).await {
        Ok(resolution) => match resolution.record() {
            Some(record) => {
                print_record(record);
                true
            }
            None => {
                println!("\nNo book found for ISBN {}", resolution.isbn);
                println!("All catalogs were searched without a match\n");
                false
            }
        },
        Err(e) => {
            println!("{}", e);
            false
        }
    }
}

async fn run_loop(resolver: &Resolver) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"Enter an ISBN: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if QUIT_COMMANDS.contains(&input.to_lowercase().as_str()) {
            println!("\nGoodbye");
            break;
        }

        if input.is_empty() {
            println!("Please enter an ISBN");
            continue;
        }

        lookup_and_print(resolver, input).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "isbn_lookup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let transport = ReqwestTransport::new(&config.user_agent).expect("Failed to create HTTP client");
    let resolver =
        Resolver::from_config(&config, Arc::new(transport)).expect("Failed to configure catalogs");

    // ISBNs on the command line: look each up once, no prompt
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let mut all_found = true;
        for raw in &args {
            all_found &= lookup_and_print(&resolver, raw).await;
        }
        return if all_found {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    print_banner(&resolver);
    if let Err(e) = run_loop(&resolver).await {
        tracing::error!("Failed to read input: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
