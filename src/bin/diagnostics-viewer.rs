//! Terminal viewer for the diagnostics endpoint
//!
//! Mounts once (probe + fetch), prints the report, then reads commands from
//! stdin: `r`/`refresh`, `c`/`clear`, `q`/`quit`.

use clap::Parser;
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};

use azure_diagnostics::viewer::render::render;
use azure_diagnostics::viewer::transport::{user_agent, HttpTransport};
use azure_diagnostics::viewer::{ClientProbe, ClientDiagnosticState, Viewer};

#[derive(Debug, Parser)]
#[clap(name = "diagnostics-viewer", about = "Fetch and display deployment diagnostics")]
struct Args {
    /// Diagnostics endpoint to query
    #[clap(
        long,
        env = "DIAGNOSTICS_URL",
        default_value = "http://localhost:3000/api/diagnostics"
    )]
    url: String,

    /// Print one report and exit
    #[clap(long)]
    once: bool,
}

fn print_report(state: &ClientDiagnosticState) {
    let report = render(state);
    for card in &report.cards {
        println!("[{:>8}] {}: {}", card.tone_class(), card.title, card.status);
    }
    println!();
    println!("{}", report.text);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing::info!("Diagnostics viewer starting");
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("Uncaught viewer error: {}", info);
        default_hook(info);
    }));

    let transport = HttpTransport::new(args.url.clone())?;
    let probe = ClientProbe {
        display_available: std::io::stdout().is_terminal(),
        document_available: std::env::current_dir().is_ok(),
        network_available: reqwest::Url::parse(&args.url)
            .map(|url| url.host().is_some())
            .unwrap_or(false),
        location: args.url.clone(),
        user_agent: user_agent(),
    };

    let mut viewer = Viewer::new(transport);
    viewer.mount(probe).await;
    print_report(viewer.state());

    if args.once {
        return Ok(());
    }

    println!("\nCommands: r = refresh, c = clear logs, q = quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "r" | "refresh" => {
                viewer.fetch_server_diagnostics().await;
                print_report(viewer.state());
            }
            "c" | "clear" => {
                viewer.clear_logs();
                print_report(viewer.state());
            }
            "q" | "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command '{}'", other),
        }
    }

    Ok(())
}
