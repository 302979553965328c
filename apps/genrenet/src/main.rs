//! # genrenet - Genre Co-occurrence Graphs
//!
//! The main binary for the genrenet pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/genrenet (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌──────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │  Transport   │    │    Renderer      │   │
//! │  │  (clap)     │    │  (reqwest)   │    │   (DOT, JSON)    │   │
//! │  └──────┬──────┘    └──────┬───────┘    └────────┬─────────┘   │
//! │         │                  │                     │              │
//! │         └──────────────────┼─────────────────────┘              │
//! │                            ▼                                    │
//! │                    ┌────────────────┐                           │
//! │                    │ genrenet-core  │                           │
//! │                    │  (THE LOGIC)   │                           │
//! │                    └────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Render the graph of highly rated titles since 1990
//! genrenet run --minimal-rating 7 --minimal-year 1990 -o genres.dot
//! circo -Tpng genres.dot -o genres.png
//!
//! # Cache operations
//! genrenet status
//! genrenet refresh
//! ```

use clap::Parser;
use genrenet::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // GENRENET_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout carries the rendered graph.
    let log_format = std::env::var("GENRENET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "genrenet=debug"
    } else {
        "genrenet=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the genrenet startup banner to stderr.
fn print_banner() {
    eprintln!(
        r#"
   __ _  ___ _ __  _ __ ___ _ __   ___| |_
  / _` |/ _ \ '_ \| '__/ _ \ '_ \ / _ \ __|
 | (_| |  __/ | | | | |  __/ | | |  __/ |_
  \__, |\___|_| |_|_|  \___|_| |_|\___|\__|
  |___/

  Genre Co-occurrence Graphs v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
