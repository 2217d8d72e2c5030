//! OData routing service (v1)
//!
//! Resolves requests against OData routes and regenerates their links.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http server ──▶ odata_route_middleware ──▶ describe_route
//!                                          │                          │
//!                                          ▼                          ▼
//!                                     RouteTable ────────────▶ link generation
//!                                  (first match wins)       (direct or delegated)
//!
//!     Cross-cutting: config (TOML + validation), observability (tracing)
//! ```
//!
//! `match` and `link` run the same table offline, without a listener.

use std::path::PathBuf;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use odata_routing::config::{load_config, RoutingConfig};
use odata_routing::http::HttpServer;
use odata_routing::observability::init_logging;
use odata_routing::routing::{RouteTable, RouteValues, HTTP_ROUTE_KEY, ODATA_PATH};

#[derive(Parser)]
#[command(name = "odata-routing")]
#[command(about = "Match OData requests and generate OData links", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the route table over HTTP
    Serve,
    /// Resolve a URI against the route table
    Match {
        uri: String,
        /// Request header as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Generate a link through a named route
    Link { route: String, odata_path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RoutingConfig::default(),
    };
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Match { uri, headers } => {
            let table = RouteTable::from_config(&config)?;
            let request = table.request(uri.parse::<Uri>()?).with_headers(parse_headers(&headers)?);
            match table.match_request(&request) {
                Some(found) => println!("{}", serde_json::to_string_pretty(&found)?),
                None => {
                    eprintln!("No route matched {}", uri);
                    std::process::exit(1);
                }
            }
        }
        Commands::Link { route, odata_path } => {
            let table = RouteTable::from_config(&config)?;
            let request = table.request(Uri::from_static("/"));
            let mut values = RouteValues::new();
            values.insert(ODATA_PATH, odata_path);
            values.insert(HTTP_ROUTE_KEY, true);
            match table.virtual_path(&route, &request, &values)? {
                Some(link) => println!("{}", link),
                None => {
                    eprintln!("Route '{}' produced no link", route);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn serve(config: RoutingConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("odata-routing v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        virtual_path_root = %config.virtual_path_root,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not NAME:VALUE", entry))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    Ok(headers)
}
