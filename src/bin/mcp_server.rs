//! UTAM inspector MCP Server
//!
//! This binary serves the page-object inspection tools over the Model Context Protocol.
//! Definitions are read from a directory of `*.utam.json` files; a browser is launched
//! the first time a page is captured.

use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;
use utam_inspector::browser::LaunchOptions;
use utam_inspector::mcp::InspectorServer;
use utam_inspector::pageobject::DirectorySource;

use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "utam-inspector")]
#[command(version)]
#[command(about = "UTAM page-object inspection MCP server", long_about = None)]
struct Cli {
    /// Directory containing UTAM page-object definitions
    #[arg(long, short = 'd', value_name = "DIR")]
    definitions: PathBuf,

    /// URI namespace prepended to definition paths (e.g. "salesforce-pageobjects")
    #[arg(long, short = 'n', value_name = "NAME")]
    namespace: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut options = LaunchOptions::new().headless(!cli.headed);
    if let Some(path) = cli.executable_path.clone() {
        options = options.chrome_path(path);
    }
    if let Some(dir) = cli.user_data_dir.clone() {
        options = options.user_data_dir(dir);
    }

    let mut source = DirectorySource::new(&cli.definitions);
    if let Some(namespace) = cli.namespace.clone() {
        source = source.namespace(namespace);
    }

    eprintln!("UTAM inspector MCP Server v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Definitions: {}", cli.definitions.display());
    eprintln!(
        "Browser mode: {}",
        if options.headless {
            "headless"
        } else {
            "headed"
        }
    );

    if let Some(ref path) = cli.executable_path {
        eprintln!("Browser executable: {}", path.display());
    }

    if let Some(ref dir) = cli.user_data_dir {
        eprintln!("User data directory: {}", dir.display());
    }

    // A missing or empty definitions directory is not fatal; reload_definitions can fix it later
    let server = match InspectorServer::with_definitions(Arc::new(source.clone()), options.clone()).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Warning: {}", e);
            InspectorServer::new(Arc::new(source), options)
        }
    };

    // Route to appropriate transport
    match cli.transport {
        Transport::Stdio => {
            eprintln!("Transport: stdio");
            eprintln!("Ready to accept MCP connections via stdio");
            let running = server.serve(stdio()).await?;
            let quit_reason = running.waiting().await?;
            eprintln!("Server quit with reason: {:?}", quit_reason);
            // Give a small delay for the browser to shut down
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
            eprintln!("Cleanup complete, exiting...");
        }
        Transport::Http => {
            eprintln!("Transport: HTTP streamable");
            eprintln!("Port: {}", cli.port);
            eprintln!("HTTP path: {}", cli.http_path);

            let bind_addr = format!("127.0.0.1:{}", cli.port);

            // Every session shares the loaded definitions and the browser
            let service_factory = move || Ok::<_, std::io::Error>(server.clone());

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            eprintln!(
                "Ready to accept MCP connections at http://{}{}",
                bind_addr, cli.http_path
            );

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
