use std::path::PathBuf;
use std::sync::Arc;

use vitrine_workspace::{router, spawn_store_watcher, AppState, FileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let mut port: u16 = 4402;
    let mut pages_dir = PathBuf::from("pages");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().expect("Invalid port number");
                    i += 2;
                } else {
                    eprintln!("--port requires a value");
                    std::process::exit(1);
                }
            }
            "--pages-dir" => {
                if i + 1 < args.len() {
                    pages_dir = PathBuf::from(&args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("--pages-dir requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Usage: vitrine-server [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --port <PORT>       HTTP port to listen on (default: 4402)");
                println!("  --pages-dir <DIR>       Directory holding page JSON files (default: ./pages)");
                println!("  -h, --help              Show this help message");
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
    }

    std::fs::create_dir_all(&pages_dir)?;

    println!("Starting Vitrine workspace server...");
    println!("Pages directory: {:?}", pages_dir);
    println!("HTTP listening on 127.0.0.1:{}", port);

    let store = Arc::new(FileStore::new(pages_dir.clone()));
    let state = AppState::new(store);

    // Out-of-band edits to the page store broadcast refetch notifications
    spawn_store_watcher(pages_dir, state.channels.clone())?;

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
