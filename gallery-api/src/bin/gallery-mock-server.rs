use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use gallery::mock::MockSiteServer;

/// Usage: gallery-mock-server [ADDR] [PROJECT_DIR]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let addr = SocketAddr::from_str(&addr)?;
    let server = match args.next().map(PathBuf::from) {
        Some(root) => MockSiteServer::from_dir(&root).await?,
        None => MockSiteServer::sample(),
    };
    let handle = server.start(addr).await?;
    println!("mock gallery site listening on {}", handle.url());
    tokio::signal::ctrl_c().await?;
    handle.shutdown().await;
    Ok(())
}
