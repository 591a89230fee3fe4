//! Debug adapter server: accepts IDE connections and serves one debug
//! session per connection.

use clap::Parser;
use eyre::WrapErr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use debugger::{DebugSession, TcpRuntimeConnector};

#[derive(Debug, Parser)]
#[command(about = "Domain-parametric debug adapter")]
struct Args {
    /// TCP port to listen on for debug protocol connections
    #[clap(long, value_parser = clap::value_parser!(u32).range(4000..=99999))]
    port: u32,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let listener = TcpListener::bind(format!("127.0.0.1:{}", args.port))
        .await
        .wrap_err_with(|| format!("binding to port {}", args.port))?;
    let addr = listener.local_addr().wrap_err("reading listener address")?;
    tracing::info!("waiting for debug protocol at {addr}");

    loop {
        let (stream, peer) = listener.accept().await.wrap_err("accepting connection")?;
        tracing::info!(%peer, "client connected");

        tokio::spawn(async move {
            let session = DebugSession::new(TcpRuntimeConnector);
            if let Err(error) = session.run(stream).await {
                tracing::error!(%error, %peer, "session ended with error");
            } else {
                tracing::debug!(%peer, "session closed");
            }
        });
    }
}
