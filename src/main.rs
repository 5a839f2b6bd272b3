use clap::Parser;
use tracing::{debug, info, warn};

use livevod::config::Config;

#[derive(Parser)]
#[command(version)]
struct Args {
    /// Set config file path
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let cfg = Config::parse(args.config);

    livevod::log::set(format!(
        "livevod={},tower_http={},storage={},transcribe={}",
        cfg.log.level, cfg.log.level, cfg.log.level, cfg.log.level
    ));
    warn!("set log level : {}", cfg.log.level);
    debug!("config : {:?}", cfg);

    cfg.validate().expect("invalid config");

    let listener = tokio::net::TcpListener::bind(cfg.http.listen)
        .await
        .unwrap();
    info!("Server listening on {}", listener.local_addr().unwrap());

    livevod::server_up(cfg, listener, livevod::shutdown_signal()).await;
    info!("Server shutdown");
}
