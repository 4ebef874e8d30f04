use anyhow::Result;
use clap::Parser;
use ecobear::cli::{init_tracing, BotArgs};
use ecobear::gateway::{self, AppState};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Parser)]
#[command(name = "ecobear-gateway", version, about = "HTTP gateway for the Forest Guardian Bear")]
struct Cli {
    #[arg(long, env = "ECOBEAR_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, env = "ECOBEAR_PORT", default_value_t = 5000)]
    port: u16,

    #[command(flatten)]
    bot: BotArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.bot.verbose, "ecobear=info,tower_http=info");

    let bot = cli.bot.build_bot()?;
    let addr = SocketAddr::new(cli.host, cli.port);
    gateway::serve(addr, AppState::new(bot)).await?;
    Ok(())
}
