use actix::prelude::Actor;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use sdn_dynroute::domain::clock::clock::{SharedClock, SystemClock};
use sdn_dynroute::domain::controller::controller::Controller;
use sdn_dynroute::domain::host::controller_actor::ControllerActor;
use sdn_dynroute::domain::host::listener;
use sdn_dynroute::domain::install::install_strategy::InstallStrategy;
use sdn_dynroute::{load_config, logger};

/// Reactive SDN controller with incremental shortest-path routing.
#[derive(Parser, Debug)]
#[command(name = "sdn-dynroute", version)]
struct Cli {
    /// JSON controller configuration.
    #[arg(long)]
    config: Option<String>,

    /// Path install strategy: barrier, next-hop or eager-reinstall.
    #[arg(long)]
    strategy: Option<InstallStrategy>,

    /// Address to accept switch connections on.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init();
    log::info!("Starting sdn-dynroute controller.");

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(listen) = cli.listen {
        config.listen_address = listen;
    }

    let listen_address = config.listen_address;
    let controller = Controller::new(config, SharedClock(Arc::new(SystemClock::new())));
    let controller = ControllerActor::new(controller).start();

    listener::serve(listen_address, controller.recipient()).await?;
    Ok(())
}
