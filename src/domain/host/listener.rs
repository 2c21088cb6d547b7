use actix::prelude::Recipient;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::domain::host::controller_actor::ControllerMessage;
use crate::domain::host::session::SwitchSession;
use crate::error::Result;

/// Accepts switch connections on `address` and starts one session per connection.
///
/// Runs until accepting fails. Must be called from within an actix system.
pub async fn serve(address: SocketAddr, controller: Recipient<ControllerMessage>) -> Result<()> {
    let listener = TcpListener::bind(address).await?;
    log::info!("Listening for switches on {}.", listener.local_addr()?);

    accept_loop(listener, controller).await
}

pub async fn accept_loop(listener: TcpListener, controller: Recipient<ControllerMessage>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        log::info!("Switch connection from {}.", peer);

        let (read_half, write_half) = tokio::io::split(stream);
        SwitchSession::new(controller.clone(), write_half, read_half);
    }
}
