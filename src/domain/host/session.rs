use actix::prelude::*;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;

use crate::domain::host::codec::ControllerCodec;
use crate::domain::host::controller_actor::ControllerMessage;
use crate::domain::host::protocol::{CloseSession, Outbound, SwitchReport};
use crate::domain::protocol::message::SwitchMessage;
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::utils::id::{ConnectionId, Dpid};
use crate::error::{Error, Result};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// One TCP connection to a switch agent.
/// Reports read from TCP are forwarded to the controller actor.
/// `Outbound` messages sent to this actor are written to TCP.
pub struct SwitchSession {
    controller: Recipient<ControllerMessage>,
    /// Write sink for the TCP stream.
    /// GENERICS ORDER IS CRITICAL: <Item, IO, Codec>
    framed_write: actix::io::FramedWrite<SwitchMessage, tokio::io::WriteHalf<TcpStream>, ControllerCodec>,
    connection_id: ConnectionId,
    /// Datapath id announced in the `Features` handshake.
    dpid: Option<Dpid>,
}

impl SwitchSession {
    pub fn new(
        controller: Recipient<ControllerMessage>,
        write_half: tokio::io::WriteHalf<TcpStream>,
        read_half: tokio::io::ReadHalf<TcpStream>,
    ) -> Addr<Self> {
        let connection_id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        Self::create(|ctx| {
            ctx.add_stream(FramedRead::new(read_half, ControllerCodec::new()));
            Self { controller, framed_write: actix::io::FramedWrite::new(write_half, ControllerCodec::new(), ctx), connection_id, dpid: None }
        })
    }

    fn on_report(&mut self, report: SwitchReport, ctx: &mut Context<Self>) {
        if let SwitchReport::Features { dpid, ports } = report {
            if let Some(known) = self.dpid {
                log::warn!("Connection {} already introduced itself as {}; ignoring features for {}.", self.connection_id, known, dpid);
                return;
            }
            self.dpid = Some(dpid);
            let connection = SessionConnection { dpid, id: self.connection_id, session: ctx.address() };
            self.controller.do_send(ControllerMessage::ConnectionUp { dpid, connection: Box::new(connection), ports });
            return;
        }

        let Some(dpid) = self.dpid else {
            log::warn!("Connection {} sent {:?} before its features; ignoring.", self.connection_id, report);
            return;
        };

        let message = match report {
            SwitchReport::PacketIn(packet) => ControllerMessage::PacketIn { dpid, packet },
            SwitchReport::BarrierReply { xid } => ControllerMessage::BarrierIn { dpid, xid },
            SwitchReport::LinkStatus(event) => ControllerMessage::LinkEvent(event),
            SwitchReport::Features { .. } => return,
        };
        self.controller.do_send(message);
    }
}

impl Actor for SwitchSession {
    type Context = Context<Self>;

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(dpid) = self.dpid.take() {
            self.controller.do_send(ControllerMessage::ConnectionDown { dpid, connection_id: self.connection_id });
        }
    }
}

impl Handler<Outbound> for SwitchSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, _ctx: &mut Self::Context) {
        self.framed_write.write(msg.0);
    }
}

impl Handler<CloseSession> for SwitchSession {
    type Result = ();

    fn handle(&mut self, _msg: CloseSession, ctx: &mut Self::Context) {
        ctx.stop();
    }
}

impl StreamHandler<std::result::Result<SwitchReport, io::Error>> for SwitchSession {
    fn handle(&mut self, msg: std::result::Result<SwitchReport, io::Error>, ctx: &mut Self::Context) {
        match msg {
            Ok(report) => self.on_report(report, ctx),
            Err(e) => {
                log::error!("Codec error on connection {}: {}", self.connection_id, e);
                ctx.stop();
            }
        }
    }
}

impl actix::io::WriteHandler<io::Error> for SwitchSession {}

/// Handle the controller uses to talk to a session.
pub struct SessionConnection {
    dpid: Dpid,
    id: ConnectionId,
    session: Addr<SwitchSession>,
}

impl fmt::Debug for SessionConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConnection").field("dpid", &self.dpid).field("id", &self.id).finish()
    }
}

impl SwitchConnection for SessionConnection {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Queues `message` for the session's writer, past the mailbox capacity. Fails only once
    /// the session has stopped.
    fn send(&self, message: SwitchMessage) -> Result<()> {
        if !self.session.connected() {
            return Err(Error::SendFailed { dpid: self.dpid, reason: "session is closed".to_string() });
        }
        self.session.do_send(Outbound(message));
        Ok(())
    }

    fn close(&self) {
        self.session.do_send(CloseSession);
    }
}
