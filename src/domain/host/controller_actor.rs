use actix::prelude::*;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::domain::controller::controller::Controller;
use crate::domain::controller::event_sink::{LinkEvent, SwitchEventSink};
use crate::domain::install::path_installer::PathInstalled;
use crate::domain::protocol::message::{PacketIn, PortDesc};
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::utils::id::{ConnectionId, Dpid, Xid};

/// Switch events as they arrive from the sessions.
#[derive(Message)]
#[rtype(result = "()")]
pub enum ControllerMessage {
    ConnectionUp { dpid: Dpid, connection: Box<dyn SwitchConnection>, ports: Vec<PortDesc> },
    ConnectionDown { dpid: Dpid, connection_id: ConnectionId },
    PacketIn { dpid: Dpid, packet: PacketIn },
    LinkEvent(LinkEvent),
    BarrierIn { dpid: Dpid, xid: Xid },
}

#[derive(Message)]
#[rtype(result = "broadcast::Receiver<PathInstalled>")]
pub struct SubscribePathInstalled;

/// Runs the controller as the single consumer of all switch events. The mailbox is the
/// event queue, so every event is handled to completion before the next one.
pub struct ControllerActor {
    controller: Controller,
    sweep_interval: Duration,
}

impl ControllerActor {
    pub fn new(controller: Controller) -> Self {
        let sweep_interval = Duration::from_millis(controller.config().sweep_interval_ms);
        Self { controller, sweep_interval }
    }
}

impl Actor for ControllerActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        log::info!("Controller actor started; sweeping waiting paths every {:?}.", self.sweep_interval);
        ctx.run_interval(self.sweep_interval, |actor, _ctx| actor.controller.sweep());
    }
}

impl Handler<ControllerMessage> for ControllerActor {
    type Result = ();

    fn handle(&mut self, msg: ControllerMessage, _ctx: &mut Self::Context) {
        match msg {
            ControllerMessage::ConnectionUp { dpid, connection, ports } => self.controller.connection_up(dpid, connection, ports),
            ControllerMessage::ConnectionDown { dpid, connection_id } => self.controller.connection_down(dpid, connection_id),
            ControllerMessage::PacketIn { dpid, packet } => self.controller.packet_in(dpid, packet),
            ControllerMessage::LinkEvent(event) => self.controller.link_event(event),
            ControllerMessage::BarrierIn { dpid, xid } => self.controller.barrier_in(dpid, xid),
        }
    }
}

impl Handler<SubscribePathInstalled> for ControllerActor {
    type Result = MessageResult<SubscribePathInstalled>;

    fn handle(&mut self, _msg: SubscribePathInstalled, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.controller.subscribe_path_installed())
    }
}
