use actix::prelude::*;
use bytes::BytesMut;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::TryRecvError;
use tokio_util::codec::{Decoder, Encoder};

use sdn_dynroute::domain::clock::clock::SharedClock;
use sdn_dynroute::domain::clock::clock_mock::MockClock;
use sdn_dynroute::domain::controller::controller::Controller;
use sdn_dynroute::domain::controller::controller_config::ControllerConfig;
use sdn_dynroute::domain::controller::event_sink::LinkEvent;
use sdn_dynroute::domain::host::codec::SwitchAgentCodec;
use sdn_dynroute::domain::host::controller_actor::{ControllerActor, ControllerMessage, SubscribePathInstalled};
use sdn_dynroute::domain::host::listener::accept_loop;
use sdn_dynroute::domain::host::protocol::SwitchReport;
use sdn_dynroute::domain::host::session::SwitchSession;
use sdn_dynroute::domain::install::hop::Hop;
use sdn_dynroute::domain::install::install_strategy::InstallStrategy;
use sdn_dynroute::domain::install::path_installer::PathInstalled;
use sdn_dynroute::domain::protocol::frame::{ETH_TYPE_ARP, ETH_TYPE_IPV4, EthernetFrame, FramePayload, IP_PROTO_UDP, Ipv4Packet, Ipv4Payload, MacAddr};
use sdn_dynroute::domain::protocol::message::{PacketIn, PortDesc, SwitchMessage};
use sdn_dynroute::domain::switch::connection::SwitchConnection;
use sdn_dynroute::domain::switch::connection_mock::RecordingConnection;
use sdn_dynroute::domain::utils::id::{Dpid, PortNo, Xid};

const TIMEOUT: Duration = Duration::from_secs(5);

const HOST_A: MacAddr = MacAddr([0, 0, 0, 0, 0, 0x0a]);
const HOST_B: MacAddr = MacAddr([0, 0, 0, 0, 0, 0x0b]);

type Received = Arc<Mutex<Vec<ControllerMessage>>>;

/// Stands in for the controller actor and keeps everything a session forwards.
struct EventSink {
    received: Received,
}

impl Actor for EventSink {
    type Context = Context<Self>;
}

impl Handler<ControllerMessage> for EventSink {
    type Result = ();

    fn handle(&mut self, msg: ControllerMessage, _ctx: &mut Self::Context) {
        self.received.lock().unwrap().push(msg);
    }
}

/// Switch end of a loopback TCP connection.
struct SwitchAgent {
    stream: TcpStream,
    codec: SwitchAgentCodec,
    buffer: BytesMut,
}

impl SwitchAgent {
    async fn report(&mut self, report: SwitchReport) {
        let mut frame = BytesMut::new();
        self.codec.encode(report, &mut frame).unwrap();
        self.stream.write_all(&frame).await.unwrap();
    }

    async fn next_message(&mut self) -> SwitchMessage {
        loop {
            if let Some(message) = self.codec.decode(&mut self.buffer).unwrap() {
                return message;
            }
            let read = tokio::time::timeout(TIMEOUT, self.stream.read_buf(&mut self.buffer)).await.expect("no message from the session").unwrap();
            assert!(read > 0, "session closed the connection");
        }
    }
}

/// Starts a session on a fresh loopback connection, forwarding into an `EventSink`.
async fn start_session() -> (SwitchAgent, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let stream = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
    let (accepted, _) = listener.accept().await.unwrap();

    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = EventSink { received: received.clone() }.start();
    let (read_half, write_half) = tokio::io::split(accepted);
    SwitchSession::new(sink.recipient(), write_half, read_half);

    (SwitchAgent { stream, codec: SwitchAgentCodec::new(), buffer: BytesMut::new() }, received)
}

async fn wait_for(received: &Received, count: usize) {
    tokio::time::timeout(TIMEOUT, async {
        while received.lock().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session did not forward enough events");
}

async fn connection_up(agent: &mut SwitchAgent, received: &Received, dpid: Dpid) -> Box<dyn SwitchConnection> {
    agent.report(SwitchReport::Features { dpid, ports: Vec::new() }).await;
    wait_for(received, 1).await;

    match received.lock().unwrap().remove(0) {
        ControllerMessage::ConnectionUp { dpid: announced, connection, .. } => {
            assert_eq!(announced, dpid);
            connection
        }
        _ => panic!("expected a connection-up first"),
    }
}

fn port(dpid: u64, port_no: u16) -> PortDesc {
    PortDesc { port_no: PortNo(port_no), name: format!("s{}-eth{}", dpid, port_no), curr: 1 << 5 }
}

#[actix_rt::test]
async fn test_burst_of_sends_reaches_the_switch_in_order() {
    let (mut agent, received) = start_session().await;
    let connection = connection_up(&mut agent, &received, Dpid(7)).await;

    // Far more than the session mailbox holds, without yielding in between.
    for xid in 1..=40 {
        let result = connection.send(SwitchMessage::BarrierRequest { xid: Xid::new(xid) });
        assert!(result.is_ok(), "send {} failed: {:?}", xid, result);
    }

    for xid in 1..=40 {
        assert_eq!(agent.next_message().await, SwitchMessage::BarrierRequest { xid: Xid::new(xid) });
    }
}

#[actix_rt::test]
async fn test_reports_are_forwarded_only_after_features() {
    let (mut agent, received) = start_session().await;
    let link = LinkEvent { dpid1: Dpid(7), port1: PortNo(1), dpid2: Dpid(8), port2: PortNo(2), added: true };

    agent.report(SwitchReport::BarrierReply { xid: Xid::new(3) }).await;
    agent.report(SwitchReport::Features { dpid: Dpid(7), ports: vec![port(7, 1), port(7, 2)] }).await;
    agent.report(SwitchReport::BarrierReply { xid: Xid::new(4) }).await;
    agent.report(SwitchReport::Features { dpid: Dpid(8), ports: Vec::new() }).await;
    agent.report(SwitchReport::LinkStatus(link)).await;

    wait_for(&received, 3).await;
    let events = std::mem::take(&mut *received.lock().unwrap());
    assert_eq!(events.len(), 3);

    let ControllerMessage::ConnectionUp { dpid, ports, .. } = &events[0] else {
        panic!("expected a connection-up first");
    };
    assert_eq!(*dpid, Dpid(7));
    assert_eq!(ports, &vec![port(7, 1), port(7, 2)]);

    let ControllerMessage::BarrierIn { dpid, xid } = &events[1] else {
        panic!("expected the barrier reply sent after features");
    };
    assert_eq!((*dpid, *xid), (Dpid(7), Xid::new(4)));

    // The second features report was dropped, so the link event comes next.
    let ControllerMessage::LinkEvent(event) = &events[2] else {
        panic!("expected the link event");
    };
    assert_eq!(*event, link);
}

#[actix_rt::test]
async fn test_packet_in_carries_the_announced_dpid() {
    let (mut agent, received) = start_session().await;
    let _connection = connection_up(&mut agent, &received, Dpid(5)).await;
    let frame = EthernetFrame { src: HOST_A, dst: MacAddr::BROADCAST, vlan: None, ether_type: ETH_TYPE_ARP, payload: FramePayload::Raw(vec![0; 28]) };
    let packet = PacketIn { buffer_id: Some(12), in_port: PortNo(3), frame };

    agent.report(SwitchReport::PacketIn(packet.clone())).await;

    wait_for(&received, 1).await;
    let ControllerMessage::PacketIn { dpid, packet: forwarded } = received.lock().unwrap().remove(0) else {
        panic!("expected a packet-in");
    };
    assert_eq!(dpid, Dpid(5));
    assert_eq!(forwarded, packet);
}

#[actix_rt::test]
async fn test_closing_the_connection_reports_it_down() {
    let (mut agent, received) = start_session().await;
    let connection = connection_up(&mut agent, &received, Dpid(7)).await;

    connection.close();

    wait_for(&received, 1).await;
    let ControllerMessage::ConnectionDown { dpid, connection_id } = received.lock().unwrap().remove(0) else {
        panic!("expected a connection-down");
    };
    assert_eq!(dpid, Dpid(7));
    assert_eq!(connection_id, connection.connection_id());

    tokio::time::timeout(TIMEOUT, async {
        while connection.send(SwitchMessage::BarrierRequest { xid: Xid::new(1) }).is_ok() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("sends to a stopped session kept succeeding");
}

#[actix_rt::test]
async fn test_accept_loop_starts_a_session_per_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = EventSink { received: received.clone() }.start();
    actix_rt::spawn(accept_loop(listener, sink.recipient()));

    for dpid in [1, 2] {
        let stream = TcpStream::connect(address).await.unwrap();
        let mut agent = SwitchAgent { stream, codec: SwitchAgentCodec::new(), buffer: BytesMut::new() };
        let connection = connection_up(&mut agent, &received, Dpid(dpid)).await;
        connection.send(SwitchMessage::BarrierRequest { xid: Xid::new(dpid) }).unwrap();
        assert_eq!(agent.next_message().await, SwitchMessage::BarrierRequest { xid: Xid::new(dpid) });
    }
}

fn udp_frame(src: MacAddr, dst: MacAddr) -> EthernetFrame {
    EthernetFrame {
        src,
        dst,
        vlan: None,
        ether_type: ETH_TYPE_IPV4,
        payload: FramePayload::Ipv4(Ipv4Packet {
            src: Ipv4Addr::new(10, 0, 0, 1),
            dst: Ipv4Addr::new(10, 0, 0, 2),
            protocol: IP_PROTO_UDP,
            tos: 0,
            ihl: 5,
            payload: Ipv4Payload::Udp { src_port: 5000, dst_port: 53 },
            raw: Vec::new(),
        }),
    }
}

#[actix_rt::test]
async fn test_controller_actor_installs_and_publishes_paths() {
    let clock = MockClock::new(0);
    let controller = Controller::new(ControllerConfig::with_strategy(InstallStrategy::Barrier), SharedClock(Arc::new(clock)));
    let addr = ControllerActor::new(controller).start();
    let mut installed = addr.send(SubscribePathInstalled).await.unwrap();

    let switch = RecordingConnection::new(Dpid(1), 1);
    addr.send(ControllerMessage::ConnectionUp { dpid: Dpid(1), connection: switch.boxed(), ports: vec![port(1, 1), port(1, 2)] }).await.unwrap();

    let announce = EthernetFrame { src: HOST_B, dst: MacAddr::BROADCAST, vlan: None, ether_type: ETH_TYPE_ARP, payload: FramePayload::Raw(vec![0; 28]) };
    addr.send(ControllerMessage::PacketIn { dpid: Dpid(1), packet: PacketIn { buffer_id: None, in_port: PortNo(2), frame: announce } }).await.unwrap();
    let flood = switch.take_sent();
    assert_eq!(flood.len(), 1);
    assert!(flood[0].is_packet_out());

    let packet = PacketIn { buffer_id: Some(6), in_port: PortNo(1), frame: udp_frame(HOST_A, HOST_B) };
    addr.send(ControllerMessage::PacketIn { dpid: Dpid(1), packet }).await.unwrap();

    let sent = switch.take_sent();
    assert_eq!(sent.len(), 4);
    assert!(sent[0].is_flow_mod());
    assert!(sent[2].is_flow_mod());
    let SwitchMessage::BarrierRequest { xid } = sent[1] else {
        panic!("expected a barrier after the forward rule");
    };
    assert!(sent[3].is_barrier_request());
    assert_eq!(installed.try_recv(), Err(TryRecvError::Empty));

    addr.send(ControllerMessage::BarrierIn { dpid: Dpid(1), xid }).await.unwrap();

    assert_eq!(installed.try_recv(), Ok(PathInstalled { hops: vec![Hop::new(Dpid(1), PortNo(1), PortNo(2))] }));
    let released = switch.take_sent();
    assert_eq!(released.len(), 1);
    assert!(released[0].is_packet_out());

    addr.send(ControllerMessage::ConnectionDown { dpid: Dpid(1), connection_id: switch.connection_id() }).await.unwrap();
    let packet = PacketIn { buffer_id: Some(7), in_port: PortNo(1), frame: udp_frame(HOST_A, HOST_B) };
    addr.send(ControllerMessage::PacketIn { dpid: Dpid(1), packet }).await.unwrap();
    assert!(switch.sent().is_empty());
}
