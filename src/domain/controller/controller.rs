use std::collections::HashMap;
use tokio::sync::broadcast;

use crate::domain::clock::clock::SharedClock;
use crate::domain::controller::controller_config::ControllerConfig;
use crate::domain::controller::event_sink::{LinkEvent, SwitchEventSink};
use crate::domain::controller::port_weight::weight_class;
use crate::domain::install::hop::Hop;
use crate::domain::install::path_installer::{PathInstalled, PathInstaller};
use crate::domain::protocol::flow_match::FlowMatch;
use crate::domain::protocol::frame::MacAddr;
use crate::domain::protocol::message::{PacketIn, PacketOut, PortDesc, SwitchMessage};
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::switch::switch_registry::{ConnectOutcome, DisconnectOutcome, SwitchRegistry};
use crate::domain::topology::topology::Topology;
use crate::domain::utils::id::{ConnectionId, Dpid, PortNo, Xid};

/// Reactive L2 routing over the learned switch topology.
///
/// Owns all controller state. Every event handler runs to completion on `&mut self`; the
/// host is responsible for delivering events one at a time.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    clock: SharedClock,
    topology: Topology<Dpid>,
    switches: SwitchRegistry,
    installer: PathInstaller,

    /// Weight class per `(switch, port)`, from the port speed reported on connect.
    port_weights: HashMap<(Dpid, PortNo), u64>,

    /// Last known attachment point of each host.
    mac_table: HashMap<MacAddr, (Dpid, PortNo)>,

    /// Ports of each directed switch-to-switch link: `(src, dst) -> (src_port, dst_port)`.
    links: HashMap<(Dpid, Dpid), (PortNo, PortNo)>,
}

impl Controller {
    pub fn new(config: ControllerConfig, clock: SharedClock) -> Self {
        let installer = PathInstaller::new(&config, clock.clone());
        log::info!("Controller created with {} install strategy.", config.strategy);

        Self {
            config,
            clock,
            topology: Topology::new(),
            switches: SwitchRegistry::new(),
            installer,
            port_weights: HashMap::new(),
            mac_table: HashMap::new(),
            links: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology<Dpid> {
        &self.topology
    }

    pub fn switches(&self) -> &SwitchRegistry {
        &self.switches
    }

    pub fn subscribe_path_installed(&self) -> broadcast::Receiver<PathInstalled> {
        self.installer.subscribe()
    }

    pub fn waiting_path_count(&self) -> usize {
        self.installer.waiting_path_count()
    }

    pub fn mac_location(&self, mac: &MacAddr) -> Option<(Dpid, PortNo)> {
        self.mac_table.get(mac).copied()
    }

    pub fn link_ports(&self, source: Dpid, target: Dpid) -> Option<(PortNo, PortNo)> {
        self.links.get(&(source, target)).copied()
    }

    /// Weight class of a port, the configured default if its speed was never reported.
    pub fn port_weight(&self, dpid: Dpid, port: PortNo) -> u64 {
        self.port_weights.get(&(dpid, port)).copied().unwrap_or(self.config.default_port_weight)
    }

    /// Resolves the hop list from `(dpid1, port1)` to `(dpid2, port2)`.
    ///
    /// Each hop enters through the port the previous link arrives on and leaves through the
    /// port of the next link. The last hop leaves through `port2`.
    pub fn raw_path(&self, dpid1: Dpid, port1: PortNo, dpid2: Dpid, port2: PortNo) -> Option<Vec<Hop>> {
        let nodes = self.topology.make_path(dpid1, dpid2)?;

        let mut hops = Vec::with_capacity(nodes.len());
        let mut in_port = port1;
        for pair in nodes.windows(2) {
            let Some(&(out_port, next_in_port)) = self.links.get(&(pair[0], pair[1])) else {
                log::warn!("Path {} -> {} crosses {} -> {}, which has no recorded ports.", dpid1, dpid2, pair[0], pair[1]);
                return None;
            };
            hops.push(Hop::new(pair[0], in_port, out_port));
            in_port = next_in_port;
        }
        hops.push(Hop::new(dpid2, in_port, port2));

        Some(hops)
    }

    fn learn(&mut self, dpid: Dpid, in_port: PortNo, src: MacAddr, dst: MacAddr) {
        if src.is_multicast() {
            return;
        }

        let location = (dpid, in_port);
        let previous = self.mac_table.get(&src).copied();
        if previous == Some(location) {
            return;
        }

        if self.is_interconnect(dpid, in_port) {
            if previous.is_some() && !dst.is_multicast() {
                log::warn!("Packet from {} arrived at {}.{} without flow.", src, dpid, in_port);
            }
            return;
        }

        self.mac_table.insert(src, location);
        log::debug!("Learned {} at {}.{}", src, dpid, in_port);
    }

    /// Whether `(dpid, port)` is an endpoint of a recorded switch-to-switch link.
    fn is_interconnect(&self, dpid: Dpid, port: PortNo) -> bool {
        self.links.iter().any(|((source, target), (source_port, target_port))| {
            (*source == dpid && *source_port == port) || (*target == dpid && *target_port == port)
        })
    }

    fn install_path(&mut self, dpid: Dpid, dst_dpid: Dpid, dst_port: PortNo, packet: &PacketIn) {
        if dst_dpid == dpid && dst_port == packet.in_port {
            log::debug!("Destination {} is behind the ingress port {}.{}; dropping.", packet.frame.dst, dpid, dst_port);
            self.drop_packet(dpid, packet);
            return;
        }

        let Some(hops) = self.raw_path(dpid, packet.in_port, dst_dpid, dst_port) else {
            log::warn!("Can't get from {} to {}.", packet.frame.src, packet.frame.dst);
            self.reply_unreachable(dpid, packet);
            return;
        };

        let flow_match = FlowMatch::from_frame(&packet.frame, packet.in_port);
        if let Err(e) = self.installer.install(&self.switches, &hops, &flow_match, Some(packet)) {
            log::warn!("Failed to install path {} -> {}: {}", packet.frame.src, packet.frame.dst, e);
            self.drop_packet(dpid, packet);
            return;
        }

        // The reverse path is assumed to be symmetric.
        let reverse: Vec<Hop> = hops.iter().map(Hop::reversed).collect();
        if let Err(e) = self.installer.install(&self.switches, &reverse, &flow_match.flip(), None) {
            log::warn!("Failed to install reverse path {} -> {}: {}", packet.frame.dst, packet.frame.src, e);
        }
    }

    /// Answers IPv4 traffic with an ICMP host-unreachable, then frees the switch buffer.
    fn reply_unreachable(&self, dpid: Dpid, packet: &PacketIn) {
        if let Some(reply) = packet.frame.destination_unreachable(MacAddr::from_dpid(dpid)) {
            log::debug!("Dest unreachable ({} -> {}).", packet.frame.src, packet.frame.dst);
            self.send(dpid, SwitchMessage::PacketOut(PacketOut::emit(reply, packet.in_port)));
        }
        self.drop_packet(dpid, packet);
    }

    fn flood(&self, dpid: Dpid, packet: &PacketIn) {
        self.send(dpid, SwitchMessage::PacketOut(PacketOut::flood(packet)));
    }

    fn drop_packet(&self, dpid: Dpid, packet: &PacketIn) {
        if let Some(discard) = PacketOut::drop_buffer(packet) {
            self.send(dpid, SwitchMessage::PacketOut(discard));
        }
    }

    fn send(&self, dpid: Dpid, message: SwitchMessage) {
        if let Err(e) = self.switches.send(dpid, message) {
            log::error!("{}", e);
        }
    }
}

impl SwitchEventSink for Controller {
    fn connection_up(&mut self, dpid: Dpid, connection: Box<dyn SwitchConnection>, ports: Vec<PortDesc>) {
        for port in ports.iter().filter(|port| port.port_no.is_physical()) {
            self.port_weights.insert((dpid, port.port_no), weight_class(port.curr, self.config.default_port_weight));
        }

        let now_ms = self.clock.get_current_time_in_ms();
        match self.switches.connect(dpid, connection, ports, now_ms) {
            ConnectOutcome::New => log::info!("Switch {} connected.", dpid),
            ConnectOutcome::Reconnected => log::info!("Switch {} reconnected.", dpid),
            ConnectOutcome::Replaced => return,
        }
        self.topology.add_node(dpid);
    }

    fn connection_down(&mut self, dpid: Dpid, connection_id: ConnectionId) {
        if self.switches.disconnect(dpid, connection_id) == DisconnectOutcome::Released {
            log::info!("Switch {} disconnected.", dpid);
        }
    }

    fn packet_in(&mut self, dpid: Dpid, packet: PacketIn) {
        if !self.switches.is_connected(dpid) {
            log::debug!("Dropping packet from unknown switch {}.", dpid);
            return;
        }

        if packet.frame.is_lldp() {
            self.drop_packet(dpid, &packet);
            return;
        }

        let (src, dst) = (packet.frame.src, packet.frame.dst);
        self.learn(dpid, packet.in_port, src, dst);

        if dst.is_multicast() {
            log::debug!("Flood multicast from {}.", src);
            self.flood(dpid, &packet);
            return;
        }

        match self.mac_table.get(&dst).copied() {
            Some((dst_dpid, dst_port)) => self.install_path(dpid, dst_dpid, dst_port, &packet),
            None => {
                log::debug!("{} unknown -- flooding.", dst);
                self.flood(dpid, &packet);
            }
        }
    }

    fn link_event(&mut self, event: LinkEvent) {
        let LinkEvent { dpid1, port1, dpid2, port2, added } = event;

        if !added {
            if self.links.remove(&(dpid1, dpid2)).is_some() {
                self.topology.remove_link(dpid1, dpid2);
                log::info!("Link {}.{} -> {}.{} removed.", dpid1, port1, dpid2, port2);
            } else {
                log::warn!("Trying to remove link {} -> {}, which doesn't exist.", dpid1, dpid2);
            }
            return;
        }

        if !self.switches.is_connected(dpid1) || !self.switches.is_connected(dpid2) {
            log::warn!("Can't add link {}.{} -> {}.{}: switch doesn't exist.", dpid1, port1, dpid2, port2);
            return;
        }

        let weight = self.port_weight(dpid1, port1).min(self.port_weight(dpid2, port2));
        if let Err(e) = self.topology.add_link(dpid1, dpid2, weight) {
            log::warn!("Can't add link {}.{} -> {}.{}: {}", dpid1, port1, dpid2, port2, e);
            return;
        }

        self.links.insert((dpid1, dpid2), (port1, port2));
        log::info!("Link {}.{} -> {}.{} added with weight {}.", dpid1, port1, dpid2, port2, weight);
    }

    fn barrier_in(&mut self, dpid: Dpid, xid: Xid) {
        self.installer.on_barrier_reply(&self.switches, dpid, xid);
    }

    fn sweep(&mut self) {
        let expired = self.installer.sweep_expired(&self.switches);
        if expired > 0 {
            log::warn!("Discarded {} waiting path(s) past their setup deadline.", expired);
        }
    }
}
