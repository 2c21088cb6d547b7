use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::domain::protocol::frame::{EthernetFrame, Ipv4Payload, MacAddr};
use crate::domain::utils::id::PortNo;

/// Exact-match flow selector built from one observed frame.
///
/// `None` fields are wildcards. For ICMP the transport fields carry type and code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowMatch {
    pub in_port: Option<PortNo>,
    pub dl_src: MacAddr,
    pub dl_dst: MacAddr,
    pub dl_vlan: Option<u16>,
    pub dl_type: u16,
    pub nw_src: Option<Ipv4Addr>,
    pub nw_dst: Option<Ipv4Addr>,
    pub nw_proto: Option<u8>,
    pub nw_tos: Option<u8>,
    pub tp_src: Option<u16>,
    pub tp_dst: Option<u16>,
}

impl FlowMatch {
    pub fn from_frame(frame: &EthernetFrame, in_port: PortNo) -> FlowMatch {
        let mut flow_match = FlowMatch {
            in_port: Some(in_port),
            dl_src: frame.src,
            dl_dst: frame.dst,
            dl_vlan: frame.vlan,
            dl_type: frame.ether_type,
            nw_src: None,
            nw_dst: None,
            nw_proto: None,
            nw_tos: None,
            tp_src: None,
            tp_dst: None,
        };

        if let Some(ip) = frame.ipv4() {
            flow_match.nw_src = Some(ip.src);
            flow_match.nw_dst = Some(ip.dst);
            flow_match.nw_proto = Some(ip.protocol);
            flow_match.nw_tos = Some(ip.tos);

            let (tp_src, tp_dst) = match &ip.payload {
                Ipv4Payload::Tcp { src_port, dst_port } | Ipv4Payload::Udp { src_port, dst_port } => (Some(*src_port), Some(*dst_port)),
                Ipv4Payload::Icmp { icmp_type, code, .. } => (Some(*icmp_type as u16), Some(*code as u16)),
                Ipv4Payload::Other => (None, None),
            };
            flow_match.tp_src = tp_src;
            flow_match.tp_dst = tp_dst;
        }

        flow_match
    }

    /// Returns the selector of the reverse direction: source and destination swapped at
    /// every layer. The inbound port is cleared, each hop sets its own.
    pub fn flip(&self) -> FlowMatch {
        FlowMatch {
            in_port: None,
            dl_src: self.dl_dst,
            dl_dst: self.dl_src,
            dl_vlan: self.dl_vlan,
            dl_type: self.dl_type,
            nw_src: self.nw_dst,
            nw_dst: self.nw_src,
            nw_proto: self.nw_proto,
            nw_tos: self.nw_tos,
            tp_src: self.tp_dst,
            tp_dst: self.tp_src,
        }
    }

    pub fn with_in_port(&self, in_port: PortNo) -> FlowMatch {
        FlowMatch { in_port: Some(in_port), ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::protocol::frame::{ETH_TYPE_IPV4, FramePayload, IP_PROTO_TCP, Ipv4Packet};

    fn tcp_frame() -> EthernetFrame {
        EthernetFrame {
            src: MacAddr([0, 0, 0, 0, 0, 1]),
            dst: MacAddr([0, 0, 0, 0, 0, 2]),
            vlan: Some(10),
            ether_type: ETH_TYPE_IPV4,
            payload: FramePayload::Ipv4(Ipv4Packet {
                src: Ipv4Addr::new(192, 168, 0, 1),
                dst: Ipv4Addr::new(192, 168, 0, 2),
                protocol: IP_PROTO_TCP,
                tos: 0,
                ihl: 5,
                payload: Ipv4Payload::Tcp { src_port: 40000, dst_port: 80 },
                raw: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_from_frame_fills_all_layers() {
        let flow_match = FlowMatch::from_frame(&tcp_frame(), PortNo(3));

        assert_eq!(flow_match.in_port, Some(PortNo(3)));
        assert_eq!(flow_match.dl_vlan, Some(10));
        assert_eq!(flow_match.nw_proto, Some(IP_PROTO_TCP));
        assert_eq!(flow_match.tp_src, Some(40000));
        assert_eq!(flow_match.tp_dst, Some(80));
    }

    #[test]
    fn test_flip_swaps_sources_and_destinations() {
        let forward = FlowMatch::from_frame(&tcp_frame(), PortNo(3));
        let reverse = forward.flip();

        assert_eq!(reverse.in_port, None);
        assert_eq!(reverse.dl_src, forward.dl_dst);
        assert_eq!(reverse.dl_dst, forward.dl_src);
        assert_eq!(reverse.nw_src, forward.nw_dst);
        assert_eq!(reverse.nw_dst, forward.nw_src);
        assert_eq!(reverse.tp_src, Some(80));
        assert_eq!(reverse.tp_dst, Some(40000));
        assert_eq!(reverse.flip().with_in_port(PortNo(3)), forward);
    }
}
