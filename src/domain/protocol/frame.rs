use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::domain::utils::id::Dpid;

pub const ETH_TYPE_IPV4: u16 = 0x0800;
pub const ETH_TYPE_ARP: u16 = 0x0806;
pub const ETH_TYPE_LLDP: u16 = 0x88cc;

pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;

pub const ICMP_TYPE_DEST_UNREACH: u8 = 3;
pub const ICMP_CODE_UNREACH_HOST: u8 = 1;

/// Number of payload bytes of the offending datagram quoted back in an ICMP error.
const ICMP_QUOTED_PAYLOAD_LEN: usize = 8;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    /// Group bit of the first octet; broadcast is a multicast address too.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Address derived from the low 48 bits of a datapath id.
    pub fn from_dpid(dpid: Dpid) -> MacAddr {
        let bytes = dpid.0.to_be_bytes();
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&bytes[2..]);
        MacAddr(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", o[0], o[1], o[2], o[3], o[4], o[5])
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

/// Parsed layer-2 frame as delivered by the protocol library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetFrame {
    pub src: MacAddr,
    pub dst: MacAddr,
    pub vlan: Option<u16>,
    /// Ethertype after any VLAN tag.
    pub ether_type: u16,
    pub payload: FramePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramePayload {
    Ipv4(Ipv4Packet),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Packet {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub protocol: u8,
    pub tos: u8,
    /// Header length in 32-bit words.
    pub ihl: u8,
    pub payload: Ipv4Payload,
    /// The datagram as it was captured on the wire, header included. Empty for packets
    /// built by the controller.
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ipv4Payload {
    Tcp { src_port: u16, dst_port: u16 },
    Udp { src_port: u16, dst_port: u16 },
    Icmp { icmp_type: u8, code: u8, data: Vec<u8> },
    Other,
}

impl EthernetFrame {
    pub fn is_lldp(&self) -> bool {
        self.ether_type == ETH_TYPE_LLDP
    }

    pub fn ipv4(&self) -> Option<&Ipv4Packet> {
        match &self.payload {
            FramePayload::Ipv4(ip) if self.ether_type == ETH_TYPE_IPV4 => Some(ip),
            _ => None,
        }
    }

    /// Builds an ICMP host-unreachable reply to this frame, sourced from `from`.
    ///
    /// The reply swaps the IP addresses and quotes the original IP header plus the first
    /// eight payload bytes behind four zero bytes. Returns `None` for non-IPv4 frames.
    pub fn destination_unreachable(&self, from: MacAddr) -> Option<EthernetFrame> {
        let offending = self.ipv4()?;

        let quoted_len = (offending.ihl as usize * 4 + ICMP_QUOTED_PAYLOAD_LEN).min(offending.raw.len());
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&offending.raw[..quoted_len]);

        let reply_ip = Ipv4Packet {
            src: offending.dst,
            dst: offending.src,
            protocol: IP_PROTO_ICMP,
            tos: 0,
            ihl: 5,
            payload: Ipv4Payload::Icmp { icmp_type: ICMP_TYPE_DEST_UNREACH, code: ICMP_CODE_UNREACH_HOST, data },
            raw: Vec::new(),
        };

        Some(EthernetFrame { src: from, dst: self.src, vlan: None, ether_type: ETH_TYPE_IPV4, payload: FramePayload::Ipv4(reply_ip) })
    }
}
