//! Connection payload
//!
//! The value cached per source address: who sent the packet and which
//! destination port it targeted.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Source address and destination port of an observed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetFace {
    /// Source IP of the packet
    pub src_ip: IpAddr,
    /// Destination port of the packet
    pub dst_port: u16,
}

impl NetFace {
    /// Creates a new NetFace
    pub fn new(src_ip: IpAddr, dst_port: u16) -> Self {
        Self { src_ip, dst_port }
    }
}

impl fmt::Display for NetFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}}}", self.src_ip, self.dst_port)
    }
}
