use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Numeric identifier tagged with the kind of thing it names.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Id<T> {
    pub id: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub const fn new(id: u64) -> Self {
        Id { id, _marker: PhantomData }
    }

    /// Returns the identifier following this one, wrapping at `u64::MAX`.
    pub fn next(self) -> Self {
        Id::new(self.id.wrapping_add(1))
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.trim_end_matches("Tag");

        write!(f, "{}: {}", display_name, self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct XidTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ConnectionTag;

/// Transaction id pairing a request with its reply on one switch connection.
pub type Xid = Id<XidTag>;
/// Generation counter of a switch connection; a reconnect gets a fresh one.
pub type ConnectionId = Id<ConnectionTag>;

/// Datapath identifier of a managed switch.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct Dpid(pub u64);

impl fmt::Display for Dpid {
    /// Formats the low 48 bits as dash separated hex octets, with the high 16 bits appended
    /// in decimal when set (`00-00-00-00-00-01`, `00-00-00-00-00-01|7`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        let octets: Vec<String> = bytes[2..].iter().map(|b| format!("{:02x}", b)).collect();
        write!(f, "{}", octets.join("-"))?;

        let high = self.0 >> 48;
        if high != 0 {
            write!(f, "|{}", high)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dpid: {}", self)
    }
}

/// Switch port number. Values above [`PortNo::MAX_PHYSICAL`] are reserved pseudo ports.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct PortNo(pub u16);

impl PortNo {
    pub const MAX_PHYSICAL: PortNo = PortNo(0xff00);
    pub const IN_PORT: PortNo = PortNo(0xfff8);
    pub const TABLE: PortNo = PortNo(0xfff9);
    pub const FLOOD: PortNo = PortNo(0xfffb);
    pub const NONE: PortNo = PortNo(0xffff);

    pub fn is_physical(&self) -> bool {
        *self <= Self::MAX_PHYSICAL
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
