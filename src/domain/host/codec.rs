use bytes::{Bytes, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use crate::domain::host::protocol::SwitchReport;
use crate::domain::protocol::message::SwitchMessage;

/// Combines LengthDelimitedCodec (TCP framing) with Bincode (Serialization).
///
/// `In` is decoded from the stream, `Out` is encoded onto it.
pub struct WireCodec<In, Out> {
    codec: LengthDelimitedCodec,
    _marker: PhantomData<fn(Out) -> In>,
}

/// Controller end of a switch connection.
pub type ControllerCodec = WireCodec<SwitchReport, SwitchMessage>;

/// Switch end of a switch connection.
pub type SwitchAgentCodec = WireCodec<SwitchMessage, SwitchReport>;

impl<In, Out> WireCodec<In, Out> {
    pub fn new() -> Self {
        Self { codec: LengthDelimitedCodec::new(), _marker: PhantomData }
    }
}

impl<In, Out> Default for WireCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In, Out: Serialize> Encoder<Out> for WireCodec<In, Out> {
    type Error = io::Error;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = bincode::serialize(&item).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.codec.encode(Bytes::from(bytes), dst)
    }
}

impl<In: DeserializeOwned, Out> Decoder for WireCodec<In, Out> {
    type Item = In;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.codec.decode(src)? {
            Some(bytes) => {
                let item = bincode::deserialize(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}
