//! The on-disk/on-wire encoding for a [`Message`].
//!
//! Encoding is `u32` frame count, then for each frame a `u32` big-endian
//! length followed by the raw bytes. Disk records (`.req`/`.rep` files)
//! are exactly one encoded message with no outer framing — the file
//! boundary *is* the message boundary. Network traffic additionally
//! wraps this in a `u32` length prefix so a stream of messages can be
//! split apart; [`MessageCodec`] implements that outer framing as a
//! `tokio_util` codec, grounded on the length-prefixed `Framed` pattern
//! this corpus uses for its reference broker daemon.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Error;
use crate::message::{Frame, Message};

/// Encode a message body (frame count + length-prefixed frames), with no
/// outer length prefix. Used directly for `.req`/`.rep` disk records.
#[must_use]
pub fn encode(msg: &Message) -> Bytes {
    let frames = msg.frames();
    let mut buf = BytesMut::with_capacity(4 + frames.iter().map(|f| 4 + f.len()).sum::<usize>());
    buf.put_u32(u32::try_from(frames.len()).expect("frame count fits in u32"));
    for frame in frames {
        buf.put_u32(u32::try_from(frame.len()).expect("frame length fits in u32"));
        buf.put_slice(frame);
    }
    buf.freeze()
}

/// Decode a message body previously produced by [`encode`]. Errors if the
/// buffer is truncated or has trailing bytes after the last frame.
pub fn decode(mut buf: &[u8]) -> Result<Message, Error> {
    if buf.len() < 4 {
        return Err(Error::Malformed("truncated frame count".into()));
    }
    let frame_count = buf.get_u32() as usize;
    let mut frames = Vec::with_capacity(frame_count);
    for _ in 0..frame_count {
        if buf.len() < 4 {
            return Err(Error::Malformed("truncated frame length".into()));
        }
        let len = buf.get_u32() as usize;
        if buf.len() < len {
            return Err(Error::Malformed("truncated frame body".into()));
        }
        let (frame, rest) = buf.split_at(len);
        frames.push(Frame::copy_from_slice(frame));
        buf = rest;
    }
    if !buf.is_empty() {
        return Err(Error::Malformed("trailing bytes after last frame".into()));
    }
    Ok(Message(frames))
}

/// Length-prefixed framing for [`Message`] over a byte stream: a `u32`
/// total length, then the [`encode`]d body.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageCodec {
    next_len: Option<u32>,
}

impl MessageCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, Error> {
        let len = match self.next_len {
            Some(len) => len,
            None => {
                if src.len() < 4 {
                    return Ok(None);
                }
                let len = (&src[..4]).get_u32();
                src.advance(4);
                self.next_len = Some(len);
                len
            }
        };

        if src.len() < len as usize {
            src.reserve(len as usize - src.len());
            return Ok(None);
        }

        let body = src.split_to(len as usize);
        self.next_len = None;
        decode(&body).map(Some)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Error> {
        let body = encode(&item);
        dst.put_u32(u32::try_from(body.len()).map_err(|_| Error::Malformed("message too large".into()))?);
        dst.put_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn encode_decode_round_trip() {
        let msg = Message::from_strs(["echo", "hello", "world"]);
        let bytes = encode(&msg);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn empty_message_round_trips() {
        let msg = Message::new();
        let bytes = encode(&msg);
        assert_eq!(decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let msg = Message::from_strs(["a", "bc"]);
        let bytes = encode(&msg);
        assert!(decode(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn codec_splits_stream_into_messages() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(Message::from_strs(["a"]), &mut buf)
            .unwrap();
        codec
            .encode(Message::from_strs(["b", "c"]), &mut buf)
            .unwrap();

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first, Message::from_strs(["a"]));
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second, Message::from_strs(["b", "c"]));
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn codec_waits_for_more_bytes_on_partial_frame() {
        let mut codec = MessageCodec::new();
        let mut full = BytesMut::new();
        codec
            .encode(Message::from_strs(["hello", "world"]), &mut full)
            .unwrap();

        let mut partial = BytesMut::from(&full[..full.len() - 2]);
        assert!(codec.decode(&mut partial).unwrap().is_none());
    }
}
