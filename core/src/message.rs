//! The frame/message model shared by disk records and broker traffic.
//!
//! A [`Frame`] is one opaque byte buffer; a [`Message`] is an ordered,
//! owned sequence of frames. Nothing in this module interprets frame
//! contents except the handful of status-code helpers below, which exist
//! only to keep magic strings (`"200"`, `"shutdown"`, ...) in one place.

use bytes::Bytes;

pub type Frame = Bytes;

/// An ordered sequence of owned frames, moved into and out of the store
/// and the broker transport by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message(pub Vec<Frame>);

impl Message {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn single(frame: impl Into<Frame>) -> Self {
        Self(vec![frame.into()])
    }

    #[must_use]
    pub fn from_strs<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            frames
                .into_iter()
                .map(|s| Frame::copy_from_slice(s.as_ref().as_bytes()))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Frame> {
        self.0.first()
    }

    /// Remove and return the first frame, e.g. a service name or UUID.
    pub fn pop_front(&mut self) -> Option<Frame> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.remove(0))
        }
    }

    pub fn push_front(&mut self, frame: impl Into<Frame>) {
        self.0.insert(0, frame.into());
    }

    pub fn push_back(&mut self, frame: impl Into<Frame>) {
        self.0.push(frame.into());
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.0
    }

    /// Compare a frame's bytes against a UTF-8 literal without allocating
    /// a `String` for every status-code check.
    #[must_use]
    pub fn frame_is(frame: &Frame, s: &str) -> bool {
        frame.as_ref() == s.as_bytes()
    }
}

impl From<Vec<Frame>> for Message {
    fn from(frames: Vec<Frame>) -> Self {
        Self(frames)
    }
}

impl FromIterator<Frame> for Message {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Status codes exchanged on the client-visible protocol (§6.2).
pub mod status {
    pub const OK: &str = "200";
    pub const PENDING: &str = "300";
    pub const UNKNOWN: &str = "400";
    pub const ERROR: &str = "500";
    pub const NOT_FOUND: &str = "404";
}

/// The in-band sentinel that asks an endpoint to terminate its loop.
pub const SHUTDOWN: &str = "shutdown";
