//! JSON wire form of a [`Reading`].

use core::fmt::Write;

use heapless::String;

use crate::reading::Reading;

/// Fits any reading converted from 16-bit counts with room to spare.
pub const PAYLOAD_CAPACITY: usize = 64;

/// Content type declared for every payload.
pub const CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadError {
    /// Rendered text does not fit [`PAYLOAD_CAPACITY`].
    Capacity,
}

/// Serialized reading: `{"x":1.00, "y":-0.50, "z":0.00}`.
///
/// Field names and order are fixed by the collector schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payload {
    text: String<PAYLOAD_CAPACITY>,
}

impl Payload {
    pub fn encode(reading: &Reading) -> Result<Self, PayloadError> {
        let mut text = String::new();
        write!(
            text,
            "{{\"x\":{:.2}, \"y\":{:.2}, \"z\":{:.2}}}",
            reading.x, reading.y, reading.z
        )
        .map_err(|_| PayloadError::Capacity)?;
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
