//! SEED stream identifiers (`NET.STA.LOC.CHA`).

use std::fmt;

/// The four SEED codes that name a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StreamId {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl StreamId {
    /// Parse a dotted id. Anything that is not four dot-separated codes is
    /// treated as a bare station name, so arbitrary labels still round-trip
    /// through a record header as far as the field widths allow.
    pub fn parse(id: &str) -> Self {
        let parts: Vec<&str> = id.split('.').collect();
        if parts.len() == 4 {
            Self {
                network: parts[0].to_string(),
                station: parts[1].to_string(),
                location: parts[2].to_string(),
                channel: parts[3].to_string(),
            }
        } else {
            Self {
                station: id.to_string(),
                ..Default::default()
            }
        }
    }

    /// Build from the space-padded fixed-width header fields.
    pub fn from_header_fields(network: &[u8], station: &[u8], location: &[u8], channel: &[u8]) -> Self {
        let field = |b: &[u8]| String::from_utf8_lossy(b).trim().to_string();
        Self {
            network: field(network),
            station: field(station),
            location: field(location),
            channel: field(channel),
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

/// Left-justify `value` into a space-padded ASCII field of `width` bytes.
pub(crate) fn pad_field(value: &str, width: usize) -> Vec<u8> {
    let mut out: Vec<u8> = value
        .bytes()
        .filter(|b| b.is_ascii_graphic())
        .take(width)
        .collect();
    out.resize(width, b' ');
    out
}
