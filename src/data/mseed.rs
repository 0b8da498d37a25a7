//! miniSEED 2.4 data records: a reader that backs [`MseedSource`] and the
//! [`MseedWriter`] used for exporting the visible window.
//!
//! Only uncompressed encodings are handled (INT16, INT32, FLOAT32, FLOAT64).
//! Every record must carry blockette 1000, which is where the encoding, word
//! order and record length live.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Timelike};

use crate::data::source::{DataSource, MemorySource, Segment, Trace};
use crate::data::stream_id::{pad_field, StreamId};
use crate::data::window::TimeWindow;
use crate::error::{Result, ViewerError};

const FIXED_HEADER_LEN: usize = 48;
const BLOCKETTE_1000_LEN: usize = 8;
/// Data starts on the first 64-byte boundary after header + blockette 1000.
const DATA_OFFSET: usize = 64;
/// BTIME and time-correction resolution.
const TICKS_PER_SECOND: f64 = 10_000.0;

/// SEED data encoding codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Int16,
    Int32,
    Float32,
    Float64,
}

impl Encoding {
    pub fn code(self) -> u8 {
        match self {
            Encoding::Int16 => 1,
            Encoding::Int32 => 3,
            Encoding::Float32 => 4,
            Encoding::Float64 => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Encoding::Int16),
            3 => Some(Encoding::Int32),
            4 => Some(Encoding::Float32),
            5 => Some(Encoding::Float64),
            _ => None,
        }
    }

    pub fn sample_size(self) -> usize {
        match self {
            Encoding::Int16 => 2,
            Encoding::Int32 | Encoding::Float32 => 4,
            Encoding::Float64 => 8,
        }
    }
}

/// One decoded data record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: StreamId,
    pub start: f64,
    pub sample_rate: f64,
    pub samples: Vec<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Time and sample-rate fields
// ─────────────────────────────────────────────────────────────────────────────

/// Encode epoch seconds as the 10-byte big-endian BTIME structure.
fn encode_btime(t: f64) -> std::result::Result<[u8; 10], String> {
    let ticks = (t * TICKS_PER_SECOND).round() as i64;
    let secs = ticks.div_euclid(TICKS_PER_SECOND as i64);
    let frac = ticks.rem_euclid(TICKS_PER_SECOND as i64) as u16;
    let dt = chrono::DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| format!("timestamp {t} out of range"))?;
    let mut out = [0u8; 10];
    out[0..2].copy_from_slice(&(dt.year() as u16).to_be_bytes());
    out[2..4].copy_from_slice(&(dt.ordinal() as u16).to_be_bytes());
    out[4] = dt.hour() as u8;
    out[5] = dt.minute() as u8;
    out[6] = dt.second() as u8;
    out[8..10].copy_from_slice(&frac.to_be_bytes());
    Ok(out)
}

fn decode_btime(b: &[u8], big_endian: bool) -> std::result::Result<f64, String> {
    let year = read_u16(&b[0..2], big_endian);
    let day = read_u16(&b[2..4], big_endian);
    let (hour, minute, second) = (b[4] as u32, b[5] as u32, b[6] as u32);
    let ticks = read_u16(&b[8..10], big_endian);
    // A leap second is stored as second 60.
    let (second, leap) = if second == 60 { (59, 1.0) } else { (second, 0.0) };
    let dt = NaiveDate::from_yo_opt(year as i32, day as u32)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| format!("invalid start time {year}-{day:03} {hour}:{minute}:{second}"))?;
    Ok(dt.and_utc().timestamp() as f64 + leap + ticks as f64 / TICKS_PER_SECOND)
}

/// Express `rate` as a SEED sample-rate factor and multiplier.
pub fn rate_to_factor_multiplier(rate: f64) -> std::result::Result<(i16, i16), String> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(format!("invalid sample rate {rate}"));
    }
    let max = i16::MAX as f64;
    if rate >= 1.0 && rate.fract() == 0.0 && rate <= max {
        return Ok((rate as i16, 1));
    }
    let period = 1.0 / rate;
    if rate < 1.0 && (period - period.round()).abs() < 1e-9 && period.round() <= max {
        return Ok((-(period.round() as i16), 1));
    }
    // rate = factor / divisor, with the finest divisor that still fits.
    for divisor in [10_000.0, 1_000.0, 100.0, 10.0, 1.0] {
        let factor = (rate * divisor).round();
        if factor >= 1.0 && factor <= max {
            return Ok((factor as i16, -(divisor as i16)));
        }
    }
    Err(format!("sample rate {rate} cannot be represented"))
}

pub fn factor_multiplier_to_rate(factor: i16, multiplier: i16) -> f64 {
    let (f, m) = (factor as f64, multiplier as f64);
    match (factor.signum(), multiplier.signum()) {
        (0, _) | (_, 0) => 0.0,
        (1, 1) => f * m,
        (1, -1) => -f / m,
        (-1, 1) => -m / f,
        _ => 1.0 / (f * m),
    }
}

fn read_u16(b: &[u8], big_endian: bool) -> u16 {
    let raw = [b[0], b[1]];
    if big_endian {
        u16::from_be_bytes(raw)
    } else {
        u16::from_le_bytes(raw)
    }
}

fn read_i16(b: &[u8], big_endian: bool) -> i16 {
    read_u16(b, big_endian) as i16
}

fn read_i32(b: &[u8], big_endian: bool) -> i32 {
    let raw = [b[0], b[1], b[2], b[3]];
    if big_endian {
        i32::from_be_bytes(raw)
    } else {
        i32::from_le_bytes(raw)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reading
// ─────────────────────────────────────────────────────────────────────────────

/// Decode every data record in `bytes`.
pub fn read_records(bytes: &[u8]) -> std::result::Result<Vec<Record>, String> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset + FIXED_HEADER_LEN <= bytes.len() {
        let (record, record_len) = decode_record(&bytes[offset..])
            .map_err(|e| format!("record at byte {offset}: {e}"))?;
        if let Some(r) = record {
            records.push(r);
        }
        offset += record_len;
    }
    Ok(records)
}

/// Decode one record; returns `None` for records that carry no samples.
fn decode_record(b: &[u8]) -> std::result::Result<(Option<Record>, usize), String> {
    if !matches!(b[6], b'D' | b'R' | b'Q' | b'M') {
        return Err("not a miniSEED data record".to_string());
    }
    // Header byte order is not flagged anywhere; a sane year decides it.
    let plausible = |y: u16| (1900..=2100).contains(&y);
    let big_endian = if plausible(read_u16(&b[20..22], true)) {
        true
    } else if plausible(read_u16(&b[20..22], false)) {
        false
    } else {
        return Err("cannot determine header byte order".to_string());
    };

    let id = StreamId::from_header_fields(&b[18..20], &b[8..13], &b[13..15], &b[15..18]);
    let mut start = decode_btime(&b[20..30], big_endian)?;
    let n_samples = read_u16(&b[30..32], big_endian) as usize;
    let rate = factor_multiplier_to_rate(read_i16(&b[32..34], big_endian), read_i16(&b[34..36], big_endian));
    let activity_flags = b[36];
    let n_blockettes = b[39];
    let correction = read_i32(&b[40..44], big_endian);
    let data_offset = read_u16(&b[44..46], big_endian) as usize;
    let mut blockette = read_u16(&b[46..48], big_endian) as usize;

    // Bit 1 set means the correction was already applied to the start time.
    if activity_flags & 0x02 == 0 {
        start += correction as f64 / TICKS_PER_SECOND;
    }

    let mut b1000 = None;
    for _ in 0..n_blockettes {
        if blockette == 0 || blockette + 4 > b.len() {
            break;
        }
        let kind = read_u16(&b[blockette..blockette + 2], big_endian);
        if kind == 1000 {
            if blockette + BLOCKETTE_1000_LEN > b.len() {
                return Err("truncated blockette 1000".to_string());
            }
            b1000 = Some((b[blockette + 4], b[blockette + 5], b[blockette + 6]));
            break;
        }
        blockette = read_u16(&b[blockette + 2..blockette + 4], big_endian) as usize;
    }
    let (encoding_code, word_order, exponent) =
        b1000.ok_or_else(|| "missing blockette 1000".to_string())?;
    if !(7..=20).contains(&exponent) {
        return Err(format!("invalid record length exponent {exponent}"));
    }
    let record_len = 1usize << exponent;
    if record_len > b.len() {
        return Err(format!("truncated record: need {record_len} bytes"));
    }
    if n_samples == 0 {
        return Ok((None, record_len));
    }
    if rate <= 0.0 {
        return Err("record has samples but no sample rate".to_string());
    }
    let encoding = Encoding::from_code(encoding_code)
        .ok_or_else(|| format!("unsupported encoding {encoding_code}"))?;
    let data_end = data_offset + n_samples * encoding.sample_size();
    if data_offset < FIXED_HEADER_LEN || data_end > record_len {
        return Err("sample data exceeds record".to_string());
    }
    let samples = decode_samples(&b[data_offset..data_end], encoding, word_order == 1);
    Ok((
        Some(Record {
            id,
            start,
            sample_rate: rate,
            samples,
        }),
        record_len,
    ))
}

fn decode_samples(data: &[u8], encoding: Encoding, big_endian: bool) -> Vec<f64> {
    let size = encoding.sample_size();
    data.chunks_exact(size)
        .map(|c| match encoding {
            Encoding::Int16 => read_i16(c, big_endian) as f64,
            Encoding::Int32 => read_i32(c, big_endian) as f64,
            Encoding::Float32 => {
                let raw = [c[0], c[1], c[2], c[3]];
                let v = if big_endian {
                    f32::from_be_bytes(raw)
                } else {
                    f32::from_le_bytes(raw)
                };
                v as f64
            }
            Encoding::Float64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(c);
                if big_endian {
                    f64::from_be_bytes(raw)
                } else {
                    f64::from_le_bytes(raw)
                }
            }
        })
        .collect()
}

/// Join the records of each channel into one contiguous trace.
///
/// Records are ordered by start time; a record extends the trace when it
/// begins within half a sample of where the trace ends and shares its rate.
/// Anything after the first gap or rate change is dropped.
pub fn merge_records(records: Vec<Record>) -> BTreeMap<String, Trace> {
    let mut by_channel: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for r in records {
        by_channel.entry(r.id.to_string()).or_default().push(r);
    }
    let mut traces = BTreeMap::new();
    for (channel, mut recs) in by_channel {
        recs.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut iter = recs.into_iter();
        let Some(first) = iter.next() else { continue };
        let mut trace = Trace::new(first.start, first.sample_rate, first.samples);
        for rec in iter {
            let expected = trace.start + trace.samples.len() as f64 / trace.sample_rate;
            let same_rate = (rec.sample_rate - trace.sample_rate).abs() <= 1e-9 * trace.sample_rate;
            if same_rate && (rec.start - expected).abs() <= 0.5 / trace.sample_rate {
                trace.samples.extend(rec.samples);
            } else {
                log::warn!(
                    "{channel}: discontinuity at {:.4} (expected {:.4}), keeping the first contiguous run",
                    rec.start,
                    expected
                );
                break;
            }
        }
        traces.insert(channel, trace);
    }
    traces
}

/// A miniSEED file loaded into memory.
#[derive(Debug, Clone)]
pub struct MseedSource {
    inner: MemorySource,
}

impl MseedSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ViewerError::data_load(path, e))?;
        let records = read_records(&bytes).map_err(|e| ViewerError::data_load(path, e))?;
        if records.is_empty() {
            return Err(ViewerError::data_load(path, "no data records"));
        }
        let mut inner = MemorySource::new();
        for (channel, trace) in merge_records(records) {
            inner.insert(channel, trace)?;
        }
        log::info!(
            "loaded {} channel(s) from {}",
            inner.list_channels().len(),
            path.display()
        );
        Ok(Self { inner })
    }
}

impl DataSource for MseedSource {
    fn list_channels(&self) -> Vec<String> {
        self.inner.list_channels()
    }

    fn fetch_segment(&self, channel: &str, window: Option<TimeWindow>) -> Result<Segment> {
        self.inner.fetch_segment(channel, window)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Writing
// ─────────────────────────────────────────────────────────────────────────────

/// Persists a fetched segment.
pub trait SegmentWriter {
    fn write(&self, segment: &Segment, channel: &str, path: &Path) -> Result<()>;
}

/// Writes big-endian miniSEED 2.4 data records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MseedWriter {
    pub record_length: usize,
    pub encoding: Encoding,
}

impl Default for MseedWriter {
    fn default() -> Self {
        Self {
            record_length: 256,
            encoding: Encoding::Int32,
        }
    }
}

impl MseedWriter {
    pub fn new(record_length: usize, encoding: Encoding) -> Self {
        Self {
            record_length,
            encoding,
        }
    }

    /// Samples that fit in one record.
    pub fn samples_per_record(&self) -> usize {
        (self.record_length - DATA_OFFSET) / self.encoding.sample_size()
    }

    /// Encode `segment` as a byte stream of records.
    pub fn encode(&self, segment: &Segment, channel: &str) -> std::result::Result<Vec<u8>, String> {
        if !self.record_length.is_power_of_two() || !(256..=4096).contains(&self.record_length) {
            return Err(format!("unsupported record length {}", self.record_length));
        }
        if segment.samples.is_empty() {
            return Err("segment has no samples".to_string());
        }
        let (factor, multiplier) = rate_to_factor_multiplier(segment.sample_rate)?;
        let id = StreamId::parse(channel);
        let exponent = self.record_length.trailing_zeros() as u8;
        let per_record = self.samples_per_record();

        let mut out = Vec::with_capacity(
            segment.samples.len().div_ceil(per_record) * self.record_length,
        );
        for (seq, chunk) in segment.samples.chunks(per_record).enumerate() {
            let first = seq * per_record;
            let start = segment.start + first as f64 / segment.sample_rate;
            let mut rec = vec![0u8; self.record_length];

            rec[0..6].copy_from_slice(format!("{:06}", (seq + 1) % 1_000_000).as_bytes());
            rec[6] = b'D';
            rec[7] = b' ';
            rec[8..13].copy_from_slice(&pad_field(&id.station, 5));
            rec[13..15].copy_from_slice(&pad_field(&id.location, 2));
            rec[15..18].copy_from_slice(&pad_field(&id.channel, 3));
            rec[18..20].copy_from_slice(&pad_field(&id.network, 2));
            rec[20..30].copy_from_slice(&encode_btime(start)?);
            rec[30..32].copy_from_slice(&(chunk.len() as u16).to_be_bytes());
            rec[32..34].copy_from_slice(&factor.to_be_bytes());
            rec[34..36].copy_from_slice(&multiplier.to_be_bytes());
            rec[39] = 1;
            rec[44..46].copy_from_slice(&(DATA_OFFSET as u16).to_be_bytes());
            rec[46..48].copy_from_slice(&(FIXED_HEADER_LEN as u16).to_be_bytes());

            let b = FIXED_HEADER_LEN;
            rec[b..b + 2].copy_from_slice(&1000u16.to_be_bytes());
            rec[b + 4] = self.encoding.code();
            rec[b + 5] = 1;
            rec[b + 6] = exponent;

            for (i, v) in chunk.iter().enumerate() {
                let at = DATA_OFFSET + i * self.encoding.sample_size();
                self.encode_sample(*v, &mut rec[at..at + self.encoding.sample_size()])
                    .map_err(|e| format!("sample {}: {e}", first + i))?;
            }
            out.extend_from_slice(&rec);
        }
        Ok(out)
    }

    fn encode_sample(&self, v: f64, dst: &mut [u8]) -> std::result::Result<(), String> {
        if !v.is_finite() {
            return Err(format!("non-finite value {v}"));
        }
        match self.encoding {
            Encoding::Int16 => {
                let r = v.round();
                if r < i16::MIN as f64 || r > i16::MAX as f64 {
                    return Err(format!("{v} out of INT16 range"));
                }
                dst.copy_from_slice(&(r as i16).to_be_bytes());
            }
            Encoding::Int32 => {
                let r = v.round();
                if r < i32::MIN as f64 || r > i32::MAX as f64 {
                    return Err(format!("{v} out of INT32 range"));
                }
                dst.copy_from_slice(&(r as i32).to_be_bytes());
            }
            Encoding::Float32 => dst.copy_from_slice(&(v as f32).to_be_bytes()),
            Encoding::Float64 => dst.copy_from_slice(&v.to_be_bytes()),
        }
        Ok(())
    }
}

impl SegmentWriter for MseedWriter {
    fn write(&self, segment: &Segment, channel: &str, path: &Path) -> Result<()> {
        let export_err = |reason: String| ViewerError::Export {
            channel: channel.to_string(),
            path: path.to_path_buf(),
            reason,
        };
        let bytes = self.encode(segment, channel).map_err(export_err)?;
        std::fs::write(path, bytes).map_err(|e| export_err(e.to_string()))?;
        log::info!(
            "exported {} sample(s) of {channel} to {}",
            segment.samples.len(),
            path.display()
        );
        Ok(())
    }
}
