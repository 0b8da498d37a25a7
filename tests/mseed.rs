use seisview::data::mseed::{read_records, Encoding};
use seisview::{
    DataSource, MemorySource, MseedSource, MseedWriter, Segment, SegmentWriter, TimeWindow,
    ViewerConfig, ViewerError, WaveformViewport,
};

const T0: f64 = 1_600_000_000.0;
const CHANNEL: &str = "XX.STA.00.BHZ";

fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| ((i as f64 * 0.05).sin() * 1000.0).round())
        .collect()
}

fn segment(start: f64, rate: f64, samples: Vec<f64>) -> Segment {
    let end = start + (samples.len() - 1) as f64 / rate;
    Segment {
        samples,
        start,
        end,
        sample_rate: rate,
        extent: TimeWindow::new(start, end),
    }
}

#[test]
fn written_file_reads_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wave.mseed");
    let seg = segment(T0, 20.0, wave(500));
    MseedWriter::default().write(&seg, CHANNEL, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len() % 256, 0);
    assert_eq!(bytes.len(), 256 * 11); // ceil(500 / 48)

    let src = MseedSource::open(&path).unwrap();
    assert_eq!(src.list_channels(), vec![CHANNEL.to_string()]);
    let back = src.fetch_segment(CHANNEL, None).unwrap();
    assert_eq!(back.samples, seg.samples);
    assert_eq!(back.sample_rate, 20.0);
    assert!((back.start - T0).abs() < 1e-4);
    assert!((back.end - seg.end).abs() < 1e-4);
}

#[test]
fn header_fields_carry_the_stream_id() {
    let seg = segment(T0, 100.0, wave(10));
    let bytes = MseedWriter::default().encode(&seg, "IU.ANMO.10.BHZ").unwrap();
    assert_eq!(&bytes[8..13], b"ANMO ");
    assert_eq!(&bytes[13..15], b"10");
    assert_eq!(&bytes[15..18], b"BHZ");
    assert_eq!(&bytes[18..20], b"IU");
    let recs = read_records(&bytes).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].id.to_string(), "IU.ANMO.10.BHZ");
}

#[test]
fn float_encodings_round_trip() {
    let samples = vec![0.5, -1.25, 3.0e6, 42.0];
    let seg = segment(T0, 0.1, samples.clone());
    for encoding in [Encoding::Float32, Encoding::Float64] {
        let bytes = MseedWriter::new(512, encoding).encode(&seg, CHANNEL).unwrap();
        let recs = read_records(&bytes).unwrap();
        assert_eq!(recs[0].samples, samples);
        assert!((recs[0].sample_rate - 0.1).abs() < 1e-12);
    }
}

#[test]
fn gap_keeps_first_contiguous_run() {
    let writer = MseedWriter::default();
    let mut bytes = writer.encode(&segment(T0, 1.0, wave(60)), CHANNEL).unwrap();
    bytes.extend(writer.encode(&segment(T0 + 500.0, 1.0, wave(60)), CHANNEL).unwrap());
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gappy.mseed");
    std::fs::write(&path, bytes).unwrap();

    let src = MseedSource::open(&path).unwrap();
    let seg = src.fetch_segment(CHANNEL, None).unwrap();
    assert_eq!(seg.samples.len(), 60);
    assert_eq!(seg.extent, TimeWindow::new(T0, T0 + 59.0));
}

#[test]
fn unreadable_input_is_a_data_load_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.mseed");
    assert!(matches!(MseedSource::open(&missing), Err(ViewerError::DataLoad { .. })));

    let junk = dir.path().join("junk.mseed");
    std::fs::write(&junk, vec![b'x'; 512]).unwrap();
    assert!(matches!(MseedSource::open(&junk), Err(ViewerError::DataLoad { .. })));

    let mut vp = WaveformViewport::new(ViewerConfig::default()).unwrap();
    assert!(matches!(vp.load_data(&missing), Err(ViewerError::DataLoad { .. })));
    assert!(!vp.has_data());
}

#[test]
fn load_data_then_view() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wave.mseed");
    MseedWriter::default()
        .write(&segment(T0, 20.0, wave(200)), CHANNEL, &path)
        .unwrap();

    let mut vp = WaveformViewport::new(ViewerConfig::with_slots(2)).unwrap();
    vp.load_data(&path).unwrap();
    assert_eq!(vp.list_channels().unwrap(), vec![CHANNEL.to_string()]);
    assert!(vp.toggle_channel(CHANNEL, None).unwrap());
    let w = vp.window().unwrap();
    assert!((w.start - T0).abs() < 1e-4);
    assert!((w.duration() - 199.0 / 20.0).abs() < 1e-4);
}

#[test]
fn export_writes_only_the_visible_window() {
    let src = MemorySource::new()
        .with_channel(CHANNEL, T0, 1.0, wave(1001))
        .unwrap();
    let mut vp = WaveformViewport::new(ViewerConfig::with_slots(1)).unwrap();
    vp.set_source(Box::new(src.clone()));
    let seg = src
        .fetch_segment(CHANNEL, Some(TimeWindow::new(T0 + 400.0, T0 + 600.0)))
        .unwrap();
    vp.display_channel(CHANNEL, &seg, None).unwrap();

    let dir = tempfile::tempdir().expect("tempdir");
    let written = vp
        .export_channel(CHANNEL, dir.path().join("cut"))
        .unwrap()
        .expect("channel is visible");
    assert_eq!(written.extension().and_then(|e| e.to_str()), Some("mseed"));

    let back = MseedSource::open(&written).unwrap();
    let out = back.fetch_segment(CHANNEL, None).unwrap();
    assert_eq!(out.samples.len(), 201);
    assert_eq!(out.samples, seg.samples);
    assert!((out.start - (T0 + 400.0)).abs() < 1e-4);
}

#[test]
fn export_keeps_an_explicit_extension() {
    let src = MemorySource::new()
        .with_channel("A", T0, 1.0, wave(10))
        .unwrap();
    let mut vp = WaveformViewport::new(ViewerConfig::with_slots(1)).unwrap();
    vp.set_source(Box::new(src));
    vp.toggle_channel("A", None).unwrap();
    let dir = tempfile::tempdir().expect("tempdir");
    let written = vp.export_channel("A", dir.path().join("a.msd")).unwrap().unwrap();
    assert_eq!(written, dir.path().join("a.msd"));
    assert!(written.exists());
}

#[test]
fn export_of_hidden_channel_is_a_no_op() {
    let src = MemorySource::new()
        .with_channel("A", T0, 1.0, wave(10))
        .unwrap();
    let mut vp = WaveformViewport::new(ViewerConfig::with_slots(1)).unwrap();
    vp.set_source(Box::new(src));
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("a");
    assert_eq!(vp.export_channel("A", &target).unwrap(), None);
    assert!(!target.with_extension("mseed").exists());
}

#[test]
fn writer_failure_is_an_export_error() {
    let src = MemorySource::new()
        .with_channel("A", T0, 1.0, wave(10))
        .unwrap();
    let mut vp = WaveformViewport::new(ViewerConfig::with_slots(1)).unwrap();
    vp.set_source(Box::new(src));
    vp.toggle_channel("A", None).unwrap();
    let dir = tempfile::tempdir().expect("tempdir");
    let bad = dir.path().join("no").join("such").join("dir").join("a");
    assert!(matches!(vp.export_channel("A", &bad), Err(ViewerError::Export { .. })));
}
