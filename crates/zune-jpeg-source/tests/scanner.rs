/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::File;
use std::io::{BufReader, Cursor};

use zune_jpeg_source::errors::{DecodeErrors, SourceErrors};
use zune_jpeg_source::{
    BufferedByteSource, JpegScanner, MemorySource, Resync, SourceManager, SourceOptions,
    SourceReader
};

/// Builds jpeg byte streams segment by segment
#[derive(Default)]
struct JpegBuilder {
    bytes: Vec<u8>
}

impl JpegBuilder {
    fn new() -> JpegBuilder {
        let mut builder = JpegBuilder::default();
        builder.bytes.extend_from_slice(&[0xFF, 0xD8]);
        builder
    }

    fn segment(mut self, marker: u8, payload: &[u8]) -> JpegBuilder {
        let length = (payload.len() + 2) as u16;
        self.bytes.extend_from_slice(&[0xFF, marker]);
        self.bytes.extend_from_slice(&length.to_be_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    fn frame(self, sof: u8, width: u16, height: u16, components: u8) -> JpegBuilder {
        let mut payload = vec![8];
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.push(components);
        for id in 1..=components {
            payload.extend_from_slice(&[id, 0x11, 0]);
        }
        self.segment(0xC0 + sof, &payload)
    }

    fn scan(self, components: u8) -> JpegBuilder {
        let mut payload = vec![components];
        for id in 1..=components {
            payload.extend_from_slice(&[id, 0]);
        }
        payload.extend_from_slice(&[0, 63, 0]);
        self.segment(0xDA, &payload)
    }

    fn restart_interval(self, interval: u16) -> JpegBuilder {
        self.segment(0xDD, &interval.to_be_bytes())
    }

    fn raw(mut self, bytes: &[u8]) -> JpegBuilder {
        self.bytes.extend_from_slice(bytes);
        self
    }

    fn eoi(self) -> Vec<u8> {
        self.raw(&[0xFF, 0xD9]).bytes
    }
}

/// Counts how the scanner drives its source
struct Tracking<S> {
    inner:   S,
    inits:   usize,
    fills:   usize,
    skips:   usize,
    resyncs: usize,
    terms:   usize
}

impl<S: SourceManager> Tracking<S> {
    fn new(inner: S) -> Tracking<S> {
        Tracking {
            inner,
            inits: 0,
            fills: 0,
            skips: 0,
            resyncs: 0,
            terms: 0
        }
    }
}

impl<S: SourceManager> SourceManager for Tracking<S> {
    fn init_source(&mut self) -> Result<(), SourceErrors> {
        self.inits += 1;
        self.inner.init_source()
    }

    fn fill_input_buffer(&mut self) -> Result<bool, SourceErrors> {
        self.fills += 1;
        self.inner.fill_input_buffer()
    }

    fn skip_input_data(&mut self, num_bytes: usize) -> Result<(), SourceErrors> {
        self.skips += 1;
        self.inner.skip_input_data(num_bytes)
    }

    fn resync_to_restart(&mut self, marker: u8, desired: u8) -> Result<Resync, SourceErrors> {
        self.resyncs += 1;
        self.inner.resync_to_restart(marker, desired)
    }

    fn term_source(&mut self) {
        self.terms += 1;
        self.inner.term_source();
    }

    fn num_warnings(&self) -> usize {
        self.inner.num_warnings()
    }

    fn bytes_in_buffer(&self) -> usize {
        self.inner.bytes_in_buffer()
    }

    fn next_input_bytes(&self) -> &[u8] {
        self.inner.next_input_bytes()
    }

    fn consume(&mut self, num_bytes: usize) {
        self.inner.consume(num_bytes);
    }
}

/// A source that always asks the decoder to suspend
struct Suspending {
    fills: usize
}

impl SourceManager for Suspending {
    fn init_source(&mut self) -> Result<(), SourceErrors> {
        Ok(())
    }

    fn fill_input_buffer(&mut self) -> Result<bool, SourceErrors> {
        self.fills += 1;
        Ok(false)
    }

    fn skip_input_data(&mut self, _: usize) -> Result<(), SourceErrors> {
        Ok(())
    }

    fn term_source(&mut self) {}

    fn bytes_in_buffer(&self) -> usize {
        0
    }

    fn next_input_bytes(&self) -> &[u8] {
        &[]
    }

    fn consume(&mut self, _: usize) {}
}

fn small_buffer(size: usize) -> SourceOptions {
    SourceOptions::new().set_buffer_size(size)
}

#[test]
fn baseline_with_large_app_segment() {
    let data = JpegBuilder::new()
        .segment(0xE1, &vec![0xAB; 5000])
        .frame(0, 640, 480, 3)
        .restart_interval(4)
        .scan(3)
        .raw(&[0x11, 0x22, 0x33, 0xFF, 0xD0, 0x44, 0xFF, 0xD1, 0x55, 0x66])
        .eoi();

    let mut stream = Cursor::new(data);
    let source = BufferedByteSource::new_with_options(&mut stream, small_buffer(64));
    let mut scanner = JpegScanner::new(source);

    let summary = scanner.scan().unwrap();
    let info = scanner.info().unwrap();

    assert_eq!(info.width, 640);
    assert_eq!(info.height, 480);
    assert_eq!(info.components, 3);
    assert_eq!(info.precision, 8);
    assert_eq!(info.restart_interval, 4);
    assert!(!info.is_progressive());

    assert_eq!(summary.scans, 1);
    assert_eq!(summary.restarts, 2);
    assert_eq!(summary.resyncs, 0);
    assert_eq!(summary.entropy_bytes, 6);
    assert_eq!(summary.warnings, 0);
}

#[test]
fn headers_only() {
    let data = JpegBuilder::new()
        .segment(0xE0, b"JFIF\0\x01\x02\0\0\x01\0\x01\0\0")
        .segment(0xFE, b"a comment")
        .frame(0, 17, 9, 1)
        .scan(1)
        .eoi();

    let mut scanner = JpegScanner::new(MemorySource::new(&data));
    assert!(scanner.info().is_none());

    scanner.decode_headers().unwrap();
    let info = scanner.info().unwrap();

    assert_eq!((info.width, info.height, info.components), (17, 9, 1));
}

#[test]
fn stuffed_and_fill_bytes_in_entropy_data() {
    let data = JpegBuilder::new()
        .frame(0, 8, 8, 1)
        .scan(1)
        .raw(&[0x01, 0xFF, 0x00, 0x02, 0xFF, 0xFF])
        .eoi();

    // tiny buffers make every marker straddle a refill
    for size in [2, 3, 5, 4096] {
        let mut stream = Cursor::new(data.clone());
        let source = BufferedByteSource::new_with_options(&mut stream, small_buffer(size));
        let mut scanner = JpegScanner::new(source);

        let summary = scanner.scan().unwrap();
        assert_eq!(summary.entropy_bytes, 4, "buffer size {size}");
    }
}

#[test]
fn progressive_scans_with_tables_between() {
    let data = JpegBuilder::new()
        .frame(2, 32, 32, 1)
        .segment(0xC4, &[0; 17])
        .scan(1)
        .raw(&[1, 2])
        .segment(0xC4, &[0; 17])
        .scan(1)
        .raw(&[3])
        .eoi();

    let mut scanner = JpegScanner::new(MemorySource::new(&data));
    let summary = scanner.scan().unwrap();

    assert!(scanner.info().unwrap().is_progressive());
    assert_eq!(summary.scans, 2);
    assert_eq!(summary.entropy_bytes, 3);
}

#[test]
fn truncated_entropy_data_completes_with_warning() {
    let data = JpegBuilder::new()
        .frame(0, 8, 8, 1)
        .scan(1)
        .raw(&[1, 2, 3])
        .bytes;

    let mut stream = Cursor::new(data);
    let mut scanner = JpegScanner::new(BufferedByteSource::new(&mut stream));

    let summary = scanner.scan().unwrap();
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.entropy_bytes, 3);
}

#[test]
fn truncated_strict_mode_fails() {
    let data = JpegBuilder::new()
        .frame(0, 8, 8, 1)
        .scan(1)
        .raw(&[1, 2, 3])
        .bytes;

    let mut stream = Cursor::new(data);
    let options = SourceOptions::new().set_strict_mode(true);
    let mut scanner = JpegScanner::new(BufferedByteSource::new_with_options(&mut stream, options));

    let err = scanner.scan().unwrap_err();
    assert!(matches!(err, DecodeErrors::Source(SourceErrors::TruncatedStream)));
}

#[test]
fn truncated_inside_skipped_segment() {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x03, 0xE8];
    data.extend_from_slice(&[0; 10]);

    let mut stream = Cursor::new(data);
    let source = BufferedByteSource::new_with_options(&mut stream, small_buffer(8));
    let mut scanner = JpegScanner::new(source);

    let err = scanner.decode_headers().unwrap_err();
    assert!(matches!(err, DecodeErrors::FormatStatic("Premature End of image")));
    assert_eq!(scanner.source().num_warnings(), 1);
}

#[test]
fn empty_stream() {
    let mut stream = Cursor::new(Vec::<u8>::new());
    let mut scanner = JpegScanner::new(BufferedByteSource::new(&mut stream));

    let err = scanner.scan().unwrap_err();
    assert!(matches!(err, DecodeErrors::Source(SourceErrors::EmptyStream)));
}

#[test]
fn missing_restart_marker_is_resynced() {
    let data = JpegBuilder::new()
        .frame(0, 16, 16, 1)
        .restart_interval(1)
        .scan(1)
        .raw(&[1, 0xFF, 0xD0, 2, 0xFF, 0xD2, 3])
        .eoi();

    let mut scanner = JpegScanner::new(Tracking::new(MemorySource::new(&data)));
    let summary = scanner.scan().unwrap();

    // RST1 went missing, RST2 is kept and accepted on the next interval
    assert_eq!(summary.restarts, 2);
    assert_eq!(summary.resyncs, 1);

    let tracking = scanner.into_inner();
    assert_eq!(tracking.resyncs, 1);
}

#[test]
fn stale_restart_marker_scans_forward() {
    let data = JpegBuilder::new()
        .frame(0, 16, 16, 1)
        .restart_interval(1)
        .scan(1)
        .raw(&[1, 0xFF, 0xD0, 2, 0xFF, 0xD0, 3, 0xFF, 0xD1, 4])
        .eoi();

    let mut scanner = JpegScanner::new(MemorySource::new(&data));
    let summary = scanner.scan().unwrap();

    assert_eq!(summary.restarts, 1);
    assert_eq!(summary.resyncs, 1);
}

#[test]
fn source_lifecycle() {
    let data = JpegBuilder::new()
        .segment(0xE2, &[7; 300])
        .frame(0, 8, 8, 1)
        .scan(1)
        .raw(&[9; 40])
        .eoi();

    let mut scanner = JpegScanner::new(Tracking::new(MemorySource::new(&data)));
    scanner.decode_headers().unwrap();
    scanner.scan().unwrap();
    // a finished scanner returns the same summary without touching the source
    scanner.scan().unwrap();

    let tracking = scanner.into_inner();
    assert_eq!(tracking.inits, 1);
    assert_eq!(tracking.terms, 1);
    assert_eq!(tracking.fills, 1);
    // APP2, SOF0 component table and the SOS tail
    assert_eq!(tracking.skips, 3);
}

#[test]
fn scan_a_file_on_disk() {
    let data = JpegBuilder::new()
        .segment(0xE1, &vec![0x5A; 9000])
        .frame(1, 1920, 1080, 3)
        .scan(3)
        .raw(&vec![0x42; 20_000])
        .eoi();

    let path = std::env::temp_dir().join(format!("zune-jpeg-source-{}.jpg", std::process::id()));
    std::fs::write(&path, &data).unwrap();

    let mut file = BufReader::new(File::open(&path).unwrap());
    let mut scanner = JpegScanner::new(BufferedByteSource::new(&mut file));

    let summary = scanner.scan().unwrap();
    let info = scanner.info().unwrap();
    drop(scanner);

    std::fs::remove_file(&path).unwrap();

    assert_eq!((info.width, info.height, info.sof), (1920, 1080, 1));
    assert_eq!(summary.entropy_bytes, 20_000);
    assert_eq!(summary.warnings, 0);
}

#[test]
fn suspending_source_is_an_error() {
    let mut source = Suspending { fills: 0 };

    let err = SourceReader::new(&mut source).get_u8_err().unwrap_err();
    assert!(matches!(err, SourceErrors::Suspended));
    assert_eq!(source.fills, 1);

    let mut scanner = JpegScanner::new(Suspending { fills: 0 });
    let err = scanner.scan().unwrap_err();

    assert!(matches!(err, DecodeErrors::Source(SourceErrors::Suspended)));
    assert_eq!(scanner.into_inner().fills, 1);
}

#[test]
fn jpg_marker_between_scans_is_skipped() {
    let data = JpegBuilder::new()
        .frame(2, 16, 16, 1)
        .scan(1)
        .raw(&[1, 2])
        .segment(0xC8, &[0; 4])
        .scan(1)
        .raw(&[3])
        .eoi();

    let mut scanner = JpegScanner::new(MemorySource::new(&data));
    let summary = scanner.scan().unwrap();

    assert_eq!(summary.scans, 2);
    assert_eq!(summary.entropy_bytes, 3);
}
