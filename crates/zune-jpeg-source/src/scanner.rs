/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A marker level walk over a jpeg image.
//!
//! The scanner pulls bytes through a [`SourceManager`] the same way a full
//! decoder does, but instead of decoding pixels it records the frame header
//! and counts scans, restart intervals and entropy coded bytes.
use crate::errors::{DecodeErrors, SourceErrors};
use crate::marker::Marker;
use crate::reader::{ensure_input, SourceReader};
use crate::restart::{next_marker, Resync};
use crate::source::SourceManager;

/// Frame information gathered from the headers
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImageInfo {
    pub width:            u16,
    pub height:           u16,
    pub components:       u8,
    /// Sample precision in bits
    pub precision:        u8,
    /// The `n` of the `SOFn` marker describing the frame
    pub sof:              u8,
    /// MCUs per restart interval, zero when there is no DRI segment
    pub restart_interval: u16
}

impl ImageInfo {
    /// Whether the frame uses progressive coding
    #[must_use]
    pub const fn is_progressive(&self) -> bool {
        matches!(self.sof, 2 | 6 | 10 | 14)
    }
}

/// What a full walk over the image found
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
    /// Number of SOS segments
    pub scans:         usize,
    /// Restart markers that arrived in the expected order
    pub restarts:      usize,
    /// Times the restart sequence had to be resynchronised
    pub resyncs:       usize,
    /// Bytes of entropy coded data, stuffed zeros included
    pub entropy_bytes: usize,
    /// Warnings the source emitted, non zero means the stream was truncated
    pub warnings:      usize
}

/// Walks the markers of a jpeg image through a [`SourceManager`].
///
/// The source is injected on construction and owned for the session,
/// use [`into_inner`](Self::into_inner) to get it back.
///
/// # Example
/// ```
/// use zune_jpeg_source::{JpegScanner, MemorySource};
///
/// let data = [
///     0xFF, 0xD8, // SOI
///     0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, // SOF0
///     0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, // SOS
///     0x12, 0x34, // entropy coded data
///     0xFF, 0xD9 // EOI
/// ];
/// let mut scanner = JpegScanner::new(MemorySource::new(&data));
/// let summary = scanner.scan().unwrap();
///
/// assert_eq!(scanner.info().unwrap().width, 1);
/// assert_eq!(summary.scans, 1);
/// assert_eq!(summary.entropy_bytes, 2);
/// ```
pub struct JpegScanner<S: SourceManager> {
    source:          S,
    info:            ImageInfo,
    frame_seen:      bool,
    headers_decoded: bool,
    finished:        bool,
    summary:         ScanSummary
}

impl<S: SourceManager> JpegScanner<S> {
    pub fn new(source: S) -> JpegScanner<S> {
        JpegScanner {
            source,
            info: ImageInfo::default(),
            frame_seen: false,
            headers_decoded: false,
            finished: false,
            summary: ScanSummary::default()
        }
    }

    /// Frame information, `None` until the headers have been decoded
    #[must_use]
    pub fn info(&self) -> Option<ImageInfo> {
        if !self.headers_decoded {
            return None;
        }
        Some(self.info.clone())
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Give back the source
    pub fn into_inner(self) -> S {
        self.source
    }

    fn reader(&mut self) -> SourceReader<'_, S> {
        SourceReader::new(&mut self.source)
    }

    /// Decode everything up to and including the first start of scan header.
    ///
    /// This initializes the source, so it starts the session.
    pub fn decode_headers(&mut self) -> Result<(), DecodeErrors> {
        if self.headers_decoded {
            warn!("Headers decoded!");
            return Ok(());
        }
        self.source.init_source()?;

        let magic_bytes = self.reader().get_u16_be_err()?;

        if magic_bytes != 0xFFD8 {
            return Err(DecodeErrors::IllegalMagicBytes(magic_bytes));
        }
        loop {
            let code = next_marker(&mut self.source)?;

            match Marker::from_u8(code) {
                Some(Marker::SOS) => {
                    if !self.frame_seen {
                        return Err(DecodeErrors::FormatStatic(
                            "Start of scan before start of frame"
                        ));
                    }
                    self.parse_sos()?;
                    self.headers_decoded = true;
                    return Ok(());
                }
                Some(Marker::EOI) => {
                    return Err(DecodeErrors::FormatStatic("Premature End of image"));
                }
                Some(marker) => self.parse_marker_inner(marker)?,
                // next_marker never returns fill bytes or stuffed zeros
                None => {}
            }
        }
    }

    /// Walk the whole image, from the headers to the end of image marker.
    ///
    /// Calls `term_source` once the end of image is reached. A truncated stream
    /// still completes, reporting the source's warnings in the summary.
    pub fn scan(&mut self) -> Result<ScanSummary, DecodeErrors> {
        if self.finished {
            return Ok(self.summary.clone());
        }
        if !self.headers_decoded {
            self.decode_headers()?;
        }
        self.summary.scans = 1;

        let mut in_scan = true;
        let mut next_restart = 0_u8;
        let mut pending: Option<u8> = None;

        loop {
            let code = match pending.take() {
                Some(code) => code,
                None if in_scan => self.skip_entropy_data()?,
                None => next_marker(&mut self.source)?
            };

            match Marker::from_u8(code) {
                Some(Marker::RST(n)) if in_scan => {
                    if self.info.restart_interval == 0 {
                        warn!("Restart marker RST{n} without a restart interval");
                    }
                    if n == next_restart {
                        self.summary.restarts += 1;
                    } else {
                        self.summary.resyncs += 1;

                        if let Resync::Keep(marker) =
                            self.source.resync_to_restart(code, next_restart)?
                        {
                            pending = Some(marker);
                        }
                    }
                    next_restart = (next_restart + 1) & 7;
                }
                Some(Marker::RST(n)) => {
                    warn!("Stray restart marker RST{n} outside of a scan");
                }
                Some(Marker::EOI) => {
                    trace!("Found EOI marker");
                    self.source.term_source();
                    self.summary.warnings = self.source.num_warnings();
                    self.finished = true;
                    return Ok(self.summary.clone());
                }
                Some(Marker::SOS) => {
                    self.parse_sos()?;
                    self.summary.scans += 1;
                    in_scan = true;
                    next_restart = 0;
                }
                Some(Marker::SOF(0..=3 | 5..=7 | 9..=11 | 13..=15)) if self.frame_seen => {
                    return Err(DecodeErrors::FormatStatic("Multiple start of frame markers"));
                }
                Some(marker) => {
                    // tables and application data between scans
                    in_scan = false;
                    self.parse_marker_inner(marker)?;
                }
                None => {}
            }
        }
    }

    /// Consume entropy coded bytes up to the next marker and return its code
    fn skip_entropy_data(&mut self) -> Result<u8, SourceErrors> {
        loop {
            ensure_input(&mut self.source)?;

            let window = self.source.next_input_bytes();
            let found = window.iter().position(|x| *x == 0xFF);
            let length = window.len();

            let Some(pos) = found else {
                self.source.consume(length);
                self.summary.entropy_bytes += length;
                continue;
            };
            self.source.consume(pos + 1);
            self.summary.entropy_bytes += pos;

            let mut code = self.reader().get_u8_err()?;
            // fill bytes
            while code == 0xFF {
                code = self.reader().get_u8_err()?;
            }
            if code != 0 {
                return Ok(code);
            }
            // stuffed zero, part of the data
            self.summary.entropy_bytes += 2;
        }
    }

    fn parse_marker_inner(&mut self, marker: Marker) -> Result<(), DecodeErrors> {
        match marker {
            Marker::SOF(sof @ (0..=3 | 5..=7 | 9..=11 | 13..=15)) => self.parse_start_of_frame(sof),
            Marker::DRI => {
                trace!("DRI marker present");

                if self.reader().get_u16_be_err()? != 4 {
                    return Err(DecodeErrors::Format(
                        "Bad DRI length, Corrupt JPEG".to_string()
                    ));
                }
                self.info.restart_interval = self.reader().get_u16_be_err()?;
                Ok(())
            }
            Marker::SOI => Err(DecodeErrors::FormatStatic("Duplicate SOI marker")),
            Marker::RST(_) | Marker::Other(0x01) => {
                warn!("Standalone marker 0xFF{:X} in headers, ignoring", marker.to_u8());
                Ok(())
            }
            Marker::DHT | Marker::DQT | Marker::DAC | Marker::DNL | Marker::APP(_) | Marker::COM => {
                trace!("Skipping {:?} segment", marker);
                self.skip_segment()
            }
            _ => {
                warn!("Marker 0xFF{:X} not known", marker.to_u8());
                self.skip_segment()
            }
        }
    }

    fn skip_segment(&mut self) -> Result<(), DecodeErrors> {
        let length = self.reader().get_u16_be_err()?;

        if length < 2 {
            return Err(DecodeErrors::Format(format!(
                "Found a marker with invalid length : {length}"
            )));
        }
        self.source.skip_input_data(usize::from(length - 2))?;
        Ok(())
    }

    fn parse_start_of_frame(&mut self, sof: u8) -> Result<(), DecodeErrors> {
        if self.frame_seen {
            return Err(DecodeErrors::FormatStatic("Multiple start of frame markers"));
        }
        let mut reader = self.reader();

        let length = reader.get_u16_be_err()?;
        let precision = reader.get_u8_err()?;
        let height = reader.get_u16_be_err()?;
        let width = reader.get_u16_be_err()?;
        let components = reader.get_u8_err()?;

        let expected = 8 + 3 * u16::from(components);

        if length != expected {
            return Err(DecodeErrors::Format(format!(
                "Length of start of frame differs from expected {expected},value is {length}"
            )));
        }
        if width == 0 {
            return Err(DecodeErrors::FormatStatic("Image width is zero"));
        }
        if components == 0 {
            return Err(DecodeErrors::FormatStatic("Image has no components"));
        }
        reader.skip(3 * usize::from(components))?;

        trace!("Image width  :{}", width);
        trace!("Image height :{}", height);
        trace!("Image components : {}", components);

        self.info.width = width;
        self.info.height = height;
        self.info.components = components;
        self.info.precision = precision;
        self.info.sof = sof;
        self.frame_seen = true;

        Ok(())
    }

    fn parse_sos(&mut self) -> Result<(), DecodeErrors> {
        let mut reader = self.reader();

        let length = reader.get_u16_be_err()?;
        let num_components = reader.get_u8_err()?;

        if !(1..=4).contains(&num_components) {
            return Err(DecodeErrors::Format(format!(
                "Number of components in start of scan should be between 1 and 4, found {num_components}"
            )));
        }
        if length != 6 + 2 * u16::from(num_components) {
            return Err(DecodeErrors::Format(format!(
                "Bad SOS length {length},corrupt jpeg"
            )));
        }
        // component selectors, spectral selection and approximation
        reader.skip(usize::from(length - 3))?;

        debug!("Start of scan with {num_components} components");
        Ok(())
    }
}
