/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Jpeg markers
#![allow(clippy::upper_case_acronyms)]

/// Bytes inserted when a stream ends before its end of image marker
pub const SYNTHETIC_EOI: [u8; 2] = [0xFF, 0xD9];

/// Start of frame, baseline
pub const SOF0: u8 = 0xC0;
/// First restart marker
pub const RST0: u8 = 0xD0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Marker {
    /// Start of frame, the value is the `n` in `SOFn`
    SOF(u8),
    /// Define Huffman table
    DHT,
    /// Define arithmetic coding conditioning
    DAC,
    /// Restart marker, `RST0..=RST7`
    RST(u8),
    /// Start of image
    SOI,
    /// End of image
    EOI,
    /// Start of scan
    SOS,
    /// Define quantization tables
    DQT,
    /// Define number of lines
    DNL,
    /// Define restart interval
    DRI,
    /// Application segments, `APP0..=APP15`
    APP(u8),
    /// Comment
    COM,
    /// Anything else, reserved or `JPGn`
    Other(u8)
}

impl Marker {
    /// Classify the byte following a `0xFF`.
    ///
    /// Returns `None` for `0x00` (a stuffed byte) and `0xFF` (a fill byte)
    /// which are not markers.
    #[must_use]
    pub fn from_u8(n: u8) -> Option<Marker> {
        use self::Marker::{APP, COM, DAC, DHT, DNL, DQT, DRI, EOI, RST, SOF, SOI, SOS};

        match n {
            0x00 | 0xFF => None,
            0xC4 => Some(DHT),
            0xCC => Some(DAC),
            0xC0..=0xCF => Some(SOF(n - SOF0)),
            0xD0..=0xD7 => Some(RST(n - RST0)),
            0xD8 => Some(SOI),
            0xD9 => Some(EOI),
            0xDA => Some(SOS),
            0xDB => Some(DQT),
            0xDC => Some(DNL),
            0xDD => Some(DRI),
            0xE0..=0xEF => Some(APP(n - 0xE0)),
            0xFE => Some(COM),
            _ => Some(Marker::Other(n))
        }
    }

    /// The byte following `0xFF` for this marker
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Marker::SOF(n) => SOF0 + n,
            Marker::DHT => 0xC4,
            Marker::DAC => 0xCC,
            Marker::RST(n) => RST0 + n,
            Marker::SOI => 0xD8,
            Marker::EOI => 0xD9,
            Marker::SOS => 0xDA,
            Marker::DQT => 0xDB,
            Marker::DNL => 0xDC,
            Marker::DRI => 0xDD,
            Marker::APP(n) => 0xE0 + n,
            Marker::COM => 0xFE,
            Marker::Other(n) => n
        }
    }

    /// Markers without a length field or payload
    #[must_use]
    pub const fn is_standalone(self) -> bool {
        matches!(self, Marker::SOI | Marker::EOI | Marker::RST(_))
            || matches!(self, Marker::Other(0x01))
    }
}
