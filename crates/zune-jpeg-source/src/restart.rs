/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Default recovery when entropy coded data is not followed by the
//! expected restart marker.
//!
//! The decoder has already read the offending marker when it calls
//! [`resync_to_restart`]. Depending on where the marker sits relative to the
//! expected `RSTn` we either drop it, hand it back, or scan forward to the
//! next marker and look again:
//!
//! | marker                              | action                          |
//! |-------------------------------------|---------------------------------|
//! | below `SOF0` (not a valid marker)   | scan forward                    |
//! | any non restart marker              | keep it for the decoder         |
//! | one of the two restarts after RSTn  | keep it, data was lost          |
//! | one of the two restarts before RSTn | scan forward, it's stale        |
//! | RSTn or anything further away       | discard it and resume decoding  |
use crate::errors::SourceErrors;
use crate::marker::{RST0, SOF0};
use crate::reader::ensure_input;
use crate::source::SourceManager;

/// Outcome of a restart resynchronisation
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Resync {
    /// The marker was dropped, resume decoding entropy coded data
    Discard,
    /// The decoder should process this marker next
    Keep(u8)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Action {
    Discard,
    ScanForward,
    Keep
}

fn classify(marker: u8, desired: u8) -> Action {
    if marker < SOF0 {
        return Action::ScanForward;
    }
    if !(RST0..=RST0 + 7).contains(&marker) {
        return Action::Keep;
    }
    let n = marker - RST0;

    if n == (desired + 1) & 7 || n == (desired + 2) & 7 {
        Action::Keep
    } else if n == desired.wrapping_sub(1) & 7 || n == desired.wrapping_sub(2) & 7 {
        Action::ScanForward
    } else {
        Action::Discard
    }
}

/// Resynchronise after finding `marker` where `RST{desired}` was expected.
///
/// `desired` is taken modulo 8.
pub fn resync_to_restart<S: SourceManager + ?Sized>(
    source: &mut S, marker: u8, desired: u8
) -> Result<Resync, SourceErrors> {
    let desired = desired & 7;
    let mut marker = marker;

    warn!("Corrupt data, found marker 0xFF{marker:X} instead of RST{desired}");

    loop {
        match classify(marker, desired) {
            Action::Discard => {
                trace!("Discarding marker 0xFF{marker:X}");
                return Ok(Resync::Discard);
            }
            Action::Keep => {
                trace!("Keeping marker 0xFF{marker:X}");
                return Ok(Resync::Keep(marker));
            }
            Action::ScanForward => {
                marker = next_marker(source)?;
            }
        }
    }
}

fn read_byte<S: SourceManager + ?Sized>(source: &mut S) -> Result<u8, SourceErrors> {
    ensure_input(source)?;

    let byte = source.next_input_bytes()[0];
    source.consume(1);
    Ok(byte)
}

/// Consume bytes up to and including the next marker, returning its code.
///
/// Stuffed zeros (`FF 00`) and fill bytes (`FF FF ...`) are not markers.
pub fn next_marker<S: SourceManager + ?Sized>(source: &mut S) -> Result<u8, SourceErrors> {
    let mut discarded = 0_usize;

    loop {
        loop {
            ensure_input(source)?;

            let window = source.next_input_bytes();
            let found = window.iter().position(|x| *x == 0xFF);
            let length = window.len();

            if let Some(pos) = found {
                source.consume(pos + 1);
                discarded += pos;
                break;
            }
            source.consume(length);
            discarded += length;
        }
        let mut code = read_byte(source)?;

        while code == 0xFF {
            code = read_byte(source)?;
        }
        if code != 0 {
            if discarded != 0 {
                warn!("Discarded {discarded} bytes before marker 0xFF{code:X}");
            }
            return Ok(code);
        }
        discarded += 2;
    }
}
