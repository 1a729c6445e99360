/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::errors::SourceErrors;
use crate::restart::{self, Resync};

/// The contract between a pull decoder and its input.
///
/// The decoder owns the control flow. It reads from the window returned by
/// [`next_input_bytes`](Self::next_input_bytes), marks what it used with
/// [`consume`](Self::consume) and calls back into the source when it needs
/// more data, wants to discard data or is done.
///
/// # Call order
/// 1. [`init_source`](Self::init_source) once, before any byte is read.
/// 2. [`fill_input_buffer`](Self::fill_input_buffer) whenever
///    [`bytes_in_buffer`](Self::bytes_in_buffer) is zero,
///    [`skip_input_data`](Self::skip_input_data) to drop uninteresting spans and
///    [`resync_to_restart`](Self::resync_to_restart) when an unexpected marker
///    shows up in entropy coded data.
/// 3. [`term_source`](Self::term_source) at most once, and only after a
///    successful decode. Cleanup on error paths is the caller's job.
pub trait SourceManager {
    /// Prepare for a new decode session, before any data is read
    fn init_source(&mut self) -> Result<(), SourceErrors>;

    /// Replace the window with fresh bytes.
    ///
    /// Returns `Ok(true)` when new data is available. A `false` return would mean
    /// "no data yet, come back later", the sources in this crate never suspend
    /// so they always return `true`, with at least one byte in the window.
    fn fill_input_buffer(&mut self) -> Result<bool, SourceErrors>;

    /// Discard the next `num_bytes` bytes, refilling the window as needed.
    ///
    /// Zero is a no-op.
    fn skip_input_data(&mut self, num_bytes: usize) -> Result<(), SourceErrors>;

    /// Recover after finding `marker` where restart marker `RSTdesired`
    /// was expected.
    ///
    /// The default defers to the decoder side policy in [`restart`].
    fn resync_to_restart(&mut self, marker: u8, desired: u8) -> Result<Resync, SourceErrors> {
        restart::resync_to_restart(self, marker, desired)
    }

    /// Called after the decoder has read everything it needs
    fn term_source(&mut self);

    /// Number of non fatal warnings this source emitted in the current session
    fn num_warnings(&self) -> usize {
        0
    }

    /// Number of unread bytes in the window
    fn bytes_in_buffer(&self) -> usize;

    /// The unread bytes, `bytes_in_buffer()` long
    fn next_input_bytes(&self) -> &[u8];

    /// Mark `num_bytes` bytes at the start of the window as read.
    ///
    /// `num_bytes` must not exceed [`bytes_in_buffer`](Self::bytes_in_buffer)
    fn consume(&mut self, num_bytes: usize);
}
