/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A source reading from a borrowed stream through a fixed size buffer.
//!
//! Bookkeeping is two integers, `cursor` (start of the unread bytes in the
//! buffer) and `available` (how many unread bytes follow it).
//! `cursor + available <= capacity` always holds and every fill resets
//! `cursor` to zero.
use std::io::ErrorKind;

use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait, ZSeekFrom};

use crate::errors::SourceErrors;
use crate::marker::SYNTHETIC_EOI;
use crate::options::SourceOptions;
use crate::source::SourceManager;

/// Where a [`BufferedByteSource`] is in its session
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SourceState {
    /// `init_source` ran (or the source was just created) and nothing was read yet
    BeforeFirstFill,
    /// At least one fill returned real bytes
    Streaming,
    /// The stream ended early, every fill now yields a fake end of image marker
    ExhaustedSyntheticEoi,
    /// The first fill found an empty stream
    Failed
}

/// A [`SourceManager`] over a borrowed [`ZByteReaderTrait`] stream.
///
/// The stream is rewound by [`init_source`](SourceManager::init_source) but is
/// never closed, dropping the source simply ends the borrow.
///
/// # Example
/// ```
/// use std::io::Cursor;
///
/// use zune_jpeg_source::{BufferedByteSource, SourceManager, SourceOptions};
///
/// let mut stream = Cursor::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
/// let options = SourceOptions::new().set_buffer_size(4);
/// let mut source = BufferedByteSource::new_with_options(&mut stream, options);
///
/// source.init_source().unwrap();
/// source.fill_input_buffer().unwrap();
/// assert_eq!(source.next_input_bytes(), &[0xFF, 0xD8, 0xFF, 0xE0]);
///
/// source.skip_input_data(5).unwrap();
/// assert_eq!(source.next_input_bytes(), &[0x10]);
/// ```
pub struct BufferedByteSource<'a, T: ZByteReaderTrait> {
    stream:       &'a mut T,
    buffer:       Box<[u8]>,
    cursor:       usize,
    available:    usize,
    state:        SourceState,
    num_warnings: usize,
    options:      SourceOptions
}

impl<'a, T: ZByteReaderTrait> BufferedByteSource<'a, T> {
    /// Create a source with the default buffer size of 4096 bytes
    pub fn new(stream: &'a mut T) -> BufferedByteSource<'a, T> {
        Self::new_with_options(stream, SourceOptions::default())
    }

    pub fn new_with_options(stream: &'a mut T, options: SourceOptions) -> BufferedByteSource<'a, T> {
        BufferedByteSource {
            stream,
            buffer: vec![0; options.get_buffer_size()].into_boxed_slice(),
            cursor: 0,
            available: 0,
            state: SourceState::BeforeFirstFill,
            num_warnings: 0,
            options
        }
    }

    /// Current state of the session
    #[must_use]
    pub const fn state(&self) -> SourceState {
        self.state
    }

    /// True until the first successful fill of a session
    #[must_use]
    pub fn is_start_of_stream(&self) -> bool {
        matches!(self.state, SourceState::BeforeFirstFill | SourceState::Failed)
    }

    /// Offset of the first unread byte in the buffer
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fixed size of the buffer
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub const fn options(&self) -> &SourceOptions {
        &self.options
    }

    /// Read into the whole buffer, retrying reads the OS interrupted
    fn read_into_buffer(&mut self) -> Result<usize, ZByteIoError> {
        loop {
            match self.stream.read_bytes(&mut self.buffer[..]) {
                Err(ZByteIoError::StdIoError(err)) if err.kind() == ErrorKind::Interrupted => {
                    trace!("Read interrupted, retrying");
                }
                result => return result
            }
        }
    }

    fn insert_fake_eoi(&mut self) -> Result<bool, SourceErrors> {
        if self.options.get_strict_mode() {
            error!("Premature end of stream");
            return Err(SourceErrors::TruncatedStream);
        }
        self.num_warnings += 1;
        warn!("Premature end of stream, inserting a fake end of image marker");

        self.buffer[..SYNTHETIC_EOI.len()].copy_from_slice(&SYNTHETIC_EOI);
        self.cursor = 0;
        self.available = SYNTHETIC_EOI.len();
        self.state = SourceState::ExhaustedSyntheticEoi;

        Ok(true)
    }
}

impl<'a, T: ZByteReaderTrait> SourceManager for BufferedByteSource<'a, T> {
    fn init_source(&mut self) -> Result<(), SourceErrors> {
        self.stream.z_seek(ZSeekFrom::Start(0))?;

        self.cursor = 0;
        self.available = 0;
        self.state = SourceState::BeforeFirstFill;
        self.num_warnings = 0;

        trace!("Source initialized, buffer size {}", self.buffer.len());
        Ok(())
    }

    fn fill_input_buffer(&mut self) -> Result<bool, SourceErrors> {
        // whatever was unread is dropped, the decoder has taken what it needs
        self.cursor = 0;
        self.available = 0;

        match self.state {
            SourceState::Failed => return Err(SourceErrors::EmptyStream),
            SourceState::ExhaustedSyntheticEoi => return self.insert_fake_eoi(),
            SourceState::BeforeFirstFill | SourceState::Streaming => {}
        }

        let bytes_read = self.read_into_buffer()?;

        if bytes_read == 0 {
            if self.state == SourceState::BeforeFirstFill {
                error!("Input stream is empty");
                self.state = SourceState::Failed;
                return Err(SourceErrors::EmptyStream);
            }
            return self.insert_fake_eoi();
        }
        trace!("Filled {bytes_read} bytes");

        self.available = bytes_read;
        self.state = SourceState::Streaming;

        Ok(true)
    }

    fn skip_input_data(&mut self, num_bytes: usize) -> Result<(), SourceErrors> {
        if num_bytes == 0 {
            return Ok(());
        }
        let mut remaining = num_bytes;

        while remaining > self.available {
            remaining -= self.available;
            // fills never suspend, the return value is always true
            self.fill_input_buffer()?;

            if self.state == SourceState::ExhaustedSyntheticEoi {
                // leave the marker for the decoder to find
                warn!("Skip of {num_bytes} bytes ran past the end of the stream");
                return Ok(());
            }
        }
        self.cursor += remaining;
        self.available -= remaining;

        trace!("Skipped {num_bytes} bytes");
        Ok(())
    }

    fn term_source(&mut self) {
        trace!("Source terminated with {} unread bytes", self.available);
    }

    fn num_warnings(&self) -> usize {
        self.num_warnings
    }

    fn bytes_in_buffer(&self) -> usize {
        self.available
    }

    fn next_input_bytes(&self) -> &[u8] {
        &self.buffer[self.cursor..self.cursor + self.available]
    }

    fn consume(&mut self, num_bytes: usize) {
        debug_assert!(num_bytes <= self.available);

        let num_bytes = num_bytes.min(self.available);
        self.cursor += num_bytes;
        self.available -= num_bytes;
    }
}
