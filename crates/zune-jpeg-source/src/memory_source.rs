/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::errors::SourceErrors;
use crate::marker::SYNTHETIC_EOI;
use crate::options::SourceOptions;
use crate::source::SourceManager;

/// A [`SourceManager`] over bytes already in memory.
///
/// The whole slice is handed to the decoder by the first fill, later fills
/// behave like a stream that ended early.
pub struct MemorySource<'a> {
    data:         &'a [u8],
    cursor:       usize,
    available:    usize,
    // set once the slice itself has been handed out
    exhausted:    bool,
    synthetic:    bool,
    num_warnings: usize,
    options:      SourceOptions
}

impl<'a> MemorySource<'a> {
    pub fn new(data: &'a [u8]) -> MemorySource<'a> {
        Self::new_with_options(data, SourceOptions::default())
    }

    /// Create a source, only the strict mode of `options` is used
    pub fn new_with_options(data: &'a [u8], options: SourceOptions) -> MemorySource<'a> {
        MemorySource {
            data,
            cursor: 0,
            available: 0,
            exhausted: false,
            synthetic: false,
            num_warnings: 0,
            options
        }
    }
}

impl<'a> SourceManager for MemorySource<'a> {
    fn init_source(&mut self) -> Result<(), SourceErrors> {
        self.cursor = 0;
        self.available = 0;
        self.exhausted = false;
        self.synthetic = false;
        self.num_warnings = 0;
        Ok(())
    }

    fn fill_input_buffer(&mut self) -> Result<bool, SourceErrors> {
        self.cursor = 0;

        if !self.exhausted {
            if self.data.is_empty() {
                error!("Input buffer is empty");
                self.available = 0;
                return Err(SourceErrors::EmptyStream);
            }
            self.exhausted = true;
            self.available = self.data.len();
            return Ok(true);
        }
        if self.options.get_strict_mode() {
            self.available = 0;
            return Err(SourceErrors::TruncatedStream);
        }
        self.num_warnings += 1;
        warn!("Premature end of buffer, inserting a fake end of image marker");

        self.synthetic = true;
        self.available = SYNTHETIC_EOI.len();
        Ok(true)
    }

    fn skip_input_data(&mut self, num_bytes: usize) -> Result<(), SourceErrors> {
        if num_bytes == 0 {
            return Ok(());
        }
        if num_bytes > self.available {
            self.available = 0;
            self.fill_input_buffer()?;
            if self.synthetic {
                warn!("Skip of {num_bytes} bytes ran past the end of the buffer");
                return Ok(());
            }
            // only reachable before the first fill
            return self.skip_input_data(num_bytes);
        }
        self.cursor += num_bytes;
        self.available -= num_bytes;
        Ok(())
    }

    fn term_source(&mut self) {}

    fn num_warnings(&self) -> usize {
        self.num_warnings
    }

    fn bytes_in_buffer(&self) -> usize {
        self.available
    }

    fn next_input_bytes(&self) -> &[u8] {
        let window = if self.synthetic { &SYNTHETIC_EOI[..] } else { self.data };

        &window[self.cursor..self.cursor + self.available]
    }

    fn consume(&mut self, num_bytes: usize) {
        debug_assert!(num_bytes <= self.available);

        let num_bytes = num_bytes.min(self.available);
        self.cursor += num_bytes;
        self.available -= num_bytes;
    }
}
