/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Default size of the input buffer of a [`BufferedByteSource`](crate::BufferedByteSource)
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Smallest buffer we accept, it has to hold a synthetic end of image marker
pub const MIN_BUFFER_SIZE: usize = 2;

/// Options that influence how a source feeds the decoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SourceOptions {
    /// Capacity of the input buffer
    buffer_size: usize,
    /// Treat warnings as errors.
    strict_mode: bool
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            strict_mode: false
        }
    }
}

impl SourceOptions {
    /// Create new options with default values
    #[must_use]
    pub fn new() -> SourceOptions {
        Self::default()
    }
    /// Get the capacity of the input buffer
    ///
    /// Default is 4096
    #[must_use]
    pub const fn get_buffer_size(&self) -> usize {
        self.buffer_size
    }
    /// Set the capacity of the input buffer.
    ///
    /// Sizes below [`MIN_BUFFER_SIZE`] are raised to it.
    #[must_use]
    pub fn set_buffer_size(mut self, size: usize) -> SourceOptions {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }
    /// Get whether warnings are treated as errors
    #[must_use]
    pub const fn get_strict_mode(&self) -> bool {
        self.strict_mode
    }
    /// Set whether warnings are treated as errors.
    ///
    /// In strict mode a stream that ends before the end of image marker
    /// is an error instead of being patched with a fake marker.
    #[must_use]
    pub const fn set_strict_mode(mut self, choice: bool) -> SourceOptions {
        self.strict_mode = choice;
        self
    }
}
