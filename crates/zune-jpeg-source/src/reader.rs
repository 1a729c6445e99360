/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder side byte access over a [`SourceManager`]
use crate::errors::SourceErrors;
use crate::source::SourceManager;

/// Make sure the window has at least one byte, filling only when it is empty
#[inline]
pub(crate) fn ensure_input<S: SourceManager + ?Sized>(source: &mut S) -> Result<(), SourceErrors> {
    if source.bytes_in_buffer() == 0 {
        let filled = source.fill_input_buffer()?;

        if !filled || source.bytes_in_buffer() == 0 {
            return Err(SourceErrors::Suspended);
        }
    }
    Ok(())
}

/// Reads big endian integers and byte runs the way a decoder does,
/// pulling one window at a time.
pub struct SourceReader<'s, S: SourceManager + ?Sized> {
    source: &'s mut S
}

impl<'s, S: SourceManager + ?Sized> SourceReader<'s, S> {
    pub fn new(source: &'s mut S) -> SourceReader<'s, S> {
        SourceReader { source }
    }

    #[inline]
    pub fn get_u8_err(&mut self) -> Result<u8, SourceErrors> {
        ensure_input(&mut *self.source)?;

        let byte = self.source.next_input_bytes()[0];
        self.source.consume(1);
        Ok(byte)
    }

    /// Read a big endian u16, the two bytes may straddle a refill
    #[inline]
    pub fn get_u16_be_err(&mut self) -> Result<u16, SourceErrors> {
        let high = self.get_u8_err()?;
        let low = self.get_u8_err()?;

        Ok(u16::from_be_bytes([high, low]))
    }

    /// Fill `buf` completely, refilling the window as often as needed
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceErrors> {
        let mut position = 0;

        while position < buf.len() {
            ensure_input(&mut *self.source)?;

            let window = self.source.next_input_bytes();
            let count = window.len().min(buf.len() - position);

            buf[position..position + count].copy_from_slice(&window[..count]);
            self.source.consume(count);
            position += count;
        }
        Ok(())
    }

    /// Discard `num` bytes
    pub fn skip(&mut self, num: usize) -> Result<(), SourceErrors> {
        self.source.skip_input_data(num)
    }

    /// Access the source this reader wraps
    pub fn source(&mut self) -> &mut S {
        &mut *self.source
    }
}
