/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors returned by sources and the marker scanner
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

/// Errors a source can return to its decoder
pub enum SourceErrors {
    /// The very first fill read no bytes, there is nothing to decode
    EmptyStream,
    /// The stream ended before an end of image marker and strict mode
    /// forbids patching it up
    TruncatedStream,
    /// A fill returned `false` or an empty window, asking the decoder to
    /// suspend, which the readers here cannot do
    Suspended,
    /// The underlying stream failed
    IoErrors(ZByteIoError)
}

impl Debug for SourceErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            SourceErrors::EmptyStream => writeln!(f, "Empty input stream"),
            SourceErrors::TruncatedStream => {
                writeln!(f, "[strict-mode]: Premature end of input stream")
            }
            SourceErrors::Suspended => {
                writeln!(f, "Source suspended, suspension is not supported")
            }
            SourceErrors::IoErrors(err) => writeln!(f, "{:?}", err)
        }
    }
}

impl Display for SourceErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for SourceErrors {}

impl From<ZByteIoError> for SourceErrors {
    fn from(value: ZByteIoError) -> Self {
        SourceErrors::IoErrors(value)
    }
}

/// Errors raised while walking the markers of an image
pub enum DecodeErrors {
    /// The image does not start with `0xFFD8`
    IllegalMagicBytes(u16),
    /// A malformed segment
    Format(String),
    /// A malformed segment, with a static message
    FormatStatic(&'static str),
    /// The source failed
    Source(SourceErrors)
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeErrors::IllegalMagicBytes(bytes) => {
                writeln!(f, "Illegal magic bytes, expected 0xFFD8 but found {bytes:#06X}")
            }
            DecodeErrors::Format(err) => writeln!(f, "{err}"),
            DecodeErrors::FormatStatic(err) => writeln!(f, "{err}"),
            DecodeErrors::Source(err) => writeln!(f, "{:?}", err)
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for DecodeErrors {}

impl From<SourceErrors> for DecodeErrors {
    fn from(value: SourceErrors) -> Self {
        DecodeErrors::Source(value)
    }
}

impl From<ZByteIoError> for DecodeErrors {
    fn from(value: ZByteIoError) -> Self {
        DecodeErrors::Source(SourceErrors::from(value))
    }
}
