/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pull based input sources for callback driven jpeg decoders.
//!
//! A pull decoder does not receive its whole input up front, it owns a
//! "next unread byte"/"bytes remaining" window and asks its source for more
//! whenever that window runs dry.
//! This crate provides the source side of that contract:
//!
//! - [`SourceManager`]: the five operations a decoder calls
//!   (init, fill, skip, resync to restart, terminate) plus the window view.
//! - [`BufferedByteSource`]: a fixed size buffer refilled from any
//!   [`ZByteReaderTrait`](zune_core::bytestream::ZByteReaderTrait) stream
//!   (`BufReader`s over files, in memory cursors...).
//! - [`MemorySource`]: the same contract over a slice already in memory.
//! - [`JpegScanner`]: a marker level consumer which walks headers, scans and
//!   restart intervals through a source, useful for validating files and as
//!   a reference for how decoders drive a source.
//!
//! # Truncated and empty input
//! An empty stream is a fatal [`SourceErrors::EmptyStream`].
//! A stream that ends early is recovered by inserting a fake end of image marker
//! (`0xFF 0xD9`) and emitting a warning, so the decoder can return whatever it
//! has decoded, unless [`SourceOptions::set_strict_mode`] is enabled.
//!
//! # Example
//! ```
//! use std::io::Cursor;
//!
//! use zune_jpeg_source::{BufferedByteSource, JpegScanner};
//!
//! let data = [0xFF, 0xD8, 0xFF, 0xD9];
//! let mut stream = Cursor::new(&data[..]);
//!
//! let source = BufferedByteSource::new(&mut stream);
//! let mut scanner = JpegScanner::new(source);
//! // no frame header, so this is a format error
//! assert!(scanner.decode_headers().is_err());
//! ```
#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::missing_errors_doc,
    clippy::panic
)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub use crate::buffered_source::{BufferedByteSource, SourceState};
pub use crate::errors::{DecodeErrors, SourceErrors};
pub use crate::marker::{Marker, SYNTHETIC_EOI};
pub use crate::memory_source::MemorySource;
pub use crate::options::{SourceOptions, DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use crate::reader::SourceReader;
pub use crate::restart::Resync;
pub use crate::scanner::{ImageInfo, JpegScanner, ScanSummary};
pub use crate::source::SourceManager;

mod buffered_source;
pub mod errors;
pub mod marker;
mod memory_source;
mod options;
mod reader;
pub mod restart;
mod scanner;
mod source;

#[must_use]
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
