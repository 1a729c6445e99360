#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use std::io::Cursor;

    use zune_jpeg_source::{BufferedByteSource, JpegScanner, SourceOptions};

    // a small buffer so segments and markers straddle refills
    let mut stream = Cursor::new(data);
    let options = SourceOptions::new().set_buffer_size(7);
    let mut scanner = JpegScanner::new(BufferedByteSource::new_with_options(&mut stream, options));
    let _ = scanner.scan();
});
