#![no_main]

use bitstream::BitReader;
use fieldpath::{DecodeLimits, FieldPathDecoder, MAX_DEPTH};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&offset, chunk)) = data.split_first() else {
        return;
    };
    let Ok(mut reader) = BitReader::with_bit_offset(chunk, usize::from(offset % 8)) else {
        return;
    };
    let decoder = FieldPathDecoder::new().with_limits(DecodeLimits::default());
    if let Ok(paths) = decoder.decode(&mut reader) {
        assert!(paths.len() <= DecodeLimits::default().max_paths);
        for path in &paths {
            assert!((1..=MAX_DEPTH).contains(&path.depth()));
        }
    }
});
