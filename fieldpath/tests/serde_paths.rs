#![cfg(feature = "serde")]

use bitstream::BitReader;
use fieldpath::{decode_field_paths, FieldPath};

#[test]
fn path_serializes_as_segment_array() {
    let path = FieldPath::new(&[15, 8, 2]).unwrap();
    assert_eq!(serde_json::to_string(&path).unwrap(), "[15,8,2]");
}

#[test]
fn decoded_chunk_serializes_in_order() {
    let mut reader = BitReader::new(&[0b0000_0100]);
    let paths = decode_field_paths(&mut reader).unwrap();
    assert_eq!(serde_json::to_string(&paths).unwrap(), "[[0],[1]]");
}
