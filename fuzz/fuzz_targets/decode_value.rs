#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mssql_types::{ValueReader, read_type_info, read_value};

/// Raw bytes with a remaining-length hint.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    hint: u16,
    data: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let mut reader = ValueReader::new(&input.data, usize::from(input.hint));
    let limit = reader.remaining();
    if let Ok(info) = read_type_info(&mut reader) {
        let _ = info.sql_type();
        if let Ok(value) = read_value(&mut reader, &info) {
            let _ = value.to_string();
        }
    }
    assert!(reader.position() <= limit);
});
