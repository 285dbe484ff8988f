#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;
use vulnstat::cwe_frequency::{count_all_cwe_ids, tokenize};
use vulnstat::table::Table;

fuzz_target!(|data: &[u8]| {
    // Any byte sequence either loads as a table or fails with an error
    if let Ok(table) = Table::from_reader(data, Path::new("fuzz.csv")) {
        let _ = count_all_cwe_ids(&table);
    }

    if let Ok(input) = std::str::from_utf8(data) {
        assert!(tokenize(input).all(|token| token != "0"));
    }
});
