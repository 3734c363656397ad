//! Fuzz target for the delimited-text loader.
//!
//! This fuzzer tests that the CSV/TSV loader:
//! 1. Never panics on malformed input or invalid UTF-8
//! 2. Handles all delimiter combinations
//! 3. Produces tables the pipeline accepts or rejects cleanly

#![no_main]

use libfuzzer_sys::fuzz_target;
use sifter::input::CsvLoader;
use sifter::{ProcessOptions, process};
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    // Write to temp file so decoding and hashing run too
    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let loader = CsvLoader::new();
            if let Ok((table, _)) = loader.load_file(temp_file.path()) {
                // Messy headers may be rejected, but never with a panic.
                let _ = process(&table, &ProcessOptions::default());
            }
        }
    }
});
