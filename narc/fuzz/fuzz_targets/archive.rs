#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate narc_core;

use narc_core::{plan, NarcSrc};

fuzz_target!(|data: &[u8]| {
    let mut src = data;
    if let Ok(layout) = src.read_layout() {
        if let Ok(dirs) = plan(&layout) {
            for dir in dirs {
                for file in dir.files {
                    // Chunk sizes may claim more than the input holds
                    let _ = src.read_file(&layout, file.id);
                }
            }
        }
    }
});
