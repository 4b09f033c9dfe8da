#![allow(dead_code, unused_imports)]

pub use kaiba_test_utils::{builders, fake_converter, fake_kaiba, init_tracing};

use std::path::Path;

use kaiba_batch::fs::FileSystem;

/// Read a file through `fs` as UTF-8, panicking on failure.
pub fn read_string(fs: &dyn FileSystem, path: impl AsRef<Path>) -> String {
    let bytes = fs.read(path.as_ref()).expect("file should be readable");
    String::from_utf8(bytes).expect("file should be UTF-8")
}
