#![no_main]

use std::io::Cursor;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use mxf_dict::Rp210Dictionary;

fuzz_target!(|data: &[u8]| {
    let dictionary = Arc::new(Rp210Dictionary::synthetic_only().with_avid_extensions());
    let mut cursor = Cursor::new(data);
    let _ = mxf_format::driver::parse(&mut cursor, dictionary);
});
