#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Whatever is detected must also go through validation without panicking.
        if let Some(format) = einvoice::validate::detect_format(s) {
            let _ = einvoice::validate::validate(s, format);
        }
    }
});
