#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic; arbitrary input never carries a valid signature.
        let _ = einvoice::xades::verify_signature_detailed(s);
    }
});
