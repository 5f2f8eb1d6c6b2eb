#![no_main]

use einvoice::EInvoiceFormat;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    if let Ok(s) = std::str::from_utf8(rest) {
        let format = EInvoiceFormat::ALL[usize::from(selector) % EInvoiceFormat::ALL.len()];
        let result = einvoice::validate::validate(s, format);
        assert_eq!(result.valid, result.errors.is_empty());
    }
});
