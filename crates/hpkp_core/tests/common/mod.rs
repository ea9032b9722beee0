#![allow(dead_code)]

/// Canonical digest shared by every fixture pin.
pub const CANONICAL: &str = "1VilPkeVqirlPifk5scbzcTTbMT2clp+Zkyv9VFFasE=";

pub const REPORT_URI: &str =
    "https://f038192cab4afafaacee34d22ed2e1dd.report-uri.io/r/default/hpkp/reportOnly";

pub const HEX: &str = "d558a53e4795aa2ae53e27e4e6c71bcdc4d36cc4f6725a7e664caff551456ac1";

pub const URL_SAFE_STRIPPED: &str = "1VilPkeVqirlPifk5scbzcTTbMT2clp-Zkyv9VFFasE";

pub const RAW: [u8; 32] = [
    0xd5, 0x58, 0xa5, 0x3e, 0x47, 0x95, 0xaa, 0x2a, 0xe5, 0x3e, 0x27, 0xe4, 0xe6, 0xc7, 0x1b,
    0xcd, 0xc4, 0xd3, 0x6c, 0xc4, 0xf6, 0x72, 0x5a, 0x7e, 0x66, 0x4c, 0xaf, 0xf5, 0x51, 0x45,
    0x6a, 0xc1,
];

/// Four encodings of the same digest, in the order they are added.
pub fn fixture_hashes() -> Vec<Vec<u8>> {
    vec![
        CANONICAL.as_bytes().to_vec(),
        URL_SAFE_STRIPPED.as_bytes().to_vec(),
        HEX.as_bytes().to_vec(),
        RAW.to_vec(),
    ]
}

pub fn pins_prefix() -> String {
    format!("pin-sha256=\"{CANONICAL}\"; ").repeat(4)
}
