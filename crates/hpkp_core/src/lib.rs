#![forbid(unsafe_code)]

pub mod builder;
pub mod emit;
pub mod header;
pub mod pin;

pub use builder::{CompileState, Configuration, DEFAULT_MAX_AGE_SECONDS, HeaderBuilder};
pub use emit::{EmitError, HeaderSink, RecordingSink, send_header};
pub use header::{
    HeaderLine, PUBLIC_KEY_PINS, PUBLIC_KEY_PINS_REPORT_ONLY, compile_header, header_name,
    split_header_line,
};
pub use pin::{
    DEFAULT_ALGORITHM, PinAlgorithm, PinEncoding, PinEntry, PinError, PinLengths,
    detect_encoding, normalize, repad_stripped, supported_algorithms,
};
