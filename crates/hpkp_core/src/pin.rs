//! Public-key pin normalization.
//!
//! A pin arrives in one of several encodings and is stored as padded standard
//! base64. The encoding is detected from the input length alone, using the
//! per-algorithm length table below:
//!
//! - hex length            -> hex decode, re-encode
//! - raw digest length     -> already-decoded bytes, encode
//! - (pad_min, pad_max)    -> base64 with padding stripped (either alphabet)
//! - anything else         -> assumed to be standard base64, passed through
//!
//! Only `sha256` is accepted; browsers implementing `Public-Key-Pins` reject
//! every other digest.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};

// --- Algorithm registry -------------------------------------------------

/// Digest algorithms a pin may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinAlgorithm {
    Sha256,
}

/// Input-length boundaries used to detect a pin's encoding.
///
/// `pad_min` and `pad_max` are exclusive bounds for stripped-padding base64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLengths {
    /// Decoded digest length in bytes.
    pub raw: usize,
    /// Hex-encoded length in characters.
    pub hex: usize,
    pub pad_min: usize,
    pub pad_max: usize,
}

struct AlgorithmRow {
    algorithm: PinAlgorithm,
    id: &'static str,
    lengths: PinLengths,
}

const REGISTRY: &[AlgorithmRow] = &[AlgorithmRow {
    algorithm: PinAlgorithm::Sha256,
    id: "sha256",
    lengths: PinLengths {
        raw: 32,
        hex: 64,
        pad_min: 40,
        pad_max: 44,
    },
}];

/// Identifier assumed when a caller does not name an algorithm.
pub const DEFAULT_ALGORITHM: &str = "sha256";

impl PinAlgorithm {
    /// Look up an algorithm by its header identifier (e.g. `"sha256"`).
    pub fn from_id(id: &str) -> Result<Self, PinError> {
        REGISTRY
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.algorithm)
            .ok_or_else(|| PinError::UnsupportedAlgorithm {
                algorithm: id.to_string(),
            })
    }

    /// Identifier as it appears in `pin-<id>=` directives.
    pub fn as_str(self) -> &'static str {
        self.row().id
    }

    pub fn lengths(self) -> PinLengths {
        self.row().lengths
    }

    fn row(self) -> &'static AlgorithmRow {
        match self {
            PinAlgorithm::Sha256 => &REGISTRY[0],
        }
    }
}

/// All registered algorithms, in registry order.
pub fn supported_algorithms() -> impl Iterator<Item = PinAlgorithm> {
    REGISTRY.iter().map(|row| row.algorithm)
}

// --- Errors -------------------------------------------------------------

/// Error returned when a pin cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// Algorithm identifier is not in the registry.
    UnsupportedAlgorithm { algorithm: String },
    /// Input matched an encoding by length but its content failed to decode.
    UnrecognizedEncoding {
        encoding: PinEncoding,
        reason: String,
    },
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::UnsupportedAlgorithm { algorithm } => write!(
                f,
                "unsupported pin algorithm '{algorithm}': browsers currently only support sha256 public key pins"
            ),
            PinError::UnrecognizedEncoding { encoding, reason } => {
                write!(f, "pin is not valid {}: {reason}", encoding.as_str())
            }
        }
    }
}

impl std::error::Error for PinError {}

// --- Encoding detection -------------------------------------------------

/// Encoding inferred from a pin's length (and, for stripped base64, its alphabet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinEncoding {
    Hex,
    Raw,
    StrippedBase64,
    StrippedBase64UrlSafe,
    /// Taken to be padded standard base64 and stored unchanged.
    Base64,
}

impl PinEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            PinEncoding::Hex => "hex",
            PinEncoding::Raw => "raw digest",
            PinEncoding::StrippedBase64 => "base64 (padding stripped)",
            PinEncoding::StrippedBase64UrlSafe => "url-safe base64 (padding stripped)",
            PinEncoding::Base64 => "base64",
        }
    }
}

/// Classify `raw` against an algorithm's length table.
pub fn detect_encoding(raw: &[u8], lengths: PinLengths) -> PinEncoding {
    let len = raw.len();
    if len == lengths.hex {
        PinEncoding::Hex
    } else if len == lengths.raw {
        PinEncoding::Raw
    } else if len > lengths.pad_min && len < lengths.pad_max {
        if raw.iter().any(|&b| b == b'-' || b == b'_') {
            PinEncoding::StrippedBase64UrlSafe
        } else {
            PinEncoding::StrippedBase64
        }
    } else {
        PinEncoding::Base64
    }
}

/// Append `len % 4` padding characters to a stripped base64 string.
///
/// This is the count existing stored pins were produced with. It only yields
/// canonical padding for some lengths, so decoding ignores trailing `=`.
pub fn repad_stripped(stripped: &[u8]) -> Vec<u8> {
    let pad = stripped.len() % 4;
    let mut padded = Vec::with_capacity(stripped.len() + pad);
    padded.extend_from_slice(stripped);
    padded.resize(stripped.len() + pad, b'=');
    padded
}

// --- Normalizer ---------------------------------------------------------

/// Normalize a pin to padded standard base64.
///
/// `raw` may be hex text, the raw digest bytes, or base64 text; see the module
/// docs for the length-based detection rules.
pub fn normalize(raw: &[u8], algorithm: &str) -> Result<String, PinError> {
    let algo = PinAlgorithm::from_id(algorithm)?;
    let encoding = detect_encoding(raw, algo.lengths());

    let digest = match encoding {
        PinEncoding::Hex => {
            let bytes = hex::decode(raw).map_err(|e| unrecognized(encoding, e))?;
            check_digest_len(&bytes, algo, encoding)?;
            STANDARD.encode(bytes)
        }
        PinEncoding::Raw => STANDARD.encode(raw),
        PinEncoding::StrippedBase64 | PinEncoding::StrippedBase64UrlSafe => {
            let padded = repad_stripped(raw);
            let bytes = decode_lenient(&padded, encoding)?;
            check_digest_len(&bytes, algo, encoding)?;
            STANDARD.encode(bytes)
        }
        PinEncoding::Base64 => {
            String::from_utf8(raw.to_vec()).map_err(|e| unrecognized(encoding, e))?
        }
    };

    tracing::debug!(
        "pin normalized algo={} encoding={:?} digest={}",
        algo.as_str(),
        encoding,
        digest
    );
    Ok(digest)
}

/// Decoded bytes must be exactly one digest long.
fn check_digest_len(
    bytes: &[u8],
    algo: PinAlgorithm,
    encoding: PinEncoding,
) -> Result<(), PinError> {
    let expected = algo.lengths().raw;
    if bytes.len() != expected {
        return Err(unrecognized(
            encoding,
            format!(
                "decoded to {} bytes, {} digests are {} bytes",
                bytes.len(),
                algo.as_str(),
                expected
            ),
        ));
    }
    Ok(())
}

/// Decode base64 whose trailing padding may be missing or over-long.
///
/// Non-zero trailing bits in the last symbol are rejected, unlike a fully
/// non-strict decoder; canonical digest encodings never carry them.
fn decode_lenient(padded: &[u8], encoding: PinEncoding) -> Result<Vec<u8>, PinError> {
    let body = match padded.iter().rposition(|&b| b != b'=') {
        Some(last) => &padded[..=last],
        None => &[][..],
    };
    let decoded = if encoding == PinEncoding::StrippedBase64UrlSafe {
        URL_SAFE_NO_PAD.decode(body)
    } else {
        STANDARD_NO_PAD.decode(body)
    };
    decoded.map_err(|e| unrecognized(encoding, e))
}

fn unrecognized(encoding: PinEncoding, err: impl fmt::Display) -> PinError {
    PinError::UnrecognizedEncoding {
        encoding,
        reason: err.to_string(),
    }
}

// --- Pin entry ----------------------------------------------------------

/// A normalized pin. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinEntry {
    algorithm: PinAlgorithm,
    digest: String,
}

impl PinEntry {
    /// Normalize `raw` and wrap it as a pin for `algorithm`.
    pub fn new(raw: impl AsRef<[u8]>, algorithm: &str) -> Result<Self, PinError> {
        let algo = PinAlgorithm::from_id(algorithm)?;
        let digest = normalize(raw.as_ref(), algorithm)?;
        Ok(Self {
            algorithm: algo,
            digest,
        })
    }

    pub fn algorithm(&self) -> PinAlgorithm {
        self.algorithm
    }

    /// Padded standard-base64 digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256: PinLengths = PinLengths {
        raw: 32,
        hex: 64,
        pad_min: 40,
        pad_max: 44,
    };

    #[test]
    fn registry_has_sha256() {
        let algo = PinAlgorithm::from_id("sha256").unwrap();
        assert_eq!(algo, PinAlgorithm::Sha256);
        assert_eq!(algo.as_str(), "sha256");
        assert_eq!(algo.lengths(), SHA256);
        assert_eq!(supported_algorithms().count(), 1);
    }

    #[test]
    fn detect_by_length() {
        assert_eq!(detect_encoding(&[b'a'; 64], SHA256), PinEncoding::Hex);
        assert_eq!(detect_encoding(&[0u8; 32], SHA256), PinEncoding::Raw);
        assert_eq!(
            detect_encoding(&[b'A'; 43], SHA256),
            PinEncoding::StrippedBase64
        );
        assert_eq!(detect_encoding(&[b'A'; 44], SHA256), PinEncoding::Base64);
        assert_eq!(detect_encoding(&[b'A'; 40], SHA256), PinEncoding::Base64);
    }

    #[test]
    fn url_safe_alphabet_detected_by_dash_or_underscore() {
        let mut dash = vec![b'A'; 42];
        dash[3] = b'-';
        assert_eq!(
            detect_encoding(&dash, SHA256),
            PinEncoding::StrippedBase64UrlSafe
        );
        let mut under = vec![b'A'; 41];
        under[0] = b'_';
        assert_eq!(
            detect_encoding(&under, SHA256),
            PinEncoding::StrippedBase64UrlSafe
        );
    }

    #[test]
    fn repad_uses_length_mod_four() {
        assert_eq!(repad_stripped(&[b'A'; 42]).len(), 44);
        assert_eq!(repad_stripped(&[b'A'; 43]).len(), 46);
        assert_eq!(repad_stripped(&[b'A'; 41]).len(), 42);
        assert!(repad_stripped(&[b'A'; 43]).ends_with(b"==="));
    }

    #[test]
    fn decode_lenient_ignores_extra_padding() {
        let padded = repad_stripped(b"1VilPkeVqirlPifk5scbzcTTbMT2clp+Zkyv9VFFasE");
        let bytes = decode_lenient(&padded, PinEncoding::StrippedBase64).unwrap();
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn decode_lenient_rejects_non_zero_trailing_bits() {
        // Final 'E' -> 'F' sets one of the two unused low bits.
        let padded = repad_stripped(b"1VilPkeVqirlPifk5scbzcTTbMT2clp+Zkyv9VFFasF");
        assert!(decode_lenient(&padded, PinEncoding::StrippedBase64).is_err());
    }
}
