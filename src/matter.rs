//! `CryMat` — qualified cryptographic material.
//!
//! Self-describing material: a short derivation code from [`crate::codex`]
//! prefixed onto raw octets, rendered as qualified Base64 text (`qb64`) or
//! its direct binary equivalent (`qb2`). The code's length fixes the
//! Base64 pad class, so a decoder never needs an out-of-band schema to
//! find the payload boundary.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::codex;
use crate::errors::{Error, Result};

/// Fully qualified cryptographic material: a derivation code plus raw
/// octets, immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CryMat {
    code: String,
    raw: Vec<u8>,
}

/// Shared accessors for qualified cryptographic material. `CryMat` is the
/// sole concrete implementation at this layer; domain-specific wrappers
/// ([`Verfer`], [`Diger`], [`Cigar`]) preconstrain which codes a
/// constructor will accept but expose the same contract.
pub trait Matter {
    fn code(&self) -> &str;
    fn raw(&self) -> &[u8];
    fn qb64(&self) -> Result<String>;
    fn qb2(&self) -> Result<Vec<u8>>;
    fn pad(&self) -> usize;
    fn is_transferable(&self) -> bool;
}

impl CryMat {
    /// Base64 pad count implied by a raw byte length: the remainder after
    /// dividing into 3-byte groups, expressed as how many bytes are missing
    /// to complete the final group.
    fn pad_of(raw: &[u8]) -> usize {
        let m = raw.len() % 3;
        if m == 0 {
            0
        } else {
            3 - m
        }
    }

    /// Construct from raw octets and an explicit derivation code. Fails if
    /// the code's pad class (implied by its length) disagrees with the pad
    /// class implied by `raw`'s length.
    pub fn new(raw: &[u8], code: &str) -> Result<Self> {
        let pad = Self::pad_of(raw);
        let ok = (pad == 1 && codex::is_one(code))
            || (pad == 2 && codex::is_two(code))
            || (pad == 0 && codex::is_four(code));
        if !ok {
            let msg = format!(
                "code {code} does not match pad class {pad} implied by raw length {}",
                raw.len()
            );
            tracing::trace!(code, pad, raw_len = raw.len(), "crymat construction rejected");
            return Err(Error::Validation(msg));
        }
        Ok(Self {
            code: code.to_string(),
            raw: raw.to_vec(),
        })
    }

    /// Construct by parsing a qualified Base64 string.
    ///
    /// Operates on the leading bytes rather than `str` slicing: derivation
    /// codes are always ASCII, but `qb64` is untrusted wire input and may
    /// start with an arbitrary multi-byte UTF-8 character, which would
    /// otherwise land a `&qb64[0..n]` slice mid-codepoint and panic instead
    /// of returning a graceful `Error::Argument`.
    pub fn from_qb64(qb64: &str) -> Result<Self> {
        let bytes = qb64.as_bytes();
        if bytes.is_empty() {
            return Err(Error::Argument("empty qb64".into()));
        }
        if !bytes[0].is_ascii() {
            return Err(Error::Argument(format!("improperly coded material = {qb64}")));
        }
        // Byte 0 is confirmed ASCII (one UTF-8 byte), so indexing at 1 lands
        // on a char boundary.
        let first = &qb64[0..1];
        let (code, pre) = if codex::is_one(first) {
            (first.to_string(), 1usize)
        } else if codex::is_select(first) {
            if bytes.len() < 2 || !bytes[1].is_ascii() {
                return Err(Error::Argument(format!("truncated qb64 = {qb64}")));
            }
            // Bytes 0 and 1 are both confirmed ASCII, so indexing at 2 lands
            // on a char boundary.
            let two = &qb64[0..2];
            if !codex::is_two(two) {
                return Err(Error::Validation(format!("unrecognized two-char code {two}")));
            }
            (two.to_string(), 2usize)
        } else {
            return Err(Error::Argument(format!("improperly coded material = {qb64}")));
        };

        let pad = pre % 4;
        let mut base = String::with_capacity(qb64.len() - pre + pad);
        base.push_str(&qb64[pre..]);
        base.push_str(&"=".repeat(pad));

        let raw = URL_SAFE
            .decode(base.as_bytes())
            .map_err(|e| Error::Argument(format!("improperly qualified material = {qb64}: {e}")))?;

        if raw.len() != (qb64.len() - pre) * 3 / 4 {
            return Err(Error::Argument(format!("improperly qualified material = {qb64}")));
        }

        Ok(Self { code, raw })
    }

    /// Construct from qualified binary: Base64-encode `qb2` and delegate to
    /// the `qb64` constructor.
    pub fn from_qb2(qb2: &[u8]) -> Result<Self> {
        let s = URL_SAFE.encode(qb2);
        Self::from_qb64(&s)
    }
}

impl Matter for CryMat {
    fn code(&self) -> &str {
        &self.code
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn qb64(&self) -> Result<String> {
        let pad = Self::pad_of(&self.raw);
        if self.code.len() % 4 != pad {
            return Err(Error::Validation(format!(
                "code {} pad class disagrees with raw of length {}",
                self.code,
                self.raw.len()
            )));
        }
        let full = URL_SAFE.encode(&self.raw);
        let stripped = &full[..full.len() - pad];
        Ok(format!("{}{}", self.code, stripped))
    }

    fn qb2(&self) -> Result<Vec<u8>> {
        let qb64 = self.qb64()?;
        let pad = self.pad();
        let mut padded = String::with_capacity(qb64.len() + pad);
        padded.push_str(&qb64);
        padded.push_str(&"=".repeat(pad));
        URL_SAFE
            .decode(padded.as_bytes())
            .map_err(|e| Error::Validation(format!("malformed qb64 while encoding qb2: {e}")))
    }

    fn pad(&self) -> usize {
        Self::pad_of(&self.raw)
    }

    fn is_transferable(&self) -> bool {
        !matches!(
            self.code.as_str(),
            codex::one::ED25519N | codex::one::ECDSA_256K1N
        )
    }
}

/// Thin wrapper preconstraining [`CryMat`] to verification-key codes.
pub struct Verfer(CryMat);

impl Verfer {
    pub fn new(raw: &[u8], code: &str) -> Result<Self> {
        match code {
            codex::one::ED25519N
            | codex::one::ED25519
            | codex::one::ECDSA_256K1N
            | codex::one::ECDSA_256K1 => Ok(Self(CryMat::new(raw, code)?)),
            _ => Err(Error::Validation(format!("{code} is not a verification-key code"))),
        }
    }

    pub fn matter(&self) -> &CryMat {
        &self.0
    }
}

/// Thin wrapper preconstraining [`CryMat`] to digest codes.
pub struct Diger(CryMat);

impl Diger {
    pub fn new(raw: &[u8], code: &str) -> Result<Self> {
        match code {
            codex::one::BLAKE3_256
            | codex::one::BLAKE2B_256
            | codex::one::BLAKE2S_256
            | codex::one::SHA3_256
            | codex::one::SHA2_256 => Ok(Self(CryMat::new(raw, code)?)),
            _ => Err(Error::Validation(format!("{code} is not a digest code"))),
        }
    }

    pub fn matter(&self) -> &CryMat {
        &self.0
    }
}

/// Thin wrapper preconstraining [`CryMat`] to signature codes.
pub struct Cigar(CryMat);

impl Cigar {
    pub fn new(raw: &[u8], code: &str) -> Result<Self> {
        match code {
            codex::two::ED25519 | codex::two::ECDSA_256K1 => Ok(Self(CryMat::new(raw, code)?)),
            _ => Err(Error::Validation(format!("{code} is not a signature code"))),
        }
    }

    pub fn matter(&self) -> &CryMat {
        &self.0
    }
}
