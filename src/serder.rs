//! `Serder` — versioned, multi-format key-event serialization.
//!
//! A `Serder` bundles `(raw, ked, kind, size)`: `raw[:size]` is the
//! canonical serialization of `ked` in `kind`, and `ked["vs"]` carries a
//! version string whose embedded size field equals `size`. The version
//! string is a fixed-width 17-byte token, which is what makes the
//! "serialize once with a placeholder size, then rewrite the size in
//! place" trick in [`exhale`] sound: the placeholder and the final string
//! always occupy exactly the same number of bytes.

use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use crate::errors::{Error, Result};
use crate::sad::{Sadder, SadValue};

/// Protocol version. Only `(1, 0)` is recognized at this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Versionage {
    pub major: u8,
    pub minor: u8,
}

/// The one protocol version this core understands.
pub const VERSION: Versionage = Versionage { major: 1, minor: 0 };

/// Width in bytes of the size field inside a version string.
const VERRAWSIZE: usize = 6;
/// Total width in bytes of a version string.
const VERFULLSIZE: usize = 17;
/// A version string must start no later than this offset in the stream.
const MAXVSOFFSET: usize = 12;

/// Serialization kind: the 4-letter tag embedded in the version string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Json,
    Mgpk,
    Cbor,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Json => "JSON",
            Kind::Mgpk => "MGPK",
            Kind::Cbor => "CBOR",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "JSON" => Ok(Kind::Json),
            "MGPK" => Ok(Kind::Mgpk),
            "CBOR" => Ok(Kind::Cbor),
            other => Err(Error::Validation(format!("unrecognized serialization kind {other}"))),
        }
    }

    /// Advisory MIME type for transport.
    pub fn mime(self) -> &'static str {
        match self {
            Kind::Json => "application/keri+json",
            Kind::Mgpk => "application/keri+msgpack",
            Kind::Cbor => "application/keri+cbor",
        }
    }
}

const VEREX: &str = r"KERI(?P<major>[0-9a-f])(?P<minor>[0-9a-f])(?P<kind>[A-Z]{4})(?P<size>[0-9a-f]{6})_";

static REVER: Lazy<Regex> = Lazy::new(|| Regex::new(VEREX).expect("static version regex is valid"));
static REVER_BYTES: Lazy<BytesRegex> =
    Lazy::new(|| BytesRegex::new(VEREX).expect("static version regex is valid"));

/// Build a version string: `KERI<major><minor><KIND><size>_`, 17 bytes,
/// hex digits lowercase, size zero-padded to 6 digits.
pub fn versify(version: Versionage, kind: Kind, size: u64) -> Result<String> {
    if size > 0xffffff {
        return Err(Error::Argument(format!("size {size} does not fit in {VERRAWSIZE} hex digits")));
    }
    Ok(format!(
        "KERI{:x}{:x}{}{:0width$x}_",
        version.major,
        version.minor,
        kind.as_str(),
        size,
        width = VERRAWSIZE
    ))
}

/// Parse a version string produced by [`versify`].
pub fn deversify(vs: &str) -> Result<(Kind, Versionage, usize)> {
    let caps = REVER
        .captures(vs)
        .ok_or_else(|| Error::Argument(format!("invalid version string = {vs}")))?;
    parse_captures_text(&caps)
}

fn parse_captures_text(caps: &regex::Captures<'_>) -> Result<(Kind, Versionage, usize)> {
    let major = u8::from_str_radix(&caps["major"], 16).expect("regex guarantees hex digit");
    let minor = u8::from_str_radix(&caps["minor"], 16).expect("regex guarantees hex digit");
    let kind = Kind::from_str(&caps["kind"])?;
    let size = usize::from_str_radix(&caps["size"], 16).expect("regex guarantees hex digits");
    Ok((kind, Versionage { major, minor }, size))
}

/// Locate a version string within the first [`MAXVSOFFSET`] bytes of a raw
/// stream and recover `(kind, version, size)`. Does not require the rest
/// of `raw` to be present beyond the version string itself, so it is safe
/// to call on a stream with only a few leading bytes buffered.
pub fn smell(raw: &[u8]) -> Result<(Kind, Versionage, usize)> {
    let window_end = raw.len().min(MAXVSOFFSET + VERFULLSIZE);
    let m = REVER_BYTES
        .find(&raw[..window_end])
        .ok_or_else(|| Error::Argument("no version string found in leading bytes".into()))?;
    if m.start() > MAXVSOFFSET {
        return Err(Error::Argument("version string offset exceeds 12 bytes".into()));
    }
    let caps = REVER_BYTES
        .captures(&raw[..window_end])
        .expect("find succeeded so captures must too");
    let major = u8::from_str_radix(std::str::from_utf8(&caps["major"]).unwrap(), 16).unwrap();
    let minor = u8::from_str_radix(std::str::from_utf8(&caps["minor"]).unwrap(), 16).unwrap();
    let kind = Kind::from_str(std::str::from_utf8(&caps["kind"]).unwrap())?;
    let size = usize::from_str_radix(std::str::from_utf8(&caps["size"]).unwrap(), 16).unwrap();
    Ok((kind, Versionage { major, minor }, size))
}

fn dumps(ked: &Sadder, kind: Kind) -> Result<Vec<u8>> {
    match kind {
        Kind::Json => Ok(serde_json::to_vec(ked)?),
        Kind::Mgpk => Ok(rmp_serde::to_vec(ked)?),
        Kind::Cbor => Ok(serde_cbor::to_vec(ked)?),
    }
}

fn loads(raw: &[u8], kind: Kind) -> Result<Sadder> {
    match kind {
        Kind::Json => Ok(serde_json::from_slice(raw)?),
        Kind::Mgpk => Ok(rmp_serde::from_slice(raw)?),
        Kind::Cbor => Ok(serde_cbor::from_slice(raw)?),
    }
}

/// An immutable `(raw, ked, kind, size)` bundle.
#[derive(Clone, Debug)]
pub struct Serder {
    raw: Vec<u8>,
    ked: Sadder,
    kind: Kind,
    size: usize,
}

impl Serder {
    /// Deserialize from a raw byte stream. Trailing bytes beyond the
    /// version string's declared size are discarded at this layer.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let (ked, kind, size) = inhale(raw)?;
        Ok(Self {
            raw: raw[..size].to_vec(),
            ked,
            kind,
            size,
        })
    }

    /// Serialize a key event mapping. `kind`, if given, overrides the kind
    /// named by `ked["vs"]`; the emitted event carries a rewritten `vs`
    /// reflecting the actual kind and size used.
    pub fn from_ked(ked: Sadder, kind: Option<Kind>) -> Result<Self> {
        let mut ked = ked;
        let (raw, kind) = exhale(&mut ked, kind)?;
        let size = raw.len();
        Ok(Self { raw, ked, kind, size })
    }

    /// An empty `Serder` exposing only the static helpers; all fields
    /// unset. Retained as a namespace-only factory object, matching the
    /// source implementation's permissive no-argument constructor.
    pub fn empty() -> Self {
        Self {
            raw: Vec::new(),
            ked: Sadder::new(),
            kind: Kind::Json,
            size: 0,
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn ked(&self) -> &Sadder {
        &self.ked
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

fn inhale(raw: &[u8]) -> Result<(Sadder, Kind, usize)> {
    let (kind, version, size) = smell(raw)?;
    if version != VERSION {
        return Err(Error::Version(format!(
            "unsupported version {}.{}",
            version.major, version.minor
        )));
    }
    let slice = raw
        .get(..size)
        .ok_or_else(|| Error::Argument("raw shorter than size declared in version string".into()))?;
    let ked = loads(slice, kind)?;
    Ok((ked, kind, size))
}

fn find_vs_span(raw: &[u8]) -> Result<(usize, usize)> {
    let window_end = raw.len().min(MAXVSOFFSET + VERFULLSIZE);
    let m = REVER_BYTES
        .find(&raw[..window_end])
        .ok_or_else(|| Error::Argument("invalid version string in serialized event".into()))?;
    if m.start() > MAXVSOFFSET {
        return Err(Error::Argument("version string offset exceeds 12 bytes".into()));
    }
    Ok((m.start(), m.end()))
}

fn exhale(ked: &mut Sadder, kind_override: Option<Kind>) -> Result<(Vec<u8>, Kind)> {
    let vs = ked
        .get("vs")
        .and_then(SadValue::as_str)
        .ok_or_else(|| Error::Argument("missing or empty version string in ked".into()))?
        .to_string();

    let (knd, version, _size) = deversify(&vs)?;
    if version != VERSION {
        tracing::trace!(major = version.major, minor = version.minor, "exhale rejected unsupported version");
        return Err(Error::Version(format!(
            "unsupported version {}.{}",
            version.major, version.minor
        )));
    }
    let kind = kind_override.unwrap_or(knd);

    let raw = dumps(ked, kind)?;
    let size = raw.len();
    let (fore, back) = find_vs_span(&raw)?;
    let vs = versify(version, kind, size as u64)?;

    let mut out = Vec::with_capacity(raw.len());
    out.extend_from_slice(&raw[..fore]);
    out.extend_from_slice(vs.as_bytes());
    out.extend_from_slice(&raw[back..]);

    if out.len() != size {
        return Err(Error::Argument(format!("malformed version string size = {vs}")));
    }

    ked.insert("vs".to_string(), SadValue::from(vs));
    Ok((out, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ked1() -> Sadder {
        let mut ked = Sadder::new();
        ked.insert("vs".to_string(), SadValue::from("KERI10JSON000000_"));
        ked.insert("id".to_string(), SadValue::from("ABCDEFG"));
        ked.insert("sn".to_string(), SadValue::from("0001"));
        ked.insert("ilk".to_string(), SadValue::from("rot"));
        ked
    }

    #[test]
    fn test_versify_json_zero_size() {
        let vs = versify(VERSION, Kind::Json, 0).unwrap();
        assert_eq!(vs, "KERI10JSON000000_");
        let (kind, version, size) = deversify(&vs).unwrap();
        assert_eq!(kind, Kind::Json);
        assert_eq!(version, VERSION);
        assert_eq!(size, 0);
    }

    #[test]
    fn test_versify_mgpk_explicit_size() {
        let vs = versify(VERSION, Kind::Mgpk, 65).unwrap();
        assert_eq!(vs, "KERI10MGPK000041_");
        let (kind, version, size) = deversify(&vs).unwrap();
        assert_eq!(kind, Kind::Mgpk);
        assert_eq!(version, VERSION);
        assert_eq!(size, 65);
    }

    #[test]
    fn test_json_exhale_length_and_vs() {
        let serder = Serder::from_ked(ked1(), None).unwrap();
        assert_eq!(serder.kind(), Kind::Json);
        assert_eq!(serder.size(), 65);
        assert_eq!(serder.ked().get("vs").unwrap().as_str().unwrap(), "KERI10JSON000041_");
    }

    #[test]
    fn test_json_inhale_discards_trailing_bytes() {
        let serder = Serder::from_ked(ked1(), None).unwrap();
        let mut raw = serder.raw().to_vec();
        raw.extend_from_slice(b"extra attached at the end.");
        let back = Serder::from_raw(&raw).unwrap();
        assert_eq!(back.size(), serder.size());
        assert_eq!(back.ked(), serder.ked());
        assert_eq!(back.raw(), serder.raw());
    }

    #[test]
    fn test_mgpk_round_trip_length() {
        let serder = Serder::from_ked(ked1(), Some(Kind::Mgpk)).unwrap();
        assert_eq!(serder.kind(), Kind::Mgpk);
        assert_eq!(serder.size(), 49);
        assert_eq!(serder.ked().get("vs").unwrap().as_str().unwrap(), "KERI10MGPK000031_");
    }

    #[test]
    fn test_cbor_round_trip_length() {
        let serder = Serder::from_ked(ked1(), Some(Kind::Cbor)).unwrap();
        assert_eq!(serder.kind(), Kind::Cbor);
        assert_eq!(serder.size(), 49);
        assert_eq!(serder.ked().get("vs").unwrap().as_str().unwrap(), "KERI10CBOR000031_");
    }

    #[test]
    fn test_cross_kind_reserialization() {
        let json_serder = Serder::from_ked(ked1(), None).unwrap();
        let mgpk_serder = Serder::from_ked(json_serder.ked().clone(), Some(Kind::Mgpk)).unwrap();
        assert_eq!(mgpk_serder.ked().get("vs").unwrap().as_str().unwrap(), "KERI10MGPK000031_");

        let roundtrip = Serder::from_raw(mgpk_serder.raw()).unwrap();
        assert_eq!(roundtrip.kind(), Kind::Mgpk);
        assert_eq!(roundtrip.ked(), mgpk_serder.ked());
    }

    #[test]
    fn test_missing_vs_is_argument_error() {
        let mut ked = Sadder::new();
        ked.insert("id".to_string(), SadValue::from("ABCDEFG"));
        let err = Serder::from_ked(ked, None).unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
    }

    #[test]
    fn test_unsupported_version_is_version_error() {
        let mut ked = ked1();
        ked.insert("vs".to_string(), SadValue::from("KERI20JSON000000_"));
        let err = Serder::from_ked(ked, None).unwrap_err();
        assert!(matches!(err, Error::Version(_)));
    }

    #[test]
    fn test_unrecognized_kind_in_version_string_is_rejected() {
        let err = deversify("KERI10XXXX000000_").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut ked = ked1();
        ked.insert("vs".to_string(), SadValue::from("KERI10XXXX000000_"));
        let err = Serder::from_ked(ked, None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_sniff_rejects_offset_past_12() {
        let mut raw = vec![b' '; 13];
        raw.extend_from_slice(b"KERI10JSON000000_{}");
        let err = smell(&raw).unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
    }

    #[test]
    fn test_empty_serder_has_no_fields_set() {
        let s = Serder::empty();
        assert_eq!(s.size(), 0);
        assert!(s.ked().is_empty());
    }
}
