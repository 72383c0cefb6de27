// a small object model built on hand-written encodings
use std::collections::BTreeMap;

use pack_msgpack::{
    encode, to_vec, to_writer, Config, Encode, EncodedValue, Encoder, ErrorKind, Result, Timestamp,
};
use pack_msgpack::pack_write::SliceWriter;

/// A base type every document shares
struct Record {
    id: u32,
    created: Timestamp,
}

impl Encode for Record {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut map = encoder.open_map()?;
        map.put("id", &self.id)?;
        map.put("created", &self.created)
    }
}

/// Extends `Record` and lets it encode itself under "super"
struct Article {
    base: Record,
    title: String,
    tags: Vec<&'static str>,
    draft: Option<bool>,
}

impl Encode for Article {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut map = encoder.open_map()?;
        map.with_super(|base| self.base.encode(base))?;
        map.put("title", &self.title)?;
        map.put("tags", &self.tags)?;
        map.put("draft", &self.draft)
    }
}

/// Reserves "super" first but fills it only after its own fields
struct LateBase {
    base: Record,
    body: &'static str,
}

impl Encode for LateBase {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut map = encoder.open_map()?;
        let mut base = map.defer_super()?;
        map.put("body", self.body)?;
        self.base.encode(base.encoder())?;
        map.commit(base)
    }
}

fn article() -> Article {
    Article {
        base: Record { id: 300, created: Timestamp::from_unix_secs(0x5f5e_1000) },
        title: "Hello".into(),
        tags: vec!["a", "b"],
        draft: None,
    }
}

fn text(s: &str) -> Vec<u8> {
    let mut out = vec![0xa0 | s.len() as u8];
    out.extend_from_slice(s.as_bytes());
    out
}

fn record_bytes() -> Vec<u8> {
    let mut out = vec![0x82];
    out.extend(text("id"));
    out.extend([0xcd, 0x01, 0x2c]);
    out.extend(text("created"));
    out.extend([0xd6, 0xff, 0x5f, 0x5e, 0x10, 0x00]);
    out
}

#[test]
fn base_encodes_under_super() {
    let mut expected = vec![0x84];
    expected.extend(text("super"));
    expected.extend(record_bytes());
    expected.extend(text("title"));
    expected.extend(text("Hello"));
    expected.extend(text("tags"));
    expected.extend([0x92, 0xa1, b'a', 0xa1, b'b']);
    expected.extend(text("draft"));
    expected.push(0xc0);
    assert_eq!(to_vec(&article()).unwrap(), expected);
}

#[test]
fn deferred_slot_keeps_reservation_order() {
    let value = LateBase {
        base: Record { id: 300, created: Timestamp::from_unix_secs(0x5f5e_1000) },
        body: "x",
    };
    let mut expected = vec![0x82];
    expected.extend(text("super"));
    expected.extend(record_bytes());
    expected.extend(text("body"));
    expected.extend(text("x"));
    assert_eq!(to_vec(&value).unwrap(), expected);
}

#[test]
fn encoding_is_deterministic() {
    let first = to_vec(&article()).unwrap();
    for _ in 0..3 {
        assert_eq!(to_vec(&article()).unwrap(), first);
    }
}

/// Splices pre-encoded documents into an array without encoding them again
struct Batch(Vec<EncodedValue>);

impl Encode for Batch {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut seq = encoder.open_seq()?;
        for item in &self.0 {
            seq.append_raw(item.clone());
        }
        Ok(())
    }
}

#[test]
fn pre_encoded_values_are_spliced() {
    let one = EncodedValue::from_msgpack_unchecked(to_vec(&article()).unwrap());
    let batch = Batch(vec![one.clone(), one.clone()]);
    let bytes = to_vec(&batch).unwrap();
    assert_eq!(bytes[0], 0x92);
    assert_eq!(&bytes[1..], [one.as_bytes(), one.as_bytes()].concat());
}

/// Encodes itself differently depending on what the caller asked for
struct Redacted<'a>(&'a str);

impl Encode for Redacted<'_> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        if encoder.user_info().get::<bool>("redact").copied().unwrap_or(false) {
            encoder.encode_nil()
        } else {
            encoder.encode_str(self.0)
        }
    }
}

#[test]
fn user_info_reaches_every_level() {
    let mut doc = BTreeMap::new();
    doc.insert("secret", vec![Redacted("pw")]);
    assert_eq!(to_vec(&doc).unwrap(),
               [0x81, 0xa6, b's', b'e', b'c', b'r', b'e', b't', 0x91, 0xa2, b'p', b'w']);
    let mut config = Config::new();
    config.user_info_mut().insert("redact", true);
    assert_eq!(encode(&doc, &config).unwrap(),
               [0x81, 0xa6, b's', b'e', b'c', b'r', b'e', b't', 0x91, 0xc0]);
}

struct Broken;

impl Encode for Broken {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut map = encoder.open_map()?;
        map.put("ok", &1u8)?;
        map.nested_seq("items", |seq| {
            seq.append(&1u8)?;
            seq.append_with(|item| {
                item.encode_u64(2)?;
                item.encode_u64(3)
            })
        })
    }
}

#[test]
fn contract_violation_is_located() {
    let err = to_vec(&Broken).unwrap_err();
    assert!(err.is_contract_violation());
    assert!(matches!(err.kind(), ErrorKind::InvalidTraversal(_)));
    assert_eq!(err.path().to_string(), "$.items[1]");
    assert!(err.to_string().ends_with("at $.items[1]"));
}

#[test]
fn nothing_is_written_on_error() {
    let mut buf = [0u8; 64];
    let mut writer = SliceWriter::new(&mut buf);
    assert!(to_writer(&mut writer, &Broken, &Config::default()).is_err());
    assert!(writer.is_empty());
    to_writer(&mut writer, &article().base, &Config::default()).unwrap();
    assert_eq!(writer.as_ref(), record_bytes());
}

#[test]
fn nothing_encoded_is_an_empty_map() {
    struct Nothing;
    impl Encode for Nothing {
        fn encode(&self, _encoder: &mut Encoder<'_>) -> Result<()> {
            Ok(())
        }
    }
    assert_eq!(to_vec(&Nothing).unwrap(), [0x80]);
    assert_eq!(to_vec(&vec![Nothing, Nothing]).unwrap(), [0x92, 0x80, 0x80]);
}
