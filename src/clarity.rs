use crate::principal::Principal;
use std::collections::BTreeMap;
use thiserror::Error;

// Wire type tags for ledger value envelopes.
const TAG_INT: u8 = 0x00;
const TAG_UINT: u8 = 0x01;
const TAG_BUFFER: u8 = 0x02;
const TAG_BOOL_TRUE: u8 = 0x03;
const TAG_BOOL_FALSE: u8 = 0x04;
const TAG_PRINCIPAL: u8 = 0x05;
const TAG_CONTRACT_PRINCIPAL: u8 = 0x06;
const TAG_RESPONSE_OK: u8 = 0x07;
const TAG_RESPONSE_ERR: u8 = 0x08;
const TAG_OPTIONAL_NONE: u8 = 0x09;
const TAG_OPTIONAL_SOME: u8 = 0x0a;
const TAG_LIST: u8 = 0x0b;
const TAG_TUPLE: u8 = 0x0c;
const TAG_STRING_ASCII: u8 = 0x0d;
const TAG_STRING_UTF8: u8 = 0x0e;

const MAX_DEPTH: usize = 64;

/// One on-chain value envelope, decoded into its tagged variant. Shapes the
/// codec does not recognize are rejected rather than silently defaulted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    Uint(u128),
    Buffer(Vec<u8>),
    Bool(bool),
    Principal(Principal),
    ContractPrincipal(Principal, String),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
    StringAscii(String),
    StringUtf8(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClarityError {
    #[error("invalid hex framing: {0}")]
    InvalidHex(String),
    #[error("value truncated at byte {0}")]
    Truncated(usize),
    #[error("unknown type tag 0x{0:02x}")]
    UnknownTag(u8),
    #[error("name is not printable ascii")]
    BadName,
    #[error("value nesting exceeds depth {MAX_DEPTH}")]
    TooDeep,
    #[error("trailing bytes after value")]
    TrailingBytes,
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: String,
    },
}

impl ClarityValue {
    pub fn some(inner: ClarityValue) -> Self {
        ClarityValue::OptionalSome(Box::new(inner))
    }

    pub fn ok(inner: ClarityValue) -> Self {
        ClarityValue::ResponseOk(Box::new(inner))
    }

    /// Short shape label used in decode-anomaly messages.
    pub fn shape(&self) -> &'static str {
        match self {
            ClarityValue::Int(_) => "int",
            ClarityValue::Uint(_) => "uint",
            ClarityValue::Buffer(_) => "buffer",
            ClarityValue::Bool(_) => "bool",
            ClarityValue::Principal(_) => "principal",
            ClarityValue::ContractPrincipal(..) => "contract principal",
            ClarityValue::ResponseOk(_) => "response ok",
            ClarityValue::ResponseErr(_) => "response err",
            ClarityValue::OptionalNone => "none",
            ClarityValue::OptionalSome(_) => "some",
            ClarityValue::List(_) => "list",
            ClarityValue::Tuple(_) => "tuple",
            ClarityValue::StringAscii(_) => "string-ascii",
            ClarityValue::StringUtf8(_) => "string-utf8",
        }
    }

    pub fn expect_uint(&self) -> Result<u128, ClarityError> {
        match self {
            ClarityValue::Uint(n) => Ok(*n),
            other => Err(shape_error("uint", other)),
        }
    }

    pub fn expect_bool(&self) -> Result<bool, ClarityError> {
        match self {
            ClarityValue::Bool(b) => Ok(*b),
            other => Err(shape_error("bool", other)),
        }
    }

    pub fn expect_principal(&self) -> Result<Principal, ClarityError> {
        match self {
            ClarityValue::Principal(p) => Ok(*p),
            ClarityValue::ContractPrincipal(p, _) => Ok(*p),
            other => Err(shape_error("principal", other)),
        }
    }

    pub fn expect_tuple(&self) -> Result<&BTreeMap<String, ClarityValue>, ClarityError> {
        match self {
            ClarityValue::Tuple(entries) => Ok(entries),
            other => Err(shape_error("tuple", other)),
        }
    }

    /// Strips a response envelope if one is present. A bare value passes
    /// through; an err response surfaces the ledger-reported payload.
    pub fn into_response(self) -> Result<ClarityValue, ClarityError> {
        match self {
            ClarityValue::ResponseOk(inner) => Ok(*inner),
            ClarityValue::ResponseErr(inner) => Err(ClarityError::UnexpectedShape {
                expected: "ok response",
                found: format!("err {}", inner.shape()),
            }),
            other => Ok(other),
        }
    }

    /// Flattens an optional envelope. A bare value counts as present.
    pub fn into_optional(self) -> Option<ClarityValue> {
        match self {
            ClarityValue::OptionalNone => None,
            ClarityValue::OptionalSome(inner) => Some(*inner),
            other => Some(other),
        }
    }

    pub fn encode_hex(&self) -> String {
        let mut out = Vec::new();
        self.serialize_into(&mut out);
        format!("0x{}", hex::encode(out))
    }

    pub fn decode_hex(input: &str) -> Result<ClarityValue, ClarityError> {
        let stripped = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(stripped)
            .map_err(|e| ClarityError::InvalidHex(e.to_string()))?;
        let mut cursor = Cursor { bytes: &bytes, pos: 0 };
        let value = deserialize(&mut cursor, 0)?;
        if cursor.pos != bytes.len() {
            return Err(ClarityError::TrailingBytes);
        }
        Ok(value)
    }

    fn serialize_into(&self, out: &mut Vec<u8>) {
        match self {
            ClarityValue::Int(n) => {
                out.push(TAG_INT);
                out.extend_from_slice(&n.to_be_bytes());
            }
            ClarityValue::Uint(n) => {
                out.push(TAG_UINT);
                out.extend_from_slice(&n.to_be_bytes());
            }
            ClarityValue::Buffer(bytes) => {
                out.push(TAG_BUFFER);
                out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            ClarityValue::Bool(true) => out.push(TAG_BOOL_TRUE),
            ClarityValue::Bool(false) => out.push(TAG_BOOL_FALSE),
            ClarityValue::Principal(p) => {
                out.push(TAG_PRINCIPAL);
                out.push(p.version());
                out.extend_from_slice(p.hash160());
            }
            ClarityValue::ContractPrincipal(p, name) => {
                out.push(TAG_CONTRACT_PRINCIPAL);
                out.push(p.version());
                out.extend_from_slice(p.hash160());
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
            }
            ClarityValue::ResponseOk(inner) => {
                out.push(TAG_RESPONSE_OK);
                inner.serialize_into(out);
            }
            ClarityValue::ResponseErr(inner) => {
                out.push(TAG_RESPONSE_ERR);
                inner.serialize_into(out);
            }
            ClarityValue::OptionalNone => out.push(TAG_OPTIONAL_NONE),
            ClarityValue::OptionalSome(inner) => {
                out.push(TAG_OPTIONAL_SOME);
                inner.serialize_into(out);
            }
            ClarityValue::List(items) => {
                out.push(TAG_LIST);
                out.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for item in items {
                    item.serialize_into(out);
                }
            }
            ClarityValue::Tuple(entries) => {
                out.push(TAG_TUPLE);
                out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
                for (name, value) in entries {
                    out.push(name.len() as u8);
                    out.extend_from_slice(name.as_bytes());
                    value.serialize_into(out);
                }
            }
            ClarityValue::StringAscii(s) => {
                out.push(TAG_STRING_ASCII);
                out.extend_from_slice(&(s.len() as u32).to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            ClarityValue::StringUtf8(s) => {
                out.push(TAG_STRING_UTF8);
                out.extend_from_slice(&(s.len() as u32).to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
        }
    }
}

fn shape_error(expected: &'static str, found: &ClarityValue) -> ClarityError {
    ClarityError::UnexpectedShape {
        expected,
        found: found.shape().to_string(),
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ClarityError> {
        if self.pos + n > self.bytes.len() {
            return Err(ClarityError::Truncated(self.bytes.len()));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, ClarityError> {
        Ok(self.take(1)?[0])
    }

    fn take_u32(&mut self) -> Result<u32, ClarityError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take_name(&mut self) -> Result<String, ClarityError> {
        let len = self.take_u8()? as usize;
        let bytes = self.take(len)?;
        let name = std::str::from_utf8(bytes).map_err(|_| ClarityError::BadName)?;
        if !name.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ClarityError::BadName);
        }
        Ok(name.to_string())
    }

    fn take_principal(&mut self) -> Result<Principal, ClarityError> {
        let version = self.take_u8()?;
        let bytes = self.take(20)?;
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(bytes);
        Ok(Principal::new(version, hash160))
    }
}

fn deserialize(cursor: &mut Cursor<'_>, depth: usize) -> Result<ClarityValue, ClarityError> {
    if depth > MAX_DEPTH {
        return Err(ClarityError::TooDeep);
    }
    let tag = cursor.take_u8()?;
    match tag {
        TAG_INT => {
            let bytes = cursor.take(16)?;
            let mut raw = [0u8; 16];
            raw.copy_from_slice(bytes);
            Ok(ClarityValue::Int(i128::from_be_bytes(raw)))
        }
        TAG_UINT => {
            let bytes = cursor.take(16)?;
            let mut raw = [0u8; 16];
            raw.copy_from_slice(bytes);
            Ok(ClarityValue::Uint(u128::from_be_bytes(raw)))
        }
        TAG_BUFFER => {
            let len = cursor.take_u32()? as usize;
            Ok(ClarityValue::Buffer(cursor.take(len)?.to_vec()))
        }
        TAG_BOOL_TRUE => Ok(ClarityValue::Bool(true)),
        TAG_BOOL_FALSE => Ok(ClarityValue::Bool(false)),
        TAG_PRINCIPAL => Ok(ClarityValue::Principal(cursor.take_principal()?)),
        TAG_CONTRACT_PRINCIPAL => {
            let principal = cursor.take_principal()?;
            let name = cursor.take_name()?;
            Ok(ClarityValue::ContractPrincipal(principal, name))
        }
        TAG_RESPONSE_OK => Ok(ClarityValue::ResponseOk(Box::new(deserialize(
            cursor,
            depth + 1,
        )?))),
        TAG_RESPONSE_ERR => Ok(ClarityValue::ResponseErr(Box::new(deserialize(
            cursor,
            depth + 1,
        )?))),
        TAG_OPTIONAL_NONE => Ok(ClarityValue::OptionalNone),
        TAG_OPTIONAL_SOME => Ok(ClarityValue::OptionalSome(Box::new(deserialize(
            cursor,
            depth + 1,
        )?))),
        TAG_LIST => {
            let count = cursor.take_u32()? as usize;
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(deserialize(cursor, depth + 1)?);
            }
            Ok(ClarityValue::List(items))
        }
        TAG_TUPLE => {
            let count = cursor.take_u32()? as usize;
            let mut entries = BTreeMap::new();
            for _ in 0..count {
                let name = cursor.take_name()?;
                let value = deserialize(cursor, depth + 1)?;
                entries.insert(name, value);
            }
            Ok(ClarityValue::Tuple(entries))
        }
        TAG_STRING_ASCII => {
            let len = cursor.take_u32()? as usize;
            let bytes = cursor.take(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| ClarityError::BadName)?;
            Ok(ClarityValue::StringAscii(s.to_string()))
        }
        TAG_STRING_UTF8 => {
            let len = cursor.take_u32()? as usize;
            let bytes = cursor.take(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| ClarityError::BadName)?;
            Ok(ClarityValue::StringUtf8(s.to_string()))
        }
        other => Err(ClarityError::UnknownTag(other)),
    }
}
