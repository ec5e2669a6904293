//! Account payload layout: decoding and encoding.
//!
//! Payloads are the 8-byte discriminator followed by the account's fields in
//! declaration order, Borsh-encoded:
//!
//! | type | encoding |
//! |------|----------|
//! | integers, floats | little-endian, fixed width |
//! | `bool` | one byte, `0` or `1` |
//! | `pubkey` | 32 raw bytes |
//! | `string`, `bytes`, `vec<T>` | `u32` length, then contents |
//! | `option<T>` | `0` or `1` tag, then `T` when `1` |
//! | `[T; N]` | `N` consecutive `T` |
//! | enum | `u8` variant index, then the variant's fields |
//!
//! Bytes left after the last field are ignored; accounts are often allocated
//! with headroom for longer text.

use std::collections::BTreeMap;

use reviews_types::Pubkey;
use serde_json::{json, Value};

use crate::discriminator::DISCRIMINATOR_LEN;
use crate::error::DecodeError;
use crate::idl::{Field, Idl, IdlType, TypeDef};

/// Nesting limit for `defined` types; a self-containing struct would
/// otherwise recurse without consuming input.
const MAX_DEPTH: usize = 32;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Unsigned(u128),
    Signed(i128),
    Float(f64),
    Text(String),
    Address(Pubkey),
    Bytes(Vec<u8>),
    Optional(Option<Box<FieldValue>>),
    List(Vec<FieldValue>),
    Struct(Vec<(String, FieldValue)>),
    Enum {
        variant: String,
        fields: Vec<(String, FieldValue)>,
    },
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Pubkey> {
        match self {
            FieldValue::Address(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u128> {
        match self {
            FieldValue::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    /// JSON form for output. 64- and 128-bit integers become strings when they
    /// exceed what a JSON number holds exactly.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => json!(b),
            FieldValue::Unsigned(n) => match u64::try_from(*n) {
                Ok(v) if v <= (1u64 << 53) => json!(v),
                _ => json!(n.to_string()),
            },
            FieldValue::Signed(n) => match i64::try_from(*n) {
                Ok(v) if v.unsigned_abs() <= (1u64 << 53) => json!(v),
                _ => json!(n.to_string()),
            },
            FieldValue::Float(x) => json!(x),
            FieldValue::Text(s) => json!(s),
            FieldValue::Address(key) => json!(key.to_string()),
            FieldValue::Bytes(bytes) => json!(hex::encode(bytes)),
            FieldValue::Optional(inner) => inner.as_ref().map_or(Value::Null, |v| v.to_json()),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Struct(fields) => fields_to_json(fields),
            FieldValue::Enum { variant, fields } if fields.is_empty() => json!(variant),
            FieldValue::Enum { variant, fields } => {
                let mut map = serde_json::Map::new();
                map.insert(variant.clone(), fields_to_json(fields));
                Value::Object(map)
            }
        }
    }
}

fn fields_to_json(fields: &[(String, FieldValue)]) -> Value {
    let map: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    Value::Object(map)
}

/// Field names compare equal across camelCase and snake_case spellings, so
/// `listedBy` (legacy IDLs) finds `listed_by` (current IDLs) and vice versa.
fn name_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A decoded account: its type name and fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAccount {
    pub type_name: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl DecodedAccount {
    /// Look up a field by name, tolerating camelCase/snake_case differences.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        if let Some((_, value)) = self.fields.iter().find(|(n, _)| n == name) {
            return Some(value);
        }
        let key = name_key(name);
        self.fields
            .iter()
            .find(|(n, _)| name_key(n) == key)
            .map(|(_, v)| v)
    }

    pub fn to_json(&self) -> Value {
        fields_to_json(&self.fields)
    }
}

/// Byte cursor over one payload.
pub struct LayoutReader<'a> {
    type_name: &'a str,
    data: &'a [u8],
    offset: usize,
}

impl<'a> LayoutReader<'a> {
    pub fn new(type_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            type_name,
            data,
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Advance by `n` bytes, or fail without moving.
    pub fn take(&mut self, n: usize, field: &str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::TruncatedPayload {
                type_name: self.type_name.to_string(),
                field: field.to_string(),
                offset: self.offset,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], DecodeError> {
        let bytes = self.take(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>(field)?[0])
    }

    pub fn read_u32(&mut self, field: &str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array(field)?))
    }

    pub fn read_pubkey(&mut self, field: &str) -> Result<Pubkey, DecodeError> {
        Ok(Pubkey::new(self.take_array(field)?))
    }

    /// `u32` length prefix followed by that many bytes.
    pub fn read_len_prefixed(&mut self, field: &str) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u32(field)? as usize;
        self.take(len, field)
    }

    pub fn read_string(&mut self, field: &str) -> Result<String, DecodeError> {
        let bytes = self.read_len_prefixed(field)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            DecodeError::mismatch(self.type_name, format!("{} is not valid UTF-8: {}", field, e))
        })
    }

    fn mismatch(&self, reason: String) -> DecodeError {
        DecodeError::mismatch(self.type_name, reason)
    }
}

/// Decode `payload` as account type `type_name` of `idl`.
///
/// Re-checks the discriminator even when the payload came from a filtered
/// scan.
pub fn decode_account(
    idl: &Idl,
    type_name: &str,
    payload: &[u8],
) -> Result<DecodedAccount, DecodeError> {
    let account = idl.account(type_name).ok_or_else(|| DecodeError::UnknownType {
        type_name: type_name.to_string(),
    })?;

    let mut reader = LayoutReader::new(type_name, payload);
    let tag = reader.take(DISCRIMINATOR_LEN, "discriminator")?;
    if tag != account.discriminator.as_bytes() {
        return Err(DecodeError::mismatch(
            type_name,
            format!(
                "discriminator {} does not match expected {}",
                hex::encode(tag),
                account.discriminator
            ),
        ));
    }

    let fields = decode_fields(idl, &mut reader, &account.fields, "", 0)?;
    Ok(DecodedAccount {
        type_name: type_name.to_string(),
        fields,
    })
}

fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn decode_fields(
    idl: &Idl,
    reader: &mut LayoutReader<'_>,
    fields: &[Field],
    prefix: &str,
    depth: usize,
) -> Result<Vec<(String, FieldValue)>, DecodeError> {
    fields
        .iter()
        .map(|field| {
            let path = field_path(prefix, &field.name);
            let value = decode_value(idl, reader, &field.ty, &path, depth)?;
            Ok((field.name.clone(), value))
        })
        .collect()
}

fn decode_value(
    idl: &Idl,
    reader: &mut LayoutReader<'_>,
    ty: &IdlType,
    path: &str,
    depth: usize,
) -> Result<FieldValue, DecodeError> {
    let value = match ty {
        IdlType::Bool => match reader.read_u8(path)? {
            0 => FieldValue::Bool(false),
            1 => FieldValue::Bool(true),
            other => return Err(reader.mismatch(format!("{} has bool byte {}", path, other))),
        },
        IdlType::U8 => FieldValue::Unsigned(reader.read_u8(path)?.into()),
        IdlType::U16 => FieldValue::Unsigned(u16::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::U32 => FieldValue::Unsigned(reader.read_u32(path)?.into()),
        IdlType::U64 => FieldValue::Unsigned(u64::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::U128 => FieldValue::Unsigned(u128::from_le_bytes(reader.take_array(path)?)),
        IdlType::I8 => FieldValue::Signed(i8::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::I16 => FieldValue::Signed(i16::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::I32 => FieldValue::Signed(i32::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::I64 => FieldValue::Signed(i64::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::I128 => FieldValue::Signed(i128::from_le_bytes(reader.take_array(path)?)),
        IdlType::F32 => FieldValue::Float(f32::from_le_bytes(reader.take_array(path)?).into()),
        IdlType::F64 => FieldValue::Float(f64::from_le_bytes(reader.take_array(path)?)),
        IdlType::String => FieldValue::Text(reader.read_string(path)?),
        IdlType::Pubkey => FieldValue::Address(reader.read_pubkey(path)?),
        IdlType::Bytes => FieldValue::Bytes(reader.read_len_prefixed(path)?.to_vec()),
        IdlType::Option(inner) => match reader.read_u8(path)? {
            0 => FieldValue::Optional(None),
            1 => FieldValue::Optional(Some(Box::new(decode_value(
                idl, reader, inner, path, depth,
            )?))),
            other => return Err(reader.mismatch(format!("{} has option tag {}", path, other))),
        },
        IdlType::Vec(inner) => {
            let len = reader.read_u32(path)? as usize;
            // Every element takes at least one byte, except empty structs.
            let mut items = Vec::with_capacity(len.min(reader.remaining()));
            for i in 0..len {
                let item_path = format!("{}[{}]", path, i);
                items.push(decode_value(idl, reader, inner, &item_path, depth)?);
            }
            FieldValue::List(items)
        }
        IdlType::Array(inner, len) => {
            let mut items = Vec::with_capacity((*len).min(reader.remaining()));
            for i in 0..*len {
                let item_path = format!("{}[{}]", path, i);
                items.push(decode_value(idl, reader, inner, &item_path, depth)?);
            }
            FieldValue::List(items)
        }
        IdlType::Defined(name) => {
            if depth >= MAX_DEPTH {
                return Err(reader.mismatch(format!("{} nests deeper than {}", path, MAX_DEPTH)));
            }
            match idl.type_def(name) {
                Some(TypeDef::Struct(fields)) => {
                    FieldValue::Struct(decode_fields(idl, reader, fields, path, depth + 1)?)
                }
                Some(TypeDef::Enum(variants)) => {
                    let index = reader.read_u8(path)? as usize;
                    let variant = variants.get(index).ok_or_else(|| {
                        reader.mismatch(format!(
                            "{} has variant index {} but {} declares {}",
                            path,
                            index,
                            name,
                            variants.len()
                        ))
                    })?;
                    let fields = decode_fields(idl, reader, &variant.fields, path, depth + 1)?;
                    FieldValue::Enum {
                        variant: variant.name.clone(),
                        fields,
                    }
                }
                None => {
                    return Err(DecodeError::UnknownType {
                        type_name: name.clone(),
                    })
                }
            }
        }
    };
    Ok(value)
}

/// Encode `account` in the layout of `type_name`: discriminator, then fields.
///
/// Fields are matched by name (camelCase/snake_case tolerant) so a record
/// decoded against one IDL generation encodes against the other.
pub fn encode_account(
    idl: &Idl,
    type_name: &str,
    account: &DecodedAccount,
) -> Result<Vec<u8>, DecodeError> {
    let def = idl.account(type_name).ok_or_else(|| DecodeError::UnknownType {
        type_name: type_name.to_string(),
    })?;
    let mut writer = LayoutWriter {
        idl,
        type_name,
        buf: def.discriminator.as_bytes().to_vec(),
    };
    let values: BTreeMap<String, &FieldValue> = account
        .fields
        .iter()
        .map(|(name, value)| (name_key(name), value))
        .collect();
    for field in &def.fields {
        let value = values.get(&name_key(&field.name)).ok_or_else(|| {
            DecodeError::mismatch(type_name, format!("missing field {}", field.name))
        })?;
        writer.write_value(&field.ty, value, &field.name, 0)?;
    }
    Ok(writer.buf)
}

struct LayoutWriter<'a> {
    idl: &'a Idl,
    type_name: &'a str,
    buf: Vec<u8>,
}

impl LayoutWriter<'_> {
    fn mismatch(&self, path: &str, ty: &IdlType, value: &FieldValue) -> DecodeError {
        DecodeError::mismatch(
            self.type_name,
            format!("{} declared {} cannot hold {:?}", path, ty, value),
        )
    }

    fn write_len(&mut self, len: usize, path: &str) -> Result<(), DecodeError> {
        let len = u32::try_from(len).map_err(|_| {
            DecodeError::mismatch(self.type_name, format!("{} is longer than u32::MAX", path))
        })?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn write_unsigned(&mut self, n: u128, width: usize, path: &str) -> Result<(), DecodeError> {
        if width < 16 && n >> (width * 8) != 0 {
            return Err(DecodeError::mismatch(
                self.type_name,
                format!("{} value {} does not fit in {} bytes", path, n, width),
            ));
        }
        self.buf.extend_from_slice(&n.to_le_bytes()[..width]);
        Ok(())
    }

    fn write_signed(&mut self, n: i128, width: usize, path: &str) -> Result<(), DecodeError> {
        let bits = width * 8;
        if width < 16 {
            let min = -(1i128 << (bits - 1));
            let max = (1i128 << (bits - 1)) - 1;
            if n < min || n > max {
                return Err(DecodeError::mismatch(
                    self.type_name,
                    format!("{} value {} does not fit in {} bytes", path, n, width),
                ));
            }
        }
        self.buf.extend_from_slice(&n.to_le_bytes()[..width]);
        Ok(())
    }

    fn write_fields(
        &mut self,
        declared: &[Field],
        values: &[(String, FieldValue)],
        path: &str,
        depth: usize,
    ) -> Result<(), DecodeError> {
        if declared.len() != values.len() {
            return Err(DecodeError::mismatch(
                self.type_name,
                format!(
                    "{} declares {} fields, value has {}",
                    path,
                    declared.len(),
                    values.len()
                ),
            ));
        }
        for (field, (_, value)) in declared.iter().zip(values) {
            self.write_value(&field.ty, value, &field_path(path, &field.name), depth)?;
        }
        Ok(())
    }

    fn write_value(
        &mut self,
        ty: &IdlType,
        value: &FieldValue,
        path: &str,
        depth: usize,
    ) -> Result<(), DecodeError> {
        match (ty, value) {
            (IdlType::Bool, FieldValue::Bool(b)) => self.buf.push(u8::from(*b)),
            (IdlType::U8, FieldValue::Unsigned(n)) => self.write_unsigned(*n, 1, path)?,
            (IdlType::U16, FieldValue::Unsigned(n)) => self.write_unsigned(*n, 2, path)?,
            (IdlType::U32, FieldValue::Unsigned(n)) => self.write_unsigned(*n, 4, path)?,
            (IdlType::U64, FieldValue::Unsigned(n)) => self.write_unsigned(*n, 8, path)?,
            (IdlType::U128, FieldValue::Unsigned(n)) => self.write_unsigned(*n, 16, path)?,
            (IdlType::I8, FieldValue::Signed(n)) => self.write_signed(*n, 1, path)?,
            (IdlType::I16, FieldValue::Signed(n)) => self.write_signed(*n, 2, path)?,
            (IdlType::I32, FieldValue::Signed(n)) => self.write_signed(*n, 4, path)?,
            (IdlType::I64, FieldValue::Signed(n)) => self.write_signed(*n, 8, path)?,
            (IdlType::I128, FieldValue::Signed(n)) => self.write_signed(*n, 16, path)?,
            (IdlType::F32, FieldValue::Float(x)) => {
                self.buf.extend_from_slice(&(*x as f32).to_le_bytes())
            }
            (IdlType::F64, FieldValue::Float(x)) => self.buf.extend_from_slice(&x.to_le_bytes()),
            (IdlType::String, FieldValue::Text(s)) => {
                self.write_len(s.len(), path)?;
                self.buf.extend_from_slice(s.as_bytes());
            }
            (IdlType::Pubkey, FieldValue::Address(key)) => {
                self.buf.extend_from_slice(key.as_bytes())
            }
            (IdlType::Bytes, FieldValue::Bytes(bytes)) => {
                self.write_len(bytes.len(), path)?;
                self.buf.extend_from_slice(bytes);
            }
            (IdlType::Option(_), FieldValue::Optional(None)) => self.buf.push(0),
            (IdlType::Option(inner), FieldValue::Optional(Some(v))) => {
                self.buf.push(1);
                self.write_value(inner, v, path, depth)?;
            }
            (IdlType::Vec(inner), FieldValue::List(items)) => {
                self.write_len(items.len(), path)?;
                for (i, item) in items.iter().enumerate() {
                    self.write_value(inner, item, &format!("{}[{}]", path, i), depth)?;
                }
            }
            (IdlType::Array(inner, len), FieldValue::List(items)) if items.len() == *len => {
                for (i, item) in items.iter().enumerate() {
                    self.write_value(inner, item, &format!("{}[{}]", path, i), depth)?;
                }
            }
            (IdlType::Defined(name), _) => {
                if depth >= MAX_DEPTH {
                    return Err(DecodeError::mismatch(
                        self.type_name,
                        format!("{} nests deeper than {}", path, MAX_DEPTH),
                    ));
                }
                let idl = self.idl;
                match (idl.type_def(name), value) {
                    (Some(TypeDef::Struct(declared)), FieldValue::Struct(values)) => {
                        self.write_fields(declared, values, path, depth + 1)?
                    }
                    (Some(TypeDef::Enum(variants)), FieldValue::Enum { variant, fields }) => {
                        let index = variants
                            .iter()
                            .position(|v| &v.name == variant)
                            .ok_or_else(|| self.mismatch(path, ty, value))?;
                        self.buf.push(index as u8);
                        self.write_fields(&variants[index].fields, fields, path, depth + 1)?;
                    }
                    (None, _) => {
                        return Err(DecodeError::UnknownType {
                            type_name: name.clone(),
                        })
                    }
                    _ => return Err(self.mismatch(path, ty, value)),
                }
            }
            _ => return Err(self.mismatch(path, ty, value)),
        }
        Ok(())
    }
}
