//! Interface description (Anchor IDL) model.
//!
//! The on-chain program publishes its account layouts as an IDL JSON file.
//! Two generations of that format are in circulation and both are accepted:
//!
//! | | legacy (`anchor <= 0.29`) | current (`anchor >= 0.30`) |
//! |---|---|---|
//! | account body | inline `accounts[].type` | `types[]` entry of the same name |
//! | discriminator | implied by the name | explicit `accounts[].discriminator` |
//! | address type | `"publicKey"` | `"pubkey"` |
//! | `defined` | `{"defined": "Name"}` | `{"defined": {"name": "Name"}}` |
//!
//! The parsed [`Idl`] is immutable; share it by reference or `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::discriminator::{Discriminator, DISCRIMINATOR_LEN};

/// Largest fixed array an IDL may declare. Solana caps account data at
/// 10 MiB, so a longer array of non-empty elements can never decode.
pub const MAX_ARRAY_LEN: usize = 10 * 1024 * 1024;

/// A field's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    U128,
    I128,
    F32,
    F64,
    String,
    Pubkey,
    Bytes,
    Option(Box<IdlType>),
    Vec(Box<IdlType>),
    Array(Box<IdlType>, usize),
    /// Reference to a struct or enum in `types[]`.
    Defined(String),
}

impl IdlType {
    fn parse(value: &Value, context: &str) -> Result<Self, IdlError> {
        let bad = |detail: String| IdlError::BadType {
            context: context.to_string(),
            detail,
        };
        match value {
            Value::String(name) => match name.as_str() {
                "bool" => Ok(IdlType::Bool),
                "u8" => Ok(IdlType::U8),
                "i8" => Ok(IdlType::I8),
                "u16" => Ok(IdlType::U16),
                "i16" => Ok(IdlType::I16),
                "u32" => Ok(IdlType::U32),
                "i32" => Ok(IdlType::I32),
                "u64" => Ok(IdlType::U64),
                "i64" => Ok(IdlType::I64),
                "u128" => Ok(IdlType::U128),
                "i128" => Ok(IdlType::I128),
                "f32" => Ok(IdlType::F32),
                "f64" => Ok(IdlType::F64),
                "string" => Ok(IdlType::String),
                "publicKey" | "pubkey" => Ok(IdlType::Pubkey),
                "bytes" => Ok(IdlType::Bytes),
                other => Err(bad(format!("unsupported type '{}'", other))),
            },
            Value::Object(map) => {
                if let Some(inner) = map.get("option") {
                    return Ok(IdlType::Option(Box::new(Self::parse(inner, context)?)));
                }
                if let Some(inner) = map.get("vec") {
                    return Ok(IdlType::Vec(Box::new(Self::parse(inner, context)?)));
                }
                if let Some(array) = map.get("array") {
                    let parts = array
                        .as_array()
                        .filter(|p| p.len() == 2)
                        .ok_or_else(|| bad("array type must be [type, length]".to_string()))?;
                    let len = parts[1]
                        .as_u64()
                        .ok_or_else(|| bad("array length must be an integer".to_string()))?;
                    let len = usize::try_from(len)
                        .ok()
                        .filter(|len| *len <= MAX_ARRAY_LEN)
                        .ok_or_else(|| IdlError::ArrayTooLong {
                            context: context.to_string(),
                            len,
                        })?;
                    let inner = Self::parse(&parts[0], context)?;
                    return Ok(IdlType::Array(Box::new(inner), len));
                }
                if let Some(defined) = map.get("defined") {
                    let name = defined
                        .as_str()
                        .or_else(|| defined.get("name").and_then(Value::as_str))
                        .ok_or_else(|| bad("defined type must name a type".to_string()))?;
                    return Ok(IdlType::Defined(name.to_string()));
                }
                Err(bad(format!("unsupported type {}", value)))
            }
            other => Err(bad(format!("unsupported type {}", other))),
        }
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlType::Bool => f.write_str("bool"),
            IdlType::U8 => f.write_str("u8"),
            IdlType::I8 => f.write_str("i8"),
            IdlType::U16 => f.write_str("u16"),
            IdlType::I16 => f.write_str("i16"),
            IdlType::U32 => f.write_str("u32"),
            IdlType::I32 => f.write_str("i32"),
            IdlType::U64 => f.write_str("u64"),
            IdlType::I64 => f.write_str("i64"),
            IdlType::U128 => f.write_str("u128"),
            IdlType::I128 => f.write_str("i128"),
            IdlType::F32 => f.write_str("f32"),
            IdlType::F64 => f.write_str("f64"),
            IdlType::String => f.write_str("string"),
            IdlType::Pubkey => f.write_str("pubkey"),
            IdlType::Bytes => f.write_str("bytes"),
            IdlType::Option(inner) => write!(f, "option<{}>", inner),
            IdlType::Vec(inner) => write!(f, "vec<{}>", inner),
            IdlType::Array(inner, len) => write!(f, "[{}; {}]", inner, len),
            IdlType::Defined(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: IdlType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub fields: Vec<Field>,
}

/// Body of a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct(Vec<Field>),
    Enum(Vec<Variant>),
}

/// An account type: its tag and ordered field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDef {
    pub name: String,
    pub discriminator: Discriminator,
    pub fields: Vec<Field>,
}

/// Problems found while loading an IDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlError {
    Json(String),
    /// An account has no inline body and no `types[]` entry.
    MissingAccountLayout { account: String },
    /// An account's body is an enum; account layouts must be structs.
    AccountNotStruct { account: String },
    BadType { context: String, detail: String },
    /// A fixed array longer than [`MAX_ARRAY_LEN`].
    ArrayTooLong { context: String, len: u64 },
    UnresolvedType { context: String, name: String },
    BadDiscriminator { account: String, len: usize },
}

impl fmt::Display for IdlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlError::Json(msg) => write!(f, "invalid IDL JSON: {}", msg),
            IdlError::MissingAccountLayout { account } => {
                write!(f, "account '{}' has no layout in the IDL", account)
            }
            IdlError::AccountNotStruct { account } => {
                write!(f, "account '{}' is not a struct", account)
            }
            IdlError::BadType { context, detail } => write!(f, "{}: {}", context, detail),
            IdlError::ArrayTooLong { context, len } => write!(
                f,
                "{}: array length {} exceeds the limit of {}",
                context, len, MAX_ARRAY_LEN
            ),
            IdlError::UnresolvedType { context, name } => {
                write!(f, "{} refers to undefined type '{}'", context, name)
            }
            IdlError::BadDiscriminator { account, len } => write!(
                f,
                "account '{}' declares a {}-byte discriminator, expected {}",
                account, len, DISCRIMINATOR_LEN
            ),
        }
    }
}

impl std::error::Error for IdlError {}

// Raw document shapes. Field and type bodies stay as `Value` and go through
// `IdlType::parse`, which handles both generations.

#[derive(Deserialize)]
struct IdlDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    metadata: Option<IdlMetadata>,
    #[serde(default)]
    accounts: Vec<RawAccountDef>,
    #[serde(default)]
    types: Vec<RawTypeDef>,
}

#[derive(Deserialize)]
struct IdlMetadata {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawAccountDef {
    name: String,
    #[serde(default)]
    discriminator: Option<Vec<u8>>,
    #[serde(default, rename = "type")]
    body: Option<RawTypeBody>,
}

#[derive(Deserialize)]
struct RawTypeDef {
    name: String,
    #[serde(rename = "type")]
    body: RawTypeBody,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawTypeBody {
    Struct {
        #[serde(default)]
        fields: Vec<Value>,
    },
    Enum {
        variants: Vec<RawVariant>,
    },
}

#[derive(Deserialize)]
struct RawVariant {
    name: String,
    #[serde(default)]
    fields: Vec<Value>,
}

/// Parsed interface description.
#[derive(Debug, Clone, Default)]
pub struct Idl {
    name: Option<String>,
    accounts: Vec<AccountDef>,
    account_index: HashMap<String, usize>,
    types: HashMap<String, TypeDef>,
}

impl Idl {
    pub fn from_json_str(json: &str) -> Result<Self, IdlError> {
        let doc: IdlDocument =
            serde_json::from_str(json).map_err(|e| IdlError::Json(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read IDL file: {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Failed to load IDL {}", path.display()))
    }

    fn from_document(doc: IdlDocument) -> Result<Self, IdlError> {
        let mut types = HashMap::new();
        for raw in &doc.types {
            let def = parse_type_body(&raw.name, &raw.body)?;
            types.insert(raw.name.clone(), def);
        }

        let mut accounts = Vec::with_capacity(doc.accounts.len());
        let mut account_index = HashMap::new();
        for raw in &doc.accounts {
            let def = match &raw.body {
                Some(body) => parse_type_body(&raw.name, body)?,
                None => types
                    .get(&raw.name)
                    .cloned()
                    .ok_or_else(|| IdlError::MissingAccountLayout {
                        account: raw.name.clone(),
                    })?,
            };
            let TypeDef::Struct(fields) = def else {
                return Err(IdlError::AccountNotStruct {
                    account: raw.name.clone(),
                });
            };
            let discriminator = match &raw.discriminator {
                Some(bytes) => {
                    let arr: [u8; DISCRIMINATOR_LEN] =
                        bytes
                            .as_slice()
                            .try_into()
                            .map_err(|_| IdlError::BadDiscriminator {
                                account: raw.name.clone(),
                                len: bytes.len(),
                            })?;
                    Discriminator::from_bytes(arr)
                }
                None => Discriminator::derive(&raw.name),
            };
            account_index.insert(raw.name.clone(), accounts.len());
            accounts.push(AccountDef {
                name: raw.name.clone(),
                discriminator,
                fields,
            });
        }

        let idl = Self {
            name: doc.name.or(doc.metadata.and_then(|m| m.name)),
            accounts,
            account_index,
            types,
        };
        idl.check_references()?;
        Ok(idl)
    }

    /// Every `Defined` reference must name a type in `types[]`.
    fn check_references(&self) -> Result<(), IdlError> {
        let account_fields = self
            .accounts
            .iter()
            .flat_map(|a| a.fields.iter().map(move |f| (a.name.as_str(), f)));
        let type_fields = self.types.iter().flat_map(|(name, def)| {
            let fields: Vec<&Field> = match def {
                TypeDef::Struct(fields) => fields.iter().collect(),
                TypeDef::Enum(variants) => variants.iter().flat_map(|v| &v.fields).collect(),
            };
            fields.into_iter().map(move |f| (name.as_str(), f))
        });

        for (owner, field) in account_fields.chain(type_fields) {
            if let Some(missing) = self.first_unresolved(&field.ty) {
                return Err(IdlError::UnresolvedType {
                    context: format!("{}.{}", owner, field.name),
                    name: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    fn first_unresolved<'a>(&self, ty: &'a IdlType) -> Option<&'a str> {
        match ty {
            IdlType::Defined(name) if !self.types.contains_key(name) => Some(name.as_str()),
            IdlType::Option(inner) | IdlType::Vec(inner) | IdlType::Array(inner, _) => {
                self.first_unresolved(inner)
            }
            _ => None,
        }
    }

    /// Program name, when the IDL carries one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn account(&self, name: &str) -> Option<&AccountDef> {
        self.account_index.get(name).map(|&i| &self.accounts[i])
    }

    pub fn accounts(&self) -> &[AccountDef] {
        &self.accounts
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }
}

fn parse_type_body(owner: &str, body: &RawTypeBody) -> Result<TypeDef, IdlError> {
    match body {
        RawTypeBody::Struct { fields } => Ok(TypeDef::Struct(parse_fields(owner, fields)?)),
        RawTypeBody::Enum { variants } => {
            let variants = variants
                .iter()
                .map(|v| {
                    Ok(Variant {
                        name: v.name.clone(),
                        fields: parse_fields(&format!("{}::{}", owner, v.name), &v.fields)?,
                    })
                })
                .collect::<Result<Vec<_>, IdlError>>()?;
            Ok(TypeDef::Enum(variants))
        }
    }
}

/// Named fields are `{name, type}` objects; tuple fields are bare types and
/// get positional names.
fn parse_fields(owner: &str, raw: &[Value]) -> Result<Vec<Field>, IdlError> {
    raw.iter()
        .enumerate()
        .map(|(i, value)| {
            let (name, ty_value) = match (value.get("name"), value.get("type")) {
                (Some(Value::String(name)), Some(ty)) => (name.clone(), ty),
                _ => (i.to_string(), value),
            };
            let ty = IdlType::parse(ty_value, &format!("{}.{}", owner, name))?;
            Ok(Field { name, ty })
        })
        .collect()
}
