//! Typed project and review records.

use std::fmt;

use reviews_transport::RawAccount;
use reviews_types::Pubkey;
use serde::Serialize;

use crate::discriminator::Discriminator;
use crate::error::DecodeError;
use crate::idl::Idl;
use crate::layout::{decode_account, DecodedAccount, FieldValue};

/// The two record categories the program stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    Project,
    Review,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Project, RecordKind::Review];

    /// Account type name as declared by the program.
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordKind::Project => "Project",
            RecordKind::Review => "Review",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A listed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub address: Pubkey,
    pub name: String,
    pub category: String,
    pub listed_by: Pubkey,
}

/// A review of one project. `project_id` is the project's account address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub address: Pubkey,
    pub project_id: Pubkey,
    pub reviewer: Pubkey,
    pub rating: u8,
    pub review_text: String,
}

fn field<'a>(decoded: &'a DecodedAccount, name: &str) -> Result<&'a FieldValue, DecodeError> {
    decoded
        .get(name)
        .ok_or_else(|| DecodeError::mismatch(&decoded.type_name, format!("missing field {}", name)))
}

fn text_field(decoded: &DecodedAccount, name: &str) -> Result<String, DecodeError> {
    field(decoded, name)?
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(decoded, name, "string"))
}

fn address_field(decoded: &DecodedAccount, name: &str) -> Result<Pubkey, DecodeError> {
    field(decoded, name)?
        .as_address()
        .copied()
        .ok_or_else(|| wrong_type(decoded, name, "pubkey"))
}

fn wrong_type(decoded: &DecodedAccount, name: &str, expected: &str) -> DecodeError {
    DecodeError::mismatch(
        &decoded.type_name,
        format!("field {} is not a {}", name, expected),
    )
}

impl Project {
    pub fn from_decoded(address: Pubkey, decoded: &DecodedAccount) -> Result<Self, DecodeError> {
        Ok(Self {
            address,
            name: text_field(decoded, "name")?,
            category: text_field(decoded, "category")?,
            listed_by: address_field(decoded, "listed_by")?,
        })
    }
}

impl Review {
    pub fn from_decoded(address: Pubkey, decoded: &DecodedAccount) -> Result<Self, DecodeError> {
        let rating = field(decoded, "rating")?
            .as_unsigned()
            .ok_or_else(|| wrong_type(decoded, "rating", "unsigned integer"))?;
        let rating = u8::try_from(rating).map_err(|_| {
            DecodeError::mismatch(
                &decoded.type_name,
                format!("rating {} does not fit in u8", rating),
            )
        })?;
        Ok(Self {
            address,
            project_id: address_field(decoded, "project_id")?,
            reviewer: address_field(decoded, "reviewer")?,
            rating,
            review_text: text_field(decoded, "review_text")?,
        })
    }
}

/// Either record kind, selected by the payload's discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Record {
    Project(Project),
    Review(Review),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Project(_) => RecordKind::Project,
            Record::Review(_) => RecordKind::Review,
        }
    }

    pub fn address(&self) -> &Pubkey {
        match self {
            Record::Project(p) => &p.address,
            Record::Review(r) => &r.address,
        }
    }
}

/// Decode one account as the kind its discriminator names.
pub fn decode_record(idl: &Idl, account: &RawAccount) -> Result<Record, DecodeError> {
    let kind = RecordKind::ALL
        .into_iter()
        .find(|kind| {
            idl.account(kind.type_name())
                .is_some_and(|def| def.discriminator.matches(&account.data))
        })
        .ok_or_else(|| match Discriminator::of_payload(&account.data) {
            Some(found) => DecodeError::UnrecognizedDiscriminator { found },
            None => DecodeError::TruncatedPayload {
                type_name: "account".to_string(),
                field: "discriminator".to_string(),
                offset: 0,
                needed: crate::discriminator::DISCRIMINATOR_LEN,
                available: account.data.len(),
            },
        })?;
    decode_kind(idl, kind, account)
}

/// Decode one account as `kind`, regardless of what else it could be.
pub fn decode_kind(idl: &Idl, kind: RecordKind, account: &RawAccount) -> Result<Record, DecodeError> {
    let decoded = decode_account(idl, kind.type_name(), &account.data)?;
    Ok(match kind {
        RecordKind::Project => Record::Project(Project::from_decoded(account.address, &decoded)?),
        RecordKind::Review => Record::Review(Review::from_decoded(account.address, &decoded)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    const IDL: &str = r#"{
        "accounts": [
            { "name": "Project", "type": { "kind": "struct", "fields": [
                { "name": "name", "type": "string" },
                { "name": "category", "type": "string" },
                { "name": "listedBy", "type": "publicKey" }
            ]}},
            { "name": "Review", "type": { "kind": "struct", "fields": [
                { "name": "projectId", "type": "publicKey" },
                { "name": "reviewer", "type": "publicKey" },
                { "name": "rating", "type": "u8" },
                { "name": "reviewText", "type": "string" }
            ]}}
        ]
    }"#;

    fn push_str(out: &mut Vec<u8>, s: &str) {
        out.extend_from_slice(&(s.len() as u32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
    }

    fn project_payload() -> Vec<u8> {
        let mut out = Discriminator::derive("Project").as_bytes().to_vec();
        push_str(&mut out, "Orca");
        push_str(&mut out, "DEX");
        out.extend_from_slice(&[7u8; 32]);
        out
    }

    #[test]
    fn test_decode_project_dispatch() {
        let idl = Idl::from_json_str(IDL).unwrap();
        let account = RawAccount::new(Pubkey::new([1u8; 32]), project_payload());
        let record = decode_record(&idl, &account).unwrap();
        assert_eq!(record.kind(), RecordKind::Project);
        assert_eq!(record.address(), &Pubkey::new([1u8; 32]));
        match record {
            Record::Project(p) => {
                assert_eq!(p.name, "Orca");
                assert_eq!(p.category, "DEX");
                assert_eq!(p.listed_by, Pubkey::new([7u8; 32]));
            }
            other => panic!("expected project, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_discriminator() {
        let idl = Idl::from_json_str(IDL).unwrap();
        let account = RawAccount::new(Pubkey::default(), vec![9u8; 40]);
        let err = decode_record(&idl, &account).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecognizedDiscriminator { .. }));
        assert_eq!(err.kind(), FailureKind::SchemaMismatch);
    }

    #[test]
    fn test_short_payload_is_truncated() {
        let idl = Idl::from_json_str(IDL).unwrap();
        let account = RawAccount::new(Pubkey::default(), vec![1, 2, 3]);
        assert_eq!(
            decode_record(&idl, &account).unwrap_err().kind(),
            FailureKind::TruncatedPayload
        );
    }

    #[test]
    fn test_review_rating_must_be_u8() {
        let json = IDL.replace(r#""rating", "type": "u8""#, r#""rating", "type": "u16""#);
        let idl = Idl::from_json_str(&json).unwrap();
        let mut payload = Discriminator::derive("Review").as_bytes().to_vec();
        payload.extend_from_slice(&[1u8; 64]);
        payload.extend_from_slice(&300u16.to_le_bytes());
        push_str(&mut payload, "too high");
        let err = decode_kind(&idl, RecordKind::Review, &RawAccount::new(Pubkey::default(), payload))
            .unwrap_err();
        assert!(err.to_string().contains("does not fit in u8"));
    }

    #[test]
    fn test_wrong_field_type_is_mismatch() {
        let json = IDL.replace(r#""name", "type": "string""#, r#""name", "type": "u32""#);
        let idl = Idl::from_json_str(&json).unwrap();
        let mut payload = Discriminator::derive("Project").as_bytes().to_vec();
        payload.extend_from_slice(&5u32.to_le_bytes());
        push_str(&mut payload, "DEX");
        payload.extend_from_slice(&[7u8; 32]);
        let err = decode_kind(&idl, RecordKind::Project, &RawAccount::new(Pubkey::default(), payload))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::SchemaMismatch);
        assert!(err.to_string().contains("field name is not a string"));
    }

    #[test]
    fn test_record_kind_names() {
        assert_eq!(RecordKind::Project.to_string(), "Project");
        assert_eq!(RecordKind::Review.type_name(), "Review");
    }
}
