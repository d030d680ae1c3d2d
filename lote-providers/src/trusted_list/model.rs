//! `struct`s for the List of Trusted Entities document shape.
//!
//! Parsing and signature verification of the published document happen
//! outside this crate; a [`TrustedEntityList`] is accepted as already
//! validated. Optional fields are lenient so that partially filled lists
//! still load.

use ct_codecs::{Base64, Decoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::verification::ServiceTypeId;

/// One published List of Trusted Entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedEntityList {
    /// Identifier of the profile this list asserts, e.g. "PID providers".
    pub scheme_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pointers_to_other: Vec<ListPointer>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<TrustedEntity>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub issue_date_time: Option<OffsetDateTime>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_update: Option<OffsetDateTime>,
}

/// A pointer to another published list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPointer {
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<EntityService>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityService {
    pub information: ServiceInformation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInformation {
    pub type_identifier: ServiceTypeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_identity: Option<DigitalIdentity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalIdentity {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x509_certificates: Vec<CertificateObject>,
}

/// A certificate carried inside a list entry, base64-encoded DER.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateObject {
    pub content: String,
}

#[derive(Debug, Error)]
pub enum CertificateDecodeError {
    #[error("certificate payload is not valid base64: `{0}`")]
    InvalidBase64(String),
}

impl CertificateObject {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn der_bytes(&self) -> Result<Vec<u8>, CertificateDecodeError> {
        Base64::decode_to_vec(&self.content, None)
            .map_err(|error| CertificateDecodeError::InvalidBase64(error.to_string()))
    }
}
