use bon::Builder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document header identifying the participant that files it.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    pub participant_inn: String,
}

impl Description {
    #[must_use]
    pub fn new<S: Into<String>>(participant_inn: S) -> Self {
        Self {
            participant_inn: participant_inn.into(),
        }
    }
}

/// A document submitted to the CRPT API.
///
/// Every field is required on the wire. INN values are carried as-is, without
/// format validation.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct Document {
    pub description: Description,
    #[serde(rename = "doc_id")]
    pub document_id: String,
    #[serde(rename = "doc_status")]
    pub document_status: String,
    #[serde(rename = "doc_type")]
    pub document_type: String,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    #[serde(rename = "owner_inn")]
    pub owner_inn: String,
    #[serde(rename = "participant_inn")]
    pub participant_inn: String,
    #[serde(rename = "producer_inn")]
    pub producer_inn: String,
    #[serde(rename = "production_date", with = "super::date")]
    pub production_date: NaiveDate,
    #[serde(rename = "production_type")]
    pub production_type: String,
    #[builder(default)]
    #[serde(rename = "products")]
    pub products: Vec<Product>,
    #[serde(rename = "reg_date", with = "super::date")]
    pub registration_date: NaiveDate,
    #[serde(rename = "reg_number")]
    pub registration_number: String,
}

/// A single product line of a [`Document`].
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct Product {
    #[serde(rename = "certificate_document")]
    pub certificate_document: String,
    #[serde(rename = "certificate_document_date", with = "super::date")]
    pub certificate_document_date: NaiveDate,
    #[serde(rename = "certificate_document_number")]
    pub certificate_document_number: String,
    #[serde(rename = "owner_inn")]
    pub owner_inn: String,
    #[serde(rename = "producer_inn")]
    pub producer_inn: String,
    #[serde(rename = "production_date", with = "super::date")]
    pub production_date: NaiveDate,
    #[serde(rename = "tnved_code")]
    pub tnved_code: String,
    /// Unit identifier code.
    #[serde(rename = "uit_code")]
    pub uit_code: String,
    /// Unit group identifier code. Independent from `uit_code` on the wire.
    #[serde(rename = "uitu_code")]
    pub uitu_code: String,
}
