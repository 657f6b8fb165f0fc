use crate::Result;
use crate::document::Document;
use crate::error::{Error, Kind};

/// Serializes a document into its JSON wire form.
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    serde_json::to_vec(document).map_err(|e| Error::with_source(Kind::Internal, e))
}

/// Parses a document from its JSON wire form.
///
/// Fails with [`Kind::MalformedWireFormat`] when a key is missing, a value has the
/// wrong JSON type or a date is not a valid `YYYY-MM-DD` calendar date. Unknown
/// keys are ignored.
pub fn decode(bytes: &[u8]) -> Result<Document> {
    #[cfg(feature = "tracing")]
    {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        let mut unknown = Vec::new();
        let mut track = |path: serde_ignored::Path<'_>| unknown.push(path.to_string());
        let document: Document =
            serde_path_to_error::deserialize(serde_ignored::Deserializer::new(&mut de, &mut track))
                .map_err(Error::malformed)?;
        de.end().map_err(Error::malformed)?;

        if !unknown.is_empty() {
            tracing::warn!(fields = ?unknown, "ignoring unknown document fields");
        }

        Ok(document)
    }

    #[cfg(not(feature = "tracing"))]
    {
        serde_json::from_slice(bytes).map_err(Error::malformed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use super::*;
    use crate::document::{Description, Product};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn document() -> Document {
        Document::builder()
            .description(Description::new("7700000001"))
            .document_id("doc-1")
            .document_status("DRAFT")
            .document_type("LP_INTRODUCE_GOODS")
            .import_request(true)
            .owner_inn("7700000002")
            .participant_inn("7700000001")
            .producer_inn("7700000003")
            .production_date(date(2024, 1, 15))
            .production_type("OWN_PRODUCTION")
            .products(vec![
                Product::builder()
                    .certificate_document("CONFORMITY_CERTIFICATE")
                    .certificate_document_date(date(2023, 12, 1))
                    .certificate_document_number("RU-001")
                    .owner_inn("7700000002")
                    .producer_inn("7700000003")
                    .production_date(date(2024, 1, 10))
                    .tnved_code("6401100000")
                    .uit_code("010460043993125621JgXJ5.T")
                    .uitu_code("046004399312562100")
                    .build(),
            ])
            .registration_date(date(2024, 1, 20))
            .registration_number("REG-42")
            .build()
    }

    #[test]
    fn encode_uses_wire_keys() {
        let value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "description": { "participantInn": "7700000001" },
                "doc_id": "doc-1",
                "doc_status": "DRAFT",
                "doc_type": "LP_INTRODUCE_GOODS",
                "importRequest": true,
                "owner_inn": "7700000002",
                "participant_inn": "7700000001",
                "producer_inn": "7700000003",
                "production_date": "2024-01-15",
                "production_type": "OWN_PRODUCTION",
                "products": [{
                    "certificate_document": "CONFORMITY_CERTIFICATE",
                    "certificate_document_date": "2023-12-01",
                    "certificate_document_number": "RU-001",
                    "owner_inn": "7700000002",
                    "producer_inn": "7700000003",
                    "production_date": "2024-01-10",
                    "tnved_code": "6401100000",
                    "uit_code": "010460043993125621JgXJ5.T",
                    "uitu_code": "046004399312562100"
                }],
                "reg_date": "2024-01-20",
                "reg_number": "REG-42"
            })
        );
    }

    #[test]
    fn decode_reverses_encode() {
        let original = document();

        let decoded = decode(&encode(&original).unwrap()).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_reads_each_product_code_from_its_own_key() {
        let mut value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();
        value["products"][0]["tnved_code"] = json!("TNVED");
        value["products"][0]["uit_code"] = json!("UIT");
        value["products"][0]["uitu_code"] = json!("UITU");

        let decoded = decode(&serde_json::to_vec(&value).unwrap()).unwrap();

        let product = &decoded.products[0];
        assert_eq!(product.tnved_code, "TNVED");
        assert_eq!(product.uit_code, "UIT");
        assert_eq!(product.uitu_code, "UITU");
    }

    #[test]
    fn decode_tolerates_unknown_keys() {
        let mut value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();
        value["comment"] = json!("extra");

        let decoded = decode(&serde_json::to_vec(&value).unwrap()).unwrap();

        assert_eq!(decoded, document());
    }

    #[test]
    fn decode_tolerates_unknown_nested_keys() {
        let mut value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();
        value["description"]["region"] = json!(77);
        value["products"][0]["batch"] = json!({ "size": 10 });

        let decoded = decode(&serde_json::to_vec(&value).unwrap()).unwrap();

        assert_eq!(decoded, document());
    }

    #[test]
    fn decode_rejects_missing_key() {
        let mut value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();
        value["products"][0]
            .as_object_mut()
            .unwrap()
            .remove("uit_code");

        let err = decode(&serde_json::to_vec(&value).unwrap()).unwrap_err();

        assert_eq!(err.kind(), Kind::MalformedWireFormat);
        assert!(err.to_string().contains("uit_code"), "{err}");
    }

    #[test]
    fn decode_rejects_wrong_type() {
        let mut value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();
        value["importRequest"] = json!("yes");

        let err = decode(&serde_json::to_vec(&value).unwrap()).unwrap_err();

        assert_eq!(err.kind(), Kind::MalformedWireFormat);
    }

    #[test]
    fn decode_rejects_invalid_calendar_date() {
        let mut value: Value = serde_json::from_slice(&encode(&document()).unwrap()).unwrap();
        value["reg_date"] = json!("2024-02-30");

        let err = decode(&serde_json::to_vec(&value).unwrap()).unwrap_err();

        assert_eq!(err.kind(), Kind::MalformedWireFormat);
    }

    #[test]
    fn decode_rejects_trailing_garbage() {
        let mut bytes = encode(&document()).unwrap();
        bytes.extend_from_slice(b" {}");

        let err = decode(&bytes).unwrap_err();

        assert_eq!(err.kind(), Kind::MalformedWireFormat);
    }
}
