//! Document store wire DTOs.
//!
//! These types map directly to the store's JSON API. Every record field is
//! wrapped as `{ "value": ... }` and every field is optional, because
//! partially-written records do occur in the wild and are filtered out
//! during conversion rather than at parse time.

use serde::{Deserialize, Serialize};

/// Record type holding traveler profiles.
pub const TARGET_RECORD_TYPE: &str = "Target";

/// Per-record error code returned by lookups of unknown records.
pub const NOT_FOUND_CODE: &str = "NOT_FOUND";

/// A wrapped field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    pub value: T,
}

impl<T> Field<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

/// Location field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationValue {
    pub latitude: f64,
    pub longitude: f64,
}

/// Asset field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetValue {
    /// Receipt from a prior upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,

    /// Download location, filled in by the store on reads.
    #[serde(
        rename = "downloadURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Option<String>,
}

/// Fields of a `Target` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetFields {
    #[serde(
        rename = "appleUserID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub apple_user_id: Option<Field<String>>,

    /// Older records carry the id under this key instead; some carry both.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Field<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Field<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Field<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Field<String>>,

    /// Comma-separated language tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Field<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport: Option<Field<String>>,

    #[serde(
        rename = "flightInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flight_info: Option<Field<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Field<String>>,

    /// Milliseconds since the Unix epoch.
    #[serde(
        rename = "departureTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub departure_time: Option<Field<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Field<LocationValue>>,

    #[serde(
        rename = "profileImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_image: Option<Field<AssetValue>>,
}

/// A `Target` record as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRecord {
    /// Record key; equal to the traveler's user id.
    pub record_name: String,

    #[serde(default = "target_record_type")]
    pub record_type: String,

    #[serde(default)]
    pub fields: TargetFields,
}

fn target_record_type() -> String {
    TARGET_RECORD_TYPE.to_string()
}

/// A per-record failure inside an otherwise successful response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    pub record_name: Option<String>,
    pub server_error_code: String,
    pub reason: Option<String>,
}

/// Body of `records/modify`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyRequest {
    pub operations: Vec<ModifyOperation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOperation {
    /// Always `forceReplace`: last write wins.
    pub operation_type: &'static str,
    pub record: TargetRecord,
}

/// Body of `records/lookup`.
#[derive(Debug, Serialize)]
pub struct LookupRequest {
    pub records: Vec<RecordName>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordName {
    pub record_name: String,
}

/// Body of `records/query`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: Query,
    pub results_limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub record_type: &'static str,
    pub filter_by: Vec<Filter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub comparator: &'static str,
    pub field_name: &'static str,
    pub field_value: Field<String>,
}

impl QueryRequest {
    /// Equality query on the `airport` field.
    pub fn airport_equals(airport: &str, results_limit: usize) -> Self {
        Self {
            query: Query {
                record_type: TARGET_RECORD_TYPE,
                filter_by: vec![Filter {
                    comparator: "EQUALS",
                    field_name: "airport",
                    field_value: Field::new(airport.to_string()),
                }],
            },
            results_limit,
        }
    }
}

/// Response of `records/modify`, `records/lookup` and `records/query`.
///
/// Records are kept as raw JSON so that one bad record cannot fail the
/// whole batch.
#[derive(Debug, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<serde_json::Value>,
}

/// Response of `assets/upload`.
#[derive(Debug, Deserialize)]
pub struct AssetUploadResponse {
    pub receipt: String,

    #[serde(rename = "downloadURL", default)]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_record() {
        let raw = json!({
            "recordName": "u1",
            "recordType": "Target",
            "fields": {
                "appleUserID": { "value": "u1" },
                "name": { "value": "Marco" },
                "age": { "value": "29" },
                "languages": { "value": "Italian, English" },
                "airport": { "value": "FCO" },
                "flightInfo": { "value": "AZ204" },
                "departureTime": { "value": 1_767_261_600_000_i64 },
                "location": { "value": { "latitude": 41.8, "longitude": 12.25 } },
                "profileImage": { "value": { "downloadURL": "https://cdn/x.jpg" } }
            }
        });

        let record: TargetRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.record_name, "u1");
        assert_eq!(record.fields.name, Some(Field::new("Marco".to_string())));
        assert_eq!(
            record.fields.departure_time,
            Some(Field::new(1_767_261_600_000))
        );
        assert_eq!(
            record.fields.profile_image.unwrap().value.download_url.as_deref(),
            Some("https://cdn/x.jpg")
        );
    }

    #[test]
    fn user_id_key_accepted() {
        let raw = json!({
            "recordName": "u2",
            "fields": { "userId": { "value": "u2" } }
        });
        let record: TargetRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.record_type, TARGET_RECORD_TYPE);
        assert_eq!(record.fields.user_id, Some(Field::new("u2".into())));
        assert_eq!(record.fields.apple_user_id, None);
    }

    #[test]
    fn both_user_id_keys_accepted() {
        let raw = json!({
            "recordName": "u2",
            "fields": {
                "appleUserID": { "value": "apple-u2" },
                "userId": { "value": "u2" }
            }
        });
        let record: TargetRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.fields.apple_user_id, Some(Field::new("apple-u2".into())));
        assert_eq!(record.fields.user_id, Some(Field::new("u2".into())));
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let record = TargetRecord {
            record_name: "u3".into(),
            record_type: TARGET_RECORD_TYPE.into(),
            fields: TargetFields {
                name: Some(Field::new("Ana".into())),
                ..TargetFields::default()
            },
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "recordName": "u3",
                "recordType": "Target",
                "fields": { "name": { "value": "Ana" } }
            })
        );
    }

    #[test]
    fn airport_query_body() {
        let body = serde_json::to_value(QueryRequest::airport_equals("LHR", 50)).unwrap();
        assert_eq!(
            body,
            json!({
                "query": {
                    "recordType": "Target",
                    "filterBy": [{
                        "comparator": "EQUALS",
                        "fieldName": "airport",
                        "fieldValue": { "value": "LHR" }
                    }]
                },
                "resultsLimit": 50
            })
        );
    }
}
