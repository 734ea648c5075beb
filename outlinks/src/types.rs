use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::service::OutLinkError;

/// A cataloged external service, linking to its user page and (optionally) its admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutLink {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub is_applied: bool,
    pub category: String,
    pub user_page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_page_url: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Request body for create and update. Every field is optional on the wire so that
/// a missing required field surfaces as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutLinkInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub is_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_page_url: Option<String>,
}

/// The mutable part of an [`OutLink`], after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutLinkFields {
    pub name: String,
    pub description: String,
    pub is_applied: bool,
    pub category: String,
    pub user_page_url: String,
    pub admin_page_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl OutLinkInput {
    /// Checks required fields in wire order and stops at the first one that is missing or empty.
    pub fn validate(self) -> Result<OutLinkFields, OutLinkError> {
        let name = required(self.name, "name")?;
        let description = required(self.description, "description")?;
        let category = required(self.category, "category")?;
        let user_page_url = required(self.user_page_url, "userPageUrl")?;

        Ok(OutLinkFields {
            name,
            description,
            is_applied: self.is_applied,
            category,
            user_page_url,
            admin_page_url: self.admin_page_url.filter(|url| !url.is_empty()),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, OutLinkError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(OutLinkError::Validation(field)),
    }
}

impl OutLink {
    pub fn new(id: String, fields: OutLinkFields, now: DateTime<Utc>) -> Self {
        OutLink {
            id,
            name: fields.name,
            description: fields.description,
            is_applied: fields.is_applied,
            category: fields.category,
            user_page_url: fields.user_page_url,
            admin_page_url: fields.admin_page_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces everything but `id` and `created_at`. `updated_at` never moves before `created_at`.
    pub fn apply(&mut self, fields: OutLinkFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.description = fields.description;
        self.is_applied = fields.is_applied;
        self.category = fields.category;
        self.user_page_url = fields.user_page_url;
        self.admin_page_url = fields.admin_page_url;
        self.updated_at = now.max(self.created_at);
    }
}

/// Coerces any JSON value to a bool the way loosely-typed clients expect:
/// null, false, 0, and "" are false, everything else is true.
fn truthy<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix, e.g. `2024-01-01T00:00:00.000Z`.
/// Any RFC 3339 offset is accepted on input.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields() -> OutLinkFields {
        OutLinkFields {
            name: "A".to_string(),
            description: "d".to_string(),
            is_applied: false,
            category: "c".to_string(),
            user_page_url: "http://x".to_string(),
            admin_page_url: None,
        }
    }

    #[test]
    fn test_outlink_wire_shape() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let link = OutLink::new("1".to_string(), fields(), created);

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1",
                "name": "A",
                "description": "d",
                "isApplied": false,
                "category": "c",
                "userPageUrl": "http://x",
                "createdAt": "2024-01-01T00:00:00.000Z",
                "updatedAt": "2024-01-01T00:00:00.000Z",
            })
        );
    }

    #[test]
    fn test_admin_page_url_is_emitted_when_present() {
        let mut f = fields();
        f.admin_page_url = Some("http://admin.x".to_string());
        let link = OutLink::new("1".to_string(), f, Utc::now());

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["adminPageUrl"], "http://admin.x");
    }

    #[test]
    fn test_outlink_accepts_offset_timestamps() {
        let link: OutLink = serde_json::from_value(json!({
            "id": "7",
            "name": "A",
            "description": "d",
            "category": "c",
            "userPageUrl": "http://x",
            "createdAt": "2024-01-01T09:00:00+09:00",
            "updatedAt": "2024-01-02T00:00:00Z",
        }))
        .unwrap();

        assert!(!link.is_applied);
        assert_eq!(link.admin_page_url, None);
        assert_eq!(
            link.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_first_missing_field() {
        let input = OutLinkInput {
            name: Some("A".to_string()),
            description: Some(String::new()),
            ..Default::default()
        };
        match input.validate() {
            Err(OutLinkError::Validation(field)) => assert_eq!(field, "description"),
            other => panic!("expected validation error, got {:?}", other),
        }

        let input = OutLinkInput {
            name: Some("A".to_string()),
            description: Some("d".to_string()),
            category: Some("c".to_string()),
            ..Default::default()
        };
        match input.validate() {
            Err(OutLinkError::Validation(field)) => assert_eq!(field, "userPageUrl"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_drops_empty_admin_page_url() {
        let input = OutLinkInput {
            name: Some("A".to_string()),
            description: Some("d".to_string()),
            category: Some("c".to_string()),
            user_page_url: Some("http://x".to_string()),
            admin_page_url: Some(String::new()),
            is_applied: true,
        };
        let fields = input.validate().unwrap();
        assert_eq!(fields.admin_page_url, None);
        assert!(fields.is_applied);
    }

    #[test]
    fn test_is_applied_is_coerced() {
        let cases = [
            (json!(null), false),
            (json!(true), true),
            (json!(0), false),
            (json!(1), true),
            (json!(""), false),
            (json!("false"), true),
            (json!([]), true),
            (json!({}), true),
        ];
        for (value, expected) in cases {
            let input: OutLinkInput = serde_json::from_value(json!({ "isApplied": value })).unwrap();
            assert_eq!(input.is_applied, expected, "isApplied = {}", value);
        }

        let input: OutLinkInput = serde_json::from_value(json!({})).unwrap();
        assert!(!input.is_applied);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut link = OutLink::new("1".to_string(), fields(), created);

        let mut changed = fields();
        changed.name = "B".to_string();
        // A clock that went backwards must not break created_at <= updated_at.
        let earlier = Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
        link.apply(changed, earlier);

        assert_eq!(link.id, "1");
        assert_eq!(link.name, "B");
        assert_eq!(link.created_at, created);
        assert_eq!(link.updated_at, created);
    }
}
