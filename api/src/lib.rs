//! Request and response bodies of the picnic planner HTTP API.
//!
//! Requests are validated with [`validator`] before they reach any business logic.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

pub mod timestamp;

#[derive(Debug, Validate, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateCity {
    /// The city name, in any case. Stored capitalized.
    #[validate(custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Validate, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCities {
    /// Only cities whose name contains this (case-sensitive).
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub weather: f64,
}

#[derive(Debug, Validate, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterUser {
    pub name: String,
    pub surname: String,
    #[validate(range(min = 0, max = 120, message = "age must be between 0 and 120"))]
    pub age: i32,
}

#[derive(Debug, Validate, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsers {
    /// Minimal age, inclusive.
    #[validate(range(min = 0, max = 120, message = "min_age must be between 0 and 120"))]
    pub min_age: Option<i32>,
    /// Maximal age, inclusive.
    #[validate(range(min = 0, max = 120, message = "max_age must be between 0 and 120"))]
    pub max_age: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub age: i32,
}

#[derive(Debug, Validate, Serialize, Deserialize, ToSchema)]
pub struct CreatePicnic {
    pub city_id: i32,
    /// RFC 3339, or a naive date time which is taken as UTC. Past times are accepted.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub time: DateTime<Utc>,
}

#[derive(Debug, Validate, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPicnics {
    /// Only picnics at exactly this time.
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub datetime: Option<DateTime<Utc>>,
    /// Include picnics that already took place. Also accepts `1`/`0`, `yes`/`no`, `on`/`off`,
    /// `t`/`f` and `y`/`n`.
    #[serde(default = "include_past", deserialize_with = "flag")]
    pub past: bool,
}

impl Default for ListPicnics {
    fn default() -> Self {
        Self {
            datetime: None,
            past: include_past(),
        }
    }
}

fn include_past() -> bool {
    true
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    // Query strings only carry text, JSON bodies may carry a real boolean.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Str(&text),
                &"a boolean such as `true`, `false`, `1` or `0`",
            )),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Picnic {
    pub id: i32,
    /// Name of the city.
    pub city: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PicnicWithUsers {
    pub id: i32,
    pub city: String,
    pub time: DateTime<Utc>,
    pub users: Vec<User>,
}

#[derive(Debug, Validate, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterForPicnic {
    pub user_id: i32,
    pub picnic_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Registration {
    pub id: i32,
    pub user: User,
    pub picnic: Picnic,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable kind, e.g. `unknown_user`.
    pub error: String,
    pub details: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn age_outside_range_is_rejected() {
        let user = RegisterUser {
            name: "John".into(),
            surname: "Doe".into(),
            age: 121,
        };
        assert!(user.validate().is_err());

        let user = RegisterUser { age: -1, ..user };
        assert!(user.validate().is_err());

        let user = RegisterUser { age: 120, ..user };
        assert!(user.validate().is_ok());

        let user = RegisterUser { age: 0, ..user };
        assert!(user.validate().is_ok());
    }

    #[test]
    fn age_bounds_are_optional() {
        assert!(ListUsers::default().validate().is_ok());

        let query = ListUsers {
            min_age: Some(30),
            max_age: Some(200),
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn blank_city_name_is_rejected() {
        let city = CreateCity { name: "  ".into() };
        assert!(city.validate().is_err());

        let city = CreateCity {
            name: "paris".into(),
        };
        assert!(city.validate().is_ok());
    }

    #[test]
    fn picnic_time_accepts_naive_and_offset_forms() {
        let naive: CreatePicnic =
            serde_json::from_value(json!({ "city_id": 1, "time": "2024-06-01T12:00:00" })).unwrap();
        let offset: CreatePicnic =
            serde_json::from_value(json!({ "city_id": 1, "time": "2024-06-01T14:00:00+02:00" }))
                .unwrap();

        assert_eq!(naive.time, offset.time);
        assert_eq!(
            serde_json::to_value(naive.time).unwrap(),
            json!("2024-06-01T12:00:00Z")
        );
    }

    #[test]
    fn past_defaults_to_true() {
        let query: ListPicnics = serde_json::from_value(json!({})).unwrap();
        assert!(query.past);
        assert!(query.datetime.is_none());
    }

    #[test]
    fn past_accepts_common_boolean_spellings() {
        let past = |value: serde_json::Value| {
            serde_json::from_value::<ListPicnics>(json!({ "past": value })).map(|query| query.past)
        };

        for yes in ["true", "1", "yes", "On", "t", "Y"] {
            assert!(past(json!(yes)).unwrap(), "{yes}");
        }
        for no in ["false", "0", "NO", "off", "f", "n"] {
            assert!(!past(json!(no)).unwrap(), "{no}");
        }
        assert!(!past(json!(false)).unwrap());
        assert!(past(json!("maybe")).is_err());
        assert!(past(json!("")).is_err());
    }
}
