use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorType {
    #[default]
    #[serde(rename = "Single Phase")]
    SinglePhase,
    #[serde(rename = "Three Phase")]
    ThreePhase,
    #[serde(rename = "Submersible Single")]
    SubmersibleSingle,
    #[serde(rename = "Submersible Three")]
    SubmersibleThree,
}

impl MotorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SinglePhase => "Single Phase",
            Self::ThreePhase => "Three Phase",
            Self::SubmersibleSingle => "Submersible Single",
            Self::SubmersibleThree => "Submersible Three",
        }
    }
}

/// One coil group of a winding: slot pitch and turns, e.g. `1-8` / `40`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coil {
    #[serde(default)]
    pub pitch: String,
    #[serde(default)]
    pub turns: String,
}

/// A named winding (e.g. "Main/Bottom", "Aux/Top") with its wire gauge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindingSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gauge: String,
    #[serde(default)]
    pub coils: Vec<Coil>,
}

/// Winding details for one motor model.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Motor {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub motor_type: String,
    pub power_rating: String,
    pub voltage: String,
    pub winding_type: Option<String>,
    pub coil_count: Option<String>,
    pub wire_gauge: Option<String>,
    pub pitch_details: Option<String>,
    pub turns_per_coil: Option<String>,
    pub winding_data: Json<Vec<WindingSection>>,
    pub rewinding_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MotorInput {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub motor_type: MotorType,
    #[validate(length(min = 1, max = 50, message = "power_rating must be 1-50 characters"))]
    pub power_rating: String,
    #[validate(length(min = 1, max = 50, message = "voltage must be 1-50 characters"))]
    pub voltage: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub winding_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub coil_count: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub wire_gauge: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub pitch_details: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub turns_per_coil: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub winding_data: Vec<WindingSection>,
    #[serde(default)]
    pub rewinding_notes: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WindingSection>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<WindingSection>>::deserialize(deserializer)?.unwrap_or_default())
}
