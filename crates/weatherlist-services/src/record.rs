//! Weather record types shared by the gateway and the list model.

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned record identity.
pub type RecordId = i64;

/// Condition attached to a weather record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub text: String,
}

impl Condition {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A weather record as stored by the remote service.
///
/// Always carries an `id`; records still being typed live in [`WeatherDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: RecordId,
    #[serde(default)]
    pub city: String,
    /// Kept as text; the service may send a number, the user types free text.
    #[serde(default, deserialize_with = "temperature_text")]
    pub temperature: String,
    #[serde(default)]
    pub condition: Condition,
}

impl WeatherRecord {
    /// Replace one editable field.
    pub fn set_field(&mut self, field: RecordField, value: impl Into<String>) {
        *field.select(&mut self.city, &mut self.temperature, &mut self.condition) = value.into();
    }

    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::City => &self.city,
            RecordField::Temperature => &self.temperature,
            RecordField::Condition => &self.condition.text,
        }
    }
}

/// A record that has not been created yet, so it has no id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherDraft {
    pub city: String,
    pub temperature: String,
    pub condition: Condition,
}

impl WeatherDraft {
    pub fn new(
        city: impl Into<String>,
        temperature: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            temperature: temperature.into(),
            condition: Condition::new(condition),
        }
    }

    /// True when the draft matches the blank add-form template.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn set_field(&mut self, field: RecordField, value: impl Into<String>) {
        *field.select(&mut self.city, &mut self.temperature, &mut self.condition) = value.into();
    }
}

/// The user-editable fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    City,
    Temperature,
    Condition,
}

impl RecordField {
    /// Pick this field out of the editable triple shared by records and drafts.
    fn select<'a>(
        self,
        city: &'a mut String,
        temperature: &'a mut String,
        condition: &'a mut Condition,
    ) -> &'a mut String {
        match self {
            RecordField::City => city,
            RecordField::Temperature => temperature,
            RecordField::Condition => &mut condition.text,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemperatureValue {
    Text(String),
    Number(serde_json::Number),
}

fn temperature_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TemperatureValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(TemperatureValue::Text(s)) => s,
        Some(TemperatureValue::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
