//! Schema check for `POST /predict` bodies.

use breezo_model::Observation;
use serde_json::{Map, Value};

use crate::ServeError;

/// A validated prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub symptoms: String,
    pub age: f64,
    pub sex: String,
}

impl PredictRequest {
    /// Parse a raw body into a request.
    ///
    /// # Errors
    ///
    /// [`ServeError::MalformedJson`] when the bytes are not JSON, and
    /// [`ServeError::InputSchema`] when the document is not an object or any
    /// of `symptoms` (string), `age` (number) or `sex` (string) is absent or
    /// mistyped. Extra fields are ignored.
    pub fn from_slice(body: &[u8]) -> Result<Self, ServeError> {
        let value: Value = serde_json::from_slice(body).map_err(ServeError::MalformedJson)?;
        let Value::Object(fields) = value else {
            return Err(ServeError::InputSchema(
                "request body must be a JSON object".to_string(),
            ));
        };
        Ok(Self {
            symptoms: string_field(&fields, "symptoms")?,
            age: number_field(&fields, "age")?,
            sex: string_field(&fields, "sex")?,
        })
    }

    #[must_use]
    pub fn into_observation(self) -> Observation {
        Observation::new(self.symptoms, self.age, self.sex)
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a Value, ServeError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(ServeError::InputSchema(format!(
            "missing required field `{name}`"
        ))),
        Some(value) => Ok(value),
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Result<String, ServeError> {
    field(fields, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ServeError::InputSchema(format!("field `{name}` must be a string")))
}

fn number_field(fields: &Map<String, Value>, name: &str) -> Result<f64, ServeError> {
    field(fields, name)?
        .as_f64()
        .ok_or_else(|| ServeError::InputSchema(format!("field `{name}` must be a number")))
}
