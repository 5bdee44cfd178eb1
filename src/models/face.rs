//! Face descriptor model.
//!
//! Descriptors are produced in the browser by the face recognition library
//! and arrive as fixed-length float vectors.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{HrisError, HrisResult};

/// A face embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceDescriptor(pub Vec<f32>);

impl FaceDescriptor {
    /// Returns the components.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Checks the length and that every component is finite.
    pub fn validate(&self, expected_len: usize) -> HrisResult<()> {
        if self.0.len() != expected_len {
            return Err(HrisError::validation(
                "descriptor",
                format!(
                    "expected {expected_len} components, got {}",
                    self.0.len()
                ),
            ));
        }
        if let Some(index) = self.0.iter().position(|v| !v.is_finite()) {
            return Err(HrisError::validation(
                "descriptor",
                format!("component {index} is not a finite number"),
            ));
        }
        Ok(())
    }
}

/// The enrolled descriptor of one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    /// Database identifier.
    pub id: i64,
    /// The employee.
    pub employee_id: i64,
    /// The enrolled descriptor.
    pub descriptor: FaceDescriptor,
    /// User who enrolled the face.
    pub created_by: String,
    /// When the face was first enrolled.
    pub created_at: NaiveDateTime,
    /// When the descriptor was last replaced.
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_length_checked() {
        let descriptor = FaceDescriptor(vec![0.1; 127]);
        match descriptor.validate(128) {
            Err(HrisError::Validation { message, .. }) => {
                assert!(message.contains("expected 128 components, got 127"));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_component_rejected() {
        let mut values = vec![0.0; 4];
        values[2] = f32::NAN;
        assert!(FaceDescriptor(values).validate(4).is_err());
    }

    #[test]
    fn test_descriptor_serializes_as_plain_array() {
        let json = serde_json::to_string(&FaceDescriptor(vec![0.5, -0.25])).unwrap();
        assert_eq!(json, "[0.5,-0.25]");
    }
}
