//! Feature Vector Assembly

use serde::Serialize;
use tracing::debug;

/// Ordered feature values for a single inference call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Column names in model order
    pub columns: Vec<&'static str>,
    /// Raw feature values, aligned with `columns`
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector from column names and aligned values
    pub fn new(columns: &[&'static str], values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector holds no features
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Values narrowed to f32 for tensor input
    pub fn as_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}

/// A model input whose fields map onto a fixed column order
pub trait ModelFeatures: Serialize {
    /// Column names in the order the model was trained on
    const COLUMNS: &'static [&'static str];

    /// Values aligned with [`Self::COLUMNS`]
    fn values(&self) -> Vec<f64>;

    /// Assemble the feature vector
    fn to_vector(&self) -> FeatureVector {
        let vector = FeatureVector::new(Self::COLUMNS, self.values());
        debug!("Assembled feature vector with {} columns", vector.len());
        vector
    }

    /// JSON snapshot of the model input, stored alongside history records
    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_column() {
        let vector = FeatureVector::new(&["age", "bmi"], vec![40.0, 24.5]);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.get("bmi"), Some(24.5));
        assert_eq!(vector.get("missing"), None);
        assert_eq!(vector.as_f32(), vec![40.0f32, 24.5f32]);
    }

    #[test]
    fn test_serializes_columns_with_values() {
        let vector = FeatureVector::new(&["age", "bmi"], vec![40.0, 24.5]);
        assert_eq!(
            serde_json::to_value(&vector).unwrap(),
            serde_json::json!({"columns": ["age", "bmi"], "values": [40.0, 24.5]})
        );
    }
}
