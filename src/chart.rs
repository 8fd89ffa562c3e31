//! Chart Payload Validator
//!
//! The chart-rendering client needs `labels` plus a list of series, each with a
//! `label` and a `data` array. Anything else is treated as no chart at all.

use serde_json::Value;

/// Returns the payload unchanged when it has the shape the chart client
/// requires, `None` otherwise. There is no partial acceptance or repair.
pub fn validate_chart_data(chart_data: Option<Value>) -> Option<Value> {
    match chart_data {
        Some(value) if is_chart_payload(&value) => Some(value),
        _ => None,
    }
}

/// Structural check behind [`validate_chart_data`].
pub fn is_chart_payload(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };

    let (Some(labels), Some(datasets)) = (object.get("labels"), object.get("datasets")) else {
        return false;
    };

    if !labels.is_array() {
        return false;
    }

    let Some(datasets) = datasets.as_array() else {
        return false;
    };

    datasets.iter().all(|dataset| {
        dataset.as_object().is_some_and(|series| {
            series.contains_key("label")
                && series.get("data").is_some_and(Value::is_array)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_null_and_absent() {
        assert_eq!(validate_chart_data(None), None);
        assert_eq!(validate_chart_data(Some(Value::Null)), None);
    }

    #[test]
    fn test_rejects_missing_datasets() {
        let payload = json!({"labels": ["a", "b"]});
        assert_eq!(validate_chart_data(Some(payload)), None);
    }

    #[test]
    fn test_rejects_series_without_data() {
        let payload = json!({
            "labels": ["Q1", "Q2"],
            "datasets": [
                {"label": "Revenue", "data": [1, 2]},
                {"label": "Cost"}
            ]
        });
        assert_eq!(validate_chart_data(Some(payload)), None);
    }

    #[test]
    fn test_rejects_non_array_labels() {
        let payload = json!({
            "labels": "Q1,Q2",
            "datasets": [{"label": "Revenue", "data": [1, 2]}]
        });
        assert_eq!(validate_chart_data(Some(payload)), None);
    }

    #[test]
    fn test_rejects_non_array_series_data() {
        let payload = json!({
            "labels": ["Q1"],
            "datasets": [{"label": "Revenue", "data": {"Q1": 1}}]
        });
        assert!(!is_chart_payload(&payload));
    }

    #[test]
    fn test_rejects_series_that_is_not_an_object() {
        let payload = json!({
            "labels": ["Q1"],
            "datasets": ["label data"]
        });
        assert!(!is_chart_payload(&payload));
    }

    #[test]
    fn test_accepts_well_formed_payload_unchanged() {
        let payload = json!({
            "labels": ["North", "South", "East"],
            "datasets": [
                {"label": "2023", "data": [10, 20, 30], "backgroundColor": ["#ff0000", "#00ff00", "#0000ff"]},
                {"label": "2024", "data": [12, 18, 35]}
            ]
        });
        assert_eq!(validate_chart_data(Some(payload.clone())), Some(payload));
    }

    #[test]
    fn test_accepts_empty_series_list() {
        let payload = json!({"labels": [], "datasets": []});
        assert!(is_chart_payload(&payload));
    }
}
