//! Search filter criteria.

use serde::{Deserialize, Serialize};

/// Caller-supplied search criteria, emitted by the search form.
///
/// The record is an opaque passthrough: it is serialized as-is into the
/// request body and never interpreted by the stream consumer. An empty
/// string means "no constraint" for that field; range-like criteria
/// (scores, tuition) arrive pre-serialized as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub region: String,
    pub prefecture: String,
    pub faculty: String,
    pub exam_type: String,
    pub use_common_test: String,
    pub deviation_score: String,
    pub institution_type: String,
    pub name_keyword: String,
    pub common_test_score: String,
    pub external_english: String,
    pub required_subjects: String,
    pub tuition_max: String,
    pub scholarship: String,
    pub qualification: String,
    pub exam_schedule: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let filters = SearchFilters {
            region: "関東".to_string(),
            exam_type: "一般選抜".to_string(),
            name_keyword: "工業".to_string(),
            ..SearchFilters::default()
        };

        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(value["region"], "関東");
        assert_eq!(value["examType"], "一般選抜");
        assert_eq!(value["nameKeyword"], "工業");
        assert_eq!(value["useCommonTest"], "");
    }
}
