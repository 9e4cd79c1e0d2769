//! University result records and their identity key.

use serde::{Deserialize, Serialize};

/// One unit of search output as streamed by the backend.
///
/// Everything beyond the identity key is carried opaquely for display. The
/// backend may refine a record between frames (a later `aiSummary`, updated
/// score ranges), so the same identity can arrive more than once with
/// different payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub official_url: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub deviation_score: String,
    #[serde(default)]
    pub common_test_score: String,
    #[serde(default)]
    pub exam_type: String,
    #[serde(default)]
    pub required_subjects: Vec<String>,
    #[serde(default)]
    pub exam_date: String,
    #[serde(default)]
    pub ai_summary: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Identity of a displayed result.
///
/// One institution can appear several times under different faculties or exam
/// types, so `id` alone does not identify a row. Two records with the same
/// key are the "same" displayed item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniversityKey {
    pub id: String,
    pub faculty: String,
    pub exam_type: String,
}

impl University {
    /// The (id, faculty, examType) tuple used for deduplication and
    /// favorites membership.
    pub fn identity_key(&self) -> UniversityKey {
        UniversityKey {
            id: self.id.clone(),
            faculty: self.faculty.clone(),
            exam_type: self.exam_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, faculty: &str, exam_type: &str) -> University {
        University {
            id: id.to_string(),
            name: "テスト大学".to_string(),
            official_url: String::new(),
            faculty: faculty.to_string(),
            department: String::new(),
            deviation_score: String::new(),
            common_test_score: String::new(),
            exam_type: exam_type.to_string(),
            required_subjects: Vec::new(),
            exam_date: String::new(),
            ai_summary: String::new(),
            sources: Vec::new(),
        }
    }

    #[test]
    fn test_identity_key_ignores_payload_fields() {
        let mut a = record("1", "理工学部", "一般選抜");
        let mut b = record("1", "理工学部", "一般選抜");
        a.ai_summary = "first".to_string();
        b.ai_summary = "second".to_string();
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_identity_key_distinguishes_faculty_and_exam_type() {
        let base = record("1", "理工学部", "一般選抜");
        assert_ne!(
            base.identity_key(),
            record("1", "文学部", "一般選抜").identity_key()
        );
        assert_ne!(
            base.identity_key(),
            record("1", "理工学部", "総合型選抜").identity_key()
        );
        assert_ne!(
            base.identity_key(),
            record("2", "理工学部", "一般選抜").identity_key()
        );
    }

    #[test]
    fn test_deserializes_camel_case_and_ignores_unknown_fields() {
        let json = r#"{
            "id": "42",
            "name": "東京工業大学",
            "officialUrl": "https://www.titech.ac.jp/",
            "faculty": "情報理工学院",
            "examType": "一般選抜",
            "aiSummary": "要約",
            "examSchedules": ["願書受付: 2024年12月1日"]
        }"#;

        let university: University = serde_json::from_str(json).unwrap();
        assert_eq!(university.id, "42");
        assert_eq!(university.official_url, "https://www.titech.ac.jp/");
        assert_eq!(university.exam_type, "一般選抜");
        assert!(university.required_subjects.is_empty());
    }
}
