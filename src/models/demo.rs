//! Fixed demonstration dataset.
//!
//! Shown instead of an empty screen when a search session fails before
//! producing any results. The content is intentionally static.

use super::University;

/// The demonstration records used as the failure fallback.
pub fn demo_universities() -> Vec<University> {
    vec![
        University {
            id: "1".to_string(),
            name: "東京工業大学".to_string(),
            official_url: "https://www.titech.ac.jp/".to_string(),
            faculty: "情報理工学院".to_string(),
            department: "情報工学系".to_string(),
            deviation_score: "65-70".to_string(),
            common_test_score: "85-90%".to_string(),
            exam_type: "一般選抜".to_string(),
            required_subjects: vec![
                "数学".to_string(),
                "理科".to_string(),
                "英語".to_string(),
            ],
            exam_date: "2025年2月25日".to_string(),
            ai_summary: "情報工学分野で日本トップクラスの研究環境を誇る。AI・機械学習の研究が盛んで、産学連携も充実。"
                .to_string(),
            sources: vec![
                "https://www.titech.ac.jp/".to_string(),
                "https://admissions.titech.ac.jp/".to_string(),
            ],
        },
        University {
            id: "2".to_string(),
            name: "早稲田大学".to_string(),
            official_url: "https://www.waseda.jp/".to_string(),
            faculty: "基幹理工学部".to_string(),
            department: "情報理工学科".to_string(),
            deviation_score: "60-65".to_string(),
            common_test_score: "80-85%".to_string(),
            exam_type: "一般選抜".to_string(),
            required_subjects: vec![
                "数学".to_string(),
                "理科".to_string(),
                "英語".to_string(),
            ],
            exam_date: "2025年2月20日".to_string(),
            ai_summary: "伝統ある私立大学の理工学部。幅広い分野の研究が可能で、就職実績も良好。国際交流プログラムも充実。"
                .to_string(),
            sources: vec!["https://www.waseda.jp/".to_string()],
        },
        University {
            id: "3".to_string(),
            name: "慶應義塾大学".to_string(),
            official_url: "https://www.keio.ac.jp/".to_string(),
            faculty: "理工学部".to_string(),
            department: "情報工学科".to_string(),
            deviation_score: "62-67".to_string(),
            common_test_score: "82-87%".to_string(),
            exam_type: "一般選抜".to_string(),
            required_subjects: vec![
                "数学".to_string(),
                "理科".to_string(),
                "英語".to_string(),
            ],
            exam_date: "2025年2月18日".to_string(),
            ai_summary: "総合力の高い理工学部。産業界とのつながりが強く、実践的な教育が特徴。キャンパス環境も優れている。"
                .to_string(),
            sources: vec!["https://www.keio.ac.jp/".to_string()],
        },
    ]
}
