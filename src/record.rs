//! Request and response records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The structured fields the LLM is asked to fill in.
///
/// Every field is required: a reply missing any of them fails to
/// deserialise, so a successful extraction is always complete.
/// Field doc comments become the schema descriptions the model sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateFields {
    /// The roll number of the candidate
    pub roll_no: String,
    /// The name of the candidate
    pub candidate_name: String,
    /// The name of the candidate's mother
    pub mother_name: String,
    /// The name of the candidate's father
    pub father_name: String,
    /// The date of birth of the candidate
    pub date_of_birth: String,
    /// The name of the school
    pub school_name: String,
    /// The result of the exam
    pub result: String,
}

impl CandidateFields {
    /// Schema name sent to the model and used in error messages.
    pub const SCHEMA_NAME: &'static str = "CandidateFields";
}

/// Response body of `POST /upload/`.
///
/// Structured fields are `Option` on the wire to keep the published schema
/// stable, but [`DocumentRecord::from_fields`] is the only constructor used by
/// the pipeline, so they are either all `Some` or the request failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub file_name: String,
    /// Full OCR text the fields were extracted from.
    pub content: String,
    pub roll_no: Option<String>,
    pub candidate_name: Option<String>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub school_name: Option<String>,
    pub result: Option<String>,
}

impl DocumentRecord {
    pub fn from_fields(
        file_name: impl Into<String>,
        content: impl Into<String>,
        fields: CandidateFields,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            roll_no: Some(fields.roll_no),
            candidate_name: Some(fields.candidate_name),
            mother_name: Some(fields.mother_name),
            father_name: Some(fields.father_name),
            date_of_birth: Some(fields.date_of_birth),
            school_name: Some(fields.school_name),
            result: Some(fields.result),
        }
    }

    /// True when every structured field is populated.
    pub fn is_complete(&self) -> bool {
        [
            &self.roll_no,
            &self.candidate_name,
            &self.mother_name,
            &self.father_name,
            &self.date_of_birth,
            &self.school_name,
            &self.result,
        ]
        .iter()
        .all(|f| f.is_some())
    }
}

/// Request body of `POST /chatbot/`. A missing `text` reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatPrompt {
    #[serde(default)]
    pub text: String,
}

/// Response body of `POST /chatbot/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> CandidateFields {
        CandidateFields {
            roll_no: "1234567".into(),
            candidate_name: "ASHA KUMARI".into(),
            mother_name: "SUNITA DEVI".into(),
            father_name: "RAMESH KUMAR".into(),
            date_of_birth: "04/11/2006".into(),
            school_name: "GOVT. SR. SEC. SCHOOL".into(),
            result: "PASS".into(),
        }
    }

    #[test]
    fn record_from_fields_is_complete() {
        let rec = DocumentRecord::from_fields("sheet.png", "raw text", fields());
        assert!(rec.is_complete());
        assert_eq!(rec.file_name, "sheet.png");
        assert_eq!(rec.content, "raw text");
        assert_eq!(rec.result.as_deref(), Some("PASS"));
    }

    #[test]
    fn candidate_fields_reject_missing_field() {
        let json = r#"{"roll_no":"1","candidate_name":"A","mother_name":"B",
            "father_name":"C","date_of_birth":"D","school_name":"E"}"#;
        let err = serde_json::from_str::<CandidateFields>(json).unwrap_err();
        assert!(err.to_string().contains("result"), "got: {err}");
    }

    #[test]
    fn candidate_fields_reject_null() {
        let json = r#"{"roll_no":null,"candidate_name":"A","mother_name":"B",
            "father_name":"C","date_of_birth":"D","school_name":"E","result":"F"}"#;
        assert!(serde_json::from_str::<CandidateFields>(json).is_err());
    }

    #[test]
    fn chat_prompt_missing_text_is_empty() {
        let p: ChatPrompt = serde_json::from_str("{}").unwrap();
        assert!(p.text.is_empty());
    }

    #[test]
    fn record_serialises_every_key() {
        let rec = DocumentRecord::from_fields("a.pdf", "x", fields());
        let v = serde_json::to_value(&rec).unwrap();
        for key in [
            "file_name",
            "content",
            "roll_no",
            "candidate_name",
            "mother_name",
            "father_name",
            "date_of_birth",
            "school_name",
            "result",
        ] {
            assert!(v.get(key).is_some(), "missing key {key}");
        }
    }
}
