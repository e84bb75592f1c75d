//! LLM classification of extracted records.
//!
//! The pipeline treats classification as an opaque collaborator: text in,
//! `{relevant, sector, relevance_score, deadline}` out. The concrete provider
//! speaks the OpenAI Chat Completions protocol with temperature 0 and a
//! JSON-only system prompt. Failures are not retried here; a record whose
//! classification fails is carried through unclassified.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ClassifyError;
use crate::models::{CandidateRecord, Classification, ClassifiedRecord};
use crate::utils::truncate_chars;

/// How many classification calls run at once.
const CLASSIFY_CONCURRENCY: usize = 4;

/// Cap on the text sent to the model per record.
const MAX_CLASSIFY_INPUT_CHARS: usize = 8000;

const SYSTEM_PROMPT: &str = r#"Analyze African sustainability opportunities. Respond with JSON only: {
  "relevant": boolean,
  "sector": "energy" | "agriculture" | "water" | "other",
  "deadline": "YYYY-MM-DD" or null,
  "relevance_score": 0-100
}"#;

/// A classification backend.
pub trait Classify {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;
}

/// OpenAI-compatible Chat Completions classifier.
pub struct OpenAiClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl Classify for OpenAiClassifier {
    #[instrument(level = "info", skip_all)]
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let input = truncate_chars(text, MAX_CLASSIFY_INPUT_CHARS);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &input,
                },
            ],
            temperature: 0.0,
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let body: ChatResponse = resp.json().await?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");
        parse_verdict(content)
    }
}

/// Parse the model's JSON verdict, tolerating markdown code fences and
/// clamping out-of-range scores.
pub(crate) fn parse_verdict(content: &str) -> Result<Classification, ClassifyError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let mut verdict: Classification = serde_json::from_str(trimmed).map_err(|e| {
        ClassifyError::Malformed(format!("{e}: {}", crate::utils::truncate_for_log(trimmed, 200)))
    })?;
    verdict.relevance_score = verdict.relevance_score.min(100);
    Ok(verdict)
}

/// Classify a batch of records, carrying failures through as unclassified.
///
/// Calls run [`CLASSIFY_CONCURRENCY`] at a time but results keep record
/// order.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub async fn classify_records<C: Classify>(
    classifier: &C,
    records: Vec<CandidateRecord>,
) -> Vec<ClassifiedRecord> {
    let total = records.len();
    let classified: Vec<ClassifiedRecord> = stream::iter(records)
        .map(|record| async move {
            match classifier.classify(&record.content).await {
                Ok(classification) => ClassifiedRecord {
                    record,
                    classification: Some(classification),
                },
                Err(e) => {
                    warn!(url = %record.url, error = %e, "Classification failed; keeping record unclassified");
                    ClassifiedRecord {
                        record,
                        classification: None,
                    }
                }
            }
        })
        .buffered(CLASSIFY_CONCURRENCY)
        .collect()
        .await;

    let succeeded = classified
        .iter()
        .filter(|r| r.classification.is_some())
        .count();
    info!(total, succeeded, failed = total - succeeded, "Classification pass finished");
    classified
}

/// Wrap records without calling any model, for `--skip-classify` runs.
pub fn skip_classification(records: Vec<CandidateRecord>) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|record| ClassifiedRecord {
            record,
            classification: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, Sector};
    use chrono::Utc;

    fn record(url: &str, content: &str) -> CandidateRecord {
        CandidateRecord {
            url: url.to_string(),
            title: String::new(),
            content: content.to_string(),
            raw_date: String::new(),
            source_id: "afdb".to_string(),
            confidence: Confidence::High,
            fetched_at: Utc::now(),
        }
    }

    struct FixedClassifier {
        verdict: Classification,
    }

    impl Classify for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification, ClassifyError> {
            Ok(self.verdict.clone())
        }
    }

    struct FailingClassifier;

    impl Classify for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification, ClassifyError> {
            Err(ClassifyError::Status(500))
        }
    }

    #[test]
    fn parse_verdict_reads_plain_json() {
        let verdict = parse_verdict(
            r#"{"relevant": true, "sector": "water", "deadline": "2026-09-01", "relevance_score": 77}"#,
        )
        .unwrap();
        assert!(verdict.relevant);
        assert_eq!(verdict.sector, Sector::Water);
        assert_eq!(verdict.deadline.as_deref(), Some("2026-09-01"));
        assert_eq!(verdict.relevance_score, 77);
    }

    #[test]
    fn parse_verdict_strips_code_fences() {
        let fenced = "```json\n{\"relevant\": false, \"sector\": \"other\", \"relevance_score\": 10}\n```";
        let verdict = parse_verdict(fenced).unwrap();
        assert!(!verdict.relevant);
        assert_eq!(verdict.sector, Sector::Other);
    }

    #[test]
    fn parse_verdict_clamps_scores() {
        let verdict = parse_verdict(
            r#"{"relevant": true, "sector": "energy", "relevance_score": 250}"#,
        )
        .unwrap();
        assert_eq!(verdict.relevance_score, 100);
    }

    #[test]
    fn parse_verdict_rejects_garbage() {
        assert!(matches!(
            parse_verdict("not json at all"),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn batch_keeps_record_order() {
        let classifier = FixedClassifier {
            verdict: Classification {
                relevant: true,
                sector: Sector::Energy,
                relevance_score: 80,
                deadline: None,
            },
        };
        let records = vec![
            record("https://a/1", "solar"),
            record("https://a/2", "wind"),
            record("https://a/3", "hydro"),
        ];
        let classified = classify_records(&classifier, records).await;
        let urls: Vec<&str> = classified.iter().map(|r| r.record.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2", "https://a/3"]);
        assert!(classified.iter().all(|r| r.classification.is_some()));
    }

    #[tokio::test]
    async fn failures_keep_records_unclassified() {
        let classified =
            classify_records(&FailingClassifier, vec![record("https://a/1", "x")]).await;
        assert_eq!(classified.len(), 1);
        assert!(classified[0].classification.is_none());
    }

    #[test]
    fn skip_classification_wraps_everything() {
        let classified = skip_classification(vec![record("https://a/1", "x")]);
        assert_eq!(classified.len(), 1);
        assert!(classified[0].classification.is_none());
    }
}
