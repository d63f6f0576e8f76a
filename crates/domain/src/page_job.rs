use crate::cloak_decision::Decision;
use serde::{Deserialize, Serialize};

/// Page variants. `a` is the Money page, `b` the Safe page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    A,
    B,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::A => "a",
            Variant::B => "b",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "a" => Some(Variant::A),
            "b" => Some(Variant::B),
            _ => None,
        }
    }
}

impl From<Decision> for Variant {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Money => Variant::A,
            Decision::Safe => Variant::B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    Scrape,
    AiGenerate,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Scrape => "scrape",
            JobAction::AiGenerate => "ai_generate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Pending,
    Generating,
    Generated,
    Failed,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Pending => "pending",
            PageStatus::Generating => "generating",
            PageStatus::Generated => "generated",
            PageStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PageStatus::Pending),
            "generating" => Some(PageStatus::Generating),
            "generated" => Some(PageStatus::Generated),
            "failed" => Some(PageStatus::Failed),
            _ => None,
        }
    }
}

/// The row a generation job mutates as it progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub offer_id: i64,
    pub variant: Variant,
    pub status: PageStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// A page-generation job as it travels the queue. Snake_case JSON is the
/// wire contract shared with the enqueueing dashboard APIs.
///
/// Job identity for dedup purposes is `(page_id, variant)`. A newer enqueue
/// for the same identity supersedes earlier in-flight work semantically;
/// if the older job completes first it still writes its result (last writer
/// wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGenerationJob {
    pub page_id: i64,
    pub offer_id: i64,
    pub variant: Variant,
    pub action: JobAction,
    pub source_url: String,
    pub subdomain: String,
    #[serde(default)]
    pub safe_page_style: Option<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub attempt: u32,
}

impl PageGenerationJob {
    pub fn identity(&self) -> (i64, Variant) {
        (self.page_id, self.variant)
    }

    /// The payload re-enqueued after a failed attempt.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

/// What lands in the dead-letter queue once the retry budget is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterRecord {
    pub job: PageGenerationJob,
    pub error: String,
    /// ISO-8601 UTC timestamp of the final failure.
    pub failed_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> PageGenerationJob {
        PageGenerationJob {
            page_id: 42,
            offer_id: 7,
            variant: Variant::A,
            action: JobAction::Scrape,
            source_url: "https://example.com/offer".to_string(),
            subdomain: "ab12cd".to_string(),
            safe_page_style: None,
            competitors: vec![],
            attempt: 0,
        }
    }

    #[test]
    fn variant_maps_from_decision() {
        assert_eq!(Variant::from(Decision::Money), Variant::A);
        assert_eq!(Variant::from(Decision::Safe), Variant::B);
    }

    #[test]
    fn wire_encoding_is_snake_case() {
        let json = serde_json::to_value(job()).unwrap();
        assert_eq!(json["variant"], "a");
        assert_eq!(json["action"], "scrape");
        assert_eq!(json["page_id"], 42);
    }

    #[test]
    fn attempt_defaults_to_zero_on_decode() {
        let raw = r#"{"page_id":1,"offer_id":2,"variant":"b","action":"ai_generate",
                      "source_url":"https://x.test","subdomain":"qq11ww"}"#;
        let decoded: PageGenerationJob = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.attempt, 0);
        assert_eq!(decoded.action, JobAction::AiGenerate);
    }

    #[test]
    fn next_attempt_increments_counter_only() {
        let retry = job().next_attempt();
        assert_eq!(retry.attempt, 1);
        assert_eq!(retry.identity(), (42, Variant::A));
        assert_eq!(retry.next_attempt().attempt, 2);
    }
}
