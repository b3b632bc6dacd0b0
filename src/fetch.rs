use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use tokio_util::sync::CancellationToken;

use crate::ashby::applications::{get_application, list_applications, ListApplicationsOpts, DEFAULT_STATUS};
use crate::ashby::types::{str_at, Expand, Record};
use crate::ashby::Caller;
use crate::screening::{extract_text, score_candidate, Rubric, ScoreResult, Tier, TierSummary};

/// What to screen and how
#[derive(Debug, Clone)]
pub struct ScreenRequest {
    pub job_id: String,
    /// Application status filter; defaults to Active
    pub status: Option<String>,
    /// Cap on applications fetched; 0 fetches all
    pub limit: usize,
    /// Drop candidates below this tier from the ranked list
    pub min_tier: Option<Tier>,
    /// Fetch each application again with form submissions inlined
    pub enrich: bool,
    /// Enrichment calls allowed in flight at once
    pub enrich_concurrency: usize,
}

impl ScreenRequest {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: None,
            limit: 0,
            min_tier: None,
            enrich: false,
            enrich_concurrency: 1,
        }
    }
}

/// One candidate's screening outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenedRecord {
    pub candidate_id: String,
    pub candidate_name: String,
    pub application_id: String,
    pub job_title: String,
    pub stage: String,
    pub tier: Tier,
    pub score: ScoreResult,
}

impl ScreenedRecord {
    /// Score `corpus_source` and label the result with identity fields from `record`.
    ///
    /// The two differ when enrichment replaced the batch-level record with
    /// an expanded one.
    fn build(record: &Record, corpus_source: &Record, rubric: &Rubric) -> Self {
        let text = extract_text(corpus_source);
        let score = score_candidate(&text, rubric);
        let tier = Tier::classify(score.pct);

        let candidate_id = str_at(record, &["candidate", "id"])
            .or_else(|| str_at(record, &["candidateId"]))
            .unwrap_or_default();

        Self {
            candidate_id: candidate_id.to_string(),
            candidate_name: str_at(record, &["candidate", "name"])
                .unwrap_or("Unknown")
                .to_string(),
            application_id: str_at(record, &["id"]).unwrap_or_default().to_string(),
            job_title: str_at(record, &["job", "title"]).unwrap_or_default().to_string(),
            stage: str_at(record, &["currentInterviewStage", "title"])
                .unwrap_or_default()
                .to_string(),
            tier,
            score,
        }
    }

    pub fn from_record(record: &Record, rubric: &Rubric) -> Self {
        Self::build(record, record, rubric)
    }
}

/// Ranked screening results for a batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenOutput {
    pub screened_at: DateTime<Utc>,
    /// Every record scored, before the tier filter
    pub total_screened: usize,
    /// Tier counts over every record scored, before the tier filter
    pub summary: TierSummary,
    /// Records meeting the minimum tier, best first
    pub candidates: Vec<ScreenedRecord>,
}

/// Tally, filter and rank already-scored records.
///
/// The sort is stable: equal percentages keep their fetch order.
pub fn rank(screened: Vec<ScreenedRecord>, min_tier: Option<Tier>) -> ScreenOutput {
    let mut summary = TierSummary::default();
    for record in &screened {
        summary.record(record.tier);
    }
    let total_screened = screened.len();

    let mut candidates: Vec<ScreenedRecord> = screened
        .into_iter()
        .filter(|record| record.tier.meets(min_tier))
        .collect();
    candidates.sort_by(|a, b| b.score.pct.total_cmp(&a.score.pct));

    ScreenOutput {
        screened_at: Utc::now(),
        total_screened,
        summary,
        candidates,
    }
}

/// Screen records that are already in memory (e.g. loaded from a file)
pub fn screen_records(records: &[Record], rubric: &Rubric, min_tier: Option<Tier>) -> ScreenOutput {
    let screened = records
        .iter()
        .map(|record| ScreenedRecord::from_record(record, rubric))
        .collect();
    rank(screened, min_tier)
}

/// Fetch applications for a job, optionally enrich each one, then score,
/// filter and rank them.
///
/// Any remote failure aborts the whole pass; nothing partial is returned.
pub async fn screen_applications(
    caller: &dyn Caller,
    request: &ScreenRequest,
    rubric: &Rubric,
    cancel: &CancellationToken,
) -> Result<ScreenOutput> {
    let job_id = request.job_id.trim();
    if job_id.is_empty() {
        bail!("A job id is required to screen applications");
    }

    let status = request
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STATUS);

    let opts = ListApplicationsOpts {
        job_id: Some(job_id.to_string()),
        status: Some(status.to_string()),
        limit: request.limit,
        ..Default::default()
    };

    let applications = list_applications(caller, &opts, cancel)
        .await
        .with_context(|| format!("Failed to list {} applications for job {}", status, job_id))?
        .applications;

    tracing::info!(job_id, status, count = applications.len(), "fetched applications");

    let output = if request.enrich {
        let enriched =
            enrich_applications(caller, &applications, request.enrich_concurrency, cancel).await?;
        let screened = applications
            .iter()
            .zip(enriched.iter())
            .map(|(record, expanded)| ScreenedRecord::build(record, expanded, rubric))
            .collect();
        rank(screened, request.min_tier)
    } else {
        screen_records(&applications, rubric, request.min_tier)
    };

    tracing::info!(
        job_id,
        screened = output.total_screened,
        shown = output.candidates.len(),
        strong = output.summary.strong,
        moderate = output.summary.moderate,
        weak = output.summary.weak,
        no_signal = output.summary.no_signal,
        "screening complete"
    );

    Ok(output)
}

/// Re-fetch every application with form submissions, openings and referrals
/// inlined. Results come back in input order regardless of `concurrency`;
/// the first failure cancels the rest.
async fn enrich_applications(
    caller: &dyn Caller,
    applications: &[Record],
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Record>> {
    stream::iter(applications.iter().enumerate())
        .map(|(index, record)| async move {
            let Some(id) = str_at(record, &["id"]).filter(|id| !id.is_empty()) else {
                bail!("Cannot enrich application #{}: record has no id", index + 1);
            };

            tracing::debug!(application_id = id, "enriching application");
            get_application(caller, id, &Expand::SCREENING, cancel)
                .await
                .with_context(|| format!("Failed to enrich application {}", id))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// Fetch a single application with everything screening can use, and screen it
pub async fn screen_application(
    caller: &dyn Caller,
    application_id: &str,
    rubric: &Rubric,
    cancel: &CancellationToken,
) -> Result<ScreenedRecord> {
    let record = get_application(caller, application_id, &Expand::SCREENING, cancel)
        .await
        .with_context(|| format!("Failed to fetch application {}", application_id))?;
    Ok(ScreenedRecord::from_record(&record, rubric))
}

/// Parse application records from a JSON stream (a file or stdin).
/// Accepts the same layouts as [`records_from_json`].
pub fn records_from_reader<R: Read>(reader: R) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_reader(reader).context("Input is not valid JSON")?;
    records_from_json(value)
}

/// Interpret a JSON document as application records.
///
/// Accepts a bare array, an object with an `applications` array (the output
/// of `applications`), or a single application object.
pub fn records_from_json(value: Value) -> Result<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("applications") {
            Some(Value::Array(items)) => items,
            Some(other) => bail!("Expected 'applications' to be an array, got {}", json_kind(&other)),
            None => vec![Value::Object(map)],
        },
        other => bail!("Expected an array or object of applications, got {}", json_kind(&other)),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => bail!("Application #{} is not an object (got {})", i + 1, json_kind(&other)),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ashby::fake::FakeCaller;
    use crate::ashby::{ApiError, Params};
    use std::time::Duration;
    use tokio::time::Instant;
    use crate::screening::DEFAULT_RUBRIC;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    /// Application whose form answer is `answer`
    fn application(id: &str, name: &str, answer: &str) -> Value {
        json!({
            "id": id,
            "candidateId": format!("cand-{}", id),
            "candidate": { "id": format!("cand-{}", id), "name": name },
            "job": { "title": "Protocol Engineer" },
            "currentInterviewStage": { "title": "Application Review" },
            "applicationFormSubmissions": [ { "answer": answer } ]
        })
    }

    const STRONG: &str = "bitcoin lightning lnd golang grpc goroutine rust cargo llvm \
                          raft paxos consensus tcp quic socket";
    const MODERATE: &str = "bitcoin lightning lnd golang grpc goroutine phd dissertation";
    const WEAK: &str = "bitcoin lightning lnd";

    fn list_caller(apps: Vec<Value>) -> FakeCaller {
        FakeCaller::new(move |op, params| match op {
            "application.list" => Ok(json!({
                "success": true,
                "results": apps,
                "moreDataAvailable": false,
                "nextCursor": ""
            })),
            "application.info" => {
                let id = params["applicationId"].as_str().unwrap();
                let app = apps.iter().find(|a| a["id"] == id).cloned().unwrap();
                Ok(json!({ "success": true, "results": app }))
            }
            other => panic!("unexpected operation {}", other),
        })
    }

    #[test]
    fn test_screened_record_identity_fields() {
        let r = record(application("a1", "Ada", WEAK));
        let screened = ScreenedRecord::from_record(&r, DEFAULT_RUBRIC);
        assert_eq!(screened.application_id, "a1");
        assert_eq!(screened.candidate_id, "cand-a1");
        assert_eq!(screened.candidate_name, "Ada");
        assert_eq!(screened.job_title, "Protocol Engineer");
        assert_eq!(screened.stage, "Application Review");
    }

    #[test]
    fn test_screened_record_fallbacks() {
        let r = record(json!({ "id": "a9", "candidateId": "cand-9" }));
        let screened = ScreenedRecord::from_record(&r, DEFAULT_RUBRIC);
        assert_eq!(screened.candidate_id, "cand-9");
        assert_eq!(screened.candidate_name, "Unknown");
        assert_eq!(screened.job_title, "");
        assert_eq!(screened.stage, "");
        assert_eq!(screened.tier, Tier::NoSignal);
        assert_eq!(screened.score.pct, 0.0);
    }

    #[test]
    fn test_rank_sorts_and_summarises_before_filter() {
        let records: Vec<Record> = vec![
            record(application("a1", "Weak", WEAK)),
            record(application("a2", "Strong", STRONG)),
            record(application("a3", "Nobody", "")),
            record(application("a4", "Moderate", MODERATE)),
        ];

        let output = screen_records(&records, DEFAULT_RUBRIC, Some(Tier::Moderate));

        assert_eq!(output.total_screened, 4);
        assert_eq!(output.summary.total(), 4);
        assert_eq!(output.summary.strong, 1);
        assert_eq!(output.summary.moderate, 1);
        assert_eq!(output.summary.weak, 1);
        assert_eq!(output.summary.no_signal, 1);

        let names: Vec<&str> = output.candidates.iter().map(|c| c.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["Strong", "Moderate"]);
    }

    #[test]
    fn test_min_tier_strong_keeps_only_strong() {
        let records: Vec<Record> = vec![
            record(application("a1", "Moderate", MODERATE)),
            record(application("a2", "Strong", STRONG)),
        ];
        let output = screen_records(&records, DEFAULT_RUBRIC, Some(Tier::Strong));
        assert_eq!(output.candidates.len(), 1);
        assert!(output.candidates.iter().all(|c| c.tier == Tier::Strong));
    }

    #[test]
    fn test_no_min_tier_keeps_everything() {
        let records: Vec<Record> = vec![
            record(application("a1", "Nobody", "")),
            record(application("a2", "Weak", WEAK)),
        ];
        let output = screen_records(&records, DEFAULT_RUBRIC, None);
        assert_eq!(output.candidates.len(), 2);
        assert_eq!(output.candidates[0].candidate_name, "Weak");
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let records: Vec<Record> = vec![
            record(application("a1", "First", WEAK)),
            record(application("a2", "Second", WEAK)),
            record(application("a3", "Third", WEAK)),
        ];
        let output = screen_records(&records, DEFAULT_RUBRIC, None);
        let ids: Vec<&str> = output.candidates.iter().map(|c| c.application_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_screen_applications_without_enrichment() {
        let caller = list_caller(vec![
            application("a1", "Weak", WEAK),
            application("a2", "Strong", STRONG),
        ]);
        let request = ScreenRequest::new("job-1");

        let output = screen_applications(&caller, &request, DEFAULT_RUBRIC, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.candidates[0].application_id, "a2");
        let calls = caller.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1["jobId"], "job-1");
        assert_eq!(calls[0].1["status"], "Active");
    }

    #[tokio::test(start_paused = true)]
    async fn test_screen_applications_enriches_each_record() {
        // The batch listing carries no form answers; only enrichment sees them
        let caller = FakeCaller::new(|op, params| match op {
            "application.list" => Ok(json!({
                "success": true,
                "results": [
                    { "id": "a1", "candidate": { "id": "c1", "name": "Ada" } },
                    { "id": "a2", "candidate": { "id": "c2", "name": "Bob" } }
                ],
                "moreDataAvailable": false
            })),
            "application.info" => {
                let id = params["applicationId"].as_str().unwrap().to_string();
                let answer = if id == "a2" { STRONG } else { "" };
                Ok(json!({
                    "success": true,
                    "results": { "id": id, "applicationFormSubmissions": [answer] }
                }))
            }
            other => panic!("unexpected operation {}", other),
        });

        let mut request = ScreenRequest::new("job-1");
        request.enrich = true;
        request.enrich_concurrency = 4;
        request.status = Some("Archived".to_string());

        let output = screen_applications(&caller, &request, DEFAULT_RUBRIC, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.candidates[0].candidate_name, "Bob");
        assert_eq!(output.candidates[0].tier, Tier::Strong);
        assert_eq!(output.candidates[1].candidate_name, "Ada");

        let calls = caller.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].1["status"], "Archived");
        assert_eq!(
            calls[1].1["expand"],
            json!(["applicationFormSubmissions", "openings", "referrals"])
        );
    }

    /// Enrichment responses that finish in reverse order: earlier ids are slower
    struct StaggeredCaller;

    #[async_trait::async_trait]
    impl Caller for StaggeredCaller {
        async fn call(&self, operation: &str, params: &Params) -> Result<Value, ApiError> {
            if operation == "application.list" {
                return Ok(json!({
                    "success": true,
                    "results": [
                        { "id": "a1", "candidate": { "id": "c1", "name": "Ada" } },
                        { "id": "a2", "candidate": { "id": "c2", "name": "Bob" } },
                        { "id": "a3", "candidate": { "id": "c3", "name": "Cy" } }
                    ],
                    "moreDataAvailable": false
                }));
            }

            let id = params["applicationId"].as_str().unwrap_or_default().to_string();
            let (delay_ms, answer): (u64, &str) = match id.as_str() {
                "a1" => (300, STRONG),
                "a2" => (200, WEAK),
                _ => (10, ""),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(json!({
                "success": true,
                "results": { "id": id, "applicationFormSubmissions": [answer] }
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_enrichment_keeps_records_paired() {
        let mut request = ScreenRequest::new("job-1");
        request.enrich = true;
        request.enrich_concurrency = 3;

        let start = Instant::now();
        let output = screen_applications(
            &StaggeredCaller,
            &request,
            DEFAULT_RUBRIC,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        // All three in flight together, so the slowest one bounds the wait
        assert!(start.elapsed() < Duration::from_millis(500), "{:?}", start.elapsed());

        let rows: Vec<(&str, &str, Tier)> = output
            .candidates
            .iter()
            .map(|c| (c.application_id.as_str(), c.candidate_name.as_str(), c.tier))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("a1", "Ada", Tier::Strong),
                ("a2", "Bob", Tier::Weak),
                ("a3", "Cy", Tier::NoSignal),
            ]
        );
        assert_eq!(output.candidates[0].candidate_id, "c1");
        assert_eq!(output.candidates[2].candidate_id, "c3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrichment_failure_aborts_with_record_context() {
        let caller = FakeCaller::new(|op, params| match op {
            "application.list" => Ok(json!({
                "success": true,
                "results": [ { "id": "a1" }, { "id": "a2" } ]
            })),
            _ => {
                if params["applicationId"] == "a2" {
                    Err(ApiError::Api {
                        operation: "application.info".to_string(),
                        message: "not found".to_string(),
                    })
                } else {
                    Ok(json!({ "success": true, "results": { "id": "a1" } }))
                }
            }
        });

        let mut request = ScreenRequest::new("job-1");
        request.enrich = true;

        let err = screen_applications(&caller, &request, DEFAULT_RUBRIC, &CancellationToken::new())
            .await
            .unwrap_err();

        let msg = format!("{:#}", err);
        assert!(msg.contains("Failed to enrich application a2"), "{}", msg);
        assert!(msg.contains("not found"), "{}", msg);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_failure_aborts() {
        let caller = FakeCaller::new(|_, _| {
            Err(ApiError::Unauthorized {
                operation: "application.list".to_string(),
            })
        });

        let err = screen_applications(
            &caller,
            &ScreenRequest::new("job-1"),
            DEFAULT_RUBRIC,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        let api = err.downcast_ref::<ApiError>().unwrap();
        assert!(api.is_auth());
        assert!(format!("{:#}", err).contains("job job-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let caller = list_caller(vec![application("a1", "Ada", WEAK)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = screen_applications(&caller, &ScreenRequest::new("job-1"), DEFAULT_RUBRIC, &cancel)
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<ApiError>().unwrap().is_cancelled());
        assert_eq!(caller.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_job_id_rejected() {
        let caller = list_caller(vec![]);
        let err = screen_applications(&caller, &ScreenRequest::new("  "), DEFAULT_RUBRIC, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("job id"));
        assert_eq!(caller.call_count(), 0);
    }

    #[tokio::test]
    async fn test_screen_single_application() {
        let caller = list_caller(vec![application("a7", "Grace", MODERATE)]);
        let screened = screen_application(&caller, "a7", DEFAULT_RUBRIC, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(screened.candidate_name, "Grace");
        assert_eq!(screened.tier, Tier::Moderate);
    }

    #[test]
    fn test_records_from_reader() {
        let input = br#"{ "applications": [ { "id": "a1" }, { "id": "a2" } ], "total": 2 }"#;
        let records = records_from_reader(&input[..]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], "a2");

        let err = records_from_reader(&b"not json"[..]).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_records_from_json_shapes() {
        let bare = records_from_json(json!([{ "id": "a1" }, { "id": "a2" }])).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = records_from_json(json!({ "applications": [{ "id": "a1" }], "total": 1 })).unwrap();
        assert_eq!(wrapped.len(), 1);

        let single = records_from_json(json!({ "id": "a1", "status": "Active" })).unwrap();
        assert_eq!(single[0]["id"], "a1");

        assert!(records_from_json(json!("nope")).is_err());
        assert!(records_from_json(json!([1, 2])).is_err());
        assert!(records_from_json(json!({ "applications": "x" })).is_err());
    }
}
