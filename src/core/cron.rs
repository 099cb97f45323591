use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Job list as reported by `cron list --json`.
///
/// Individual jobs belong to the CLI's own schema and are forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronJobList {
    pub jobs: Vec<Value>,
}

impl CronJobList {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Never fails: anything short of a JSON object with a `jobs` array becomes
/// an empty list.
pub fn parse_cron_output(raw: Option<&str>) -> CronJobList {
    let Some(raw) = raw else {
        return CronJobList::empty();
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "cron list output is not valid JSON");
            return CronJobList::empty();
        }
    };

    match parsed.get("jobs") {
        Some(Value::Array(jobs)) => CronJobList { jobs: jobs.clone() },
        Some(_) => {
            warn!("cron list output has a non-array `jobs` field");
            CronJobList::empty()
        }
        None => CronJobList::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passes_jobs_through_unchanged() {
        let list = parse_cron_output(Some(r#"{"jobs":[{"id":1,"name":"backup"}]}"#));
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({ "jobs": [{ "id": 1, "name": "backup" }] })
        );
    }

    #[test]
    fn keeps_unknown_job_fields_and_order() {
        let raw = r#"{"jobs":[{"id":"b","schedule":{"cron":"0 * * * *"},"enabled":false},{"id":"a"}],"total":2}"#;
        let list = parse_cron_output(Some(raw));
        assert_eq!(list.jobs.len(), 2);
        assert_eq!(list.jobs[0]["schedule"]["cron"], "0 * * * *");
        assert_eq!(list.jobs[1]["id"], "a");
    }

    #[test]
    fn malformed_json_is_empty() {
        for raw in ["", "{", "not json", "{\"jobs\": [1,}", "Error: gateway offline"] {
            assert_eq!(parse_cron_output(Some(raw)), CronJobList::empty(), "input {raw:?}");
        }
    }

    #[test]
    fn missing_or_wrong_jobs_key_is_empty() {
        assert!(parse_cron_output(Some(r#"{"items":[1]}"#)).jobs.is_empty());
        assert!(parse_cron_output(Some(r#"{"jobs":{"id":1}}"#)).jobs.is_empty());
        assert!(parse_cron_output(Some("[1,2,3]")).jobs.is_empty());
        assert!(parse_cron_output(Some("null")).jobs.is_empty());
    }

    #[test]
    fn failed_invocation_is_empty() {
        assert_eq!(parse_cron_output(None), CronJobList::empty());
    }
}
