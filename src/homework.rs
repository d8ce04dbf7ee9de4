//! Response validation and status translation.
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{BotError, Result};

/// Review verdicts the API is known to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "approved" => Some(Verdict::Approved),
            "reviewing" => Some(Verdict::Reviewing),
            "rejected" => Some(Verdict::Rejected),
            _ => None,
        }
    }

    pub fn sentence(&self) -> &'static str {
        match self {
            Verdict::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Verdict::Reviewing => "Работа взята на проверку ревьюером.",
            Verdict::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

fn shape_error(reason: &'static str) -> BotError {
    error!(reason, "API response rejected");
    BotError::UnexpectedShape(reason)
}

/// Check the response layout and return the most recent homework, if any.
pub fn check_response(response: &Value) -> Result<Option<&Value>> {
    let root = response
        .as_object()
        .ok_or_else(|| shape_error("not a mapping"))?;
    let homeworks = root
        .get("homeworks")
        .ok_or_else(|| shape_error("missing homeworks"))?;
    if !root.contains_key("current_date") {
        return Err(shape_error("missing current_date"));
    }
    let homeworks = homeworks
        .as_array()
        .ok_or_else(|| shape_error("homeworks not a list"))?;

    match homeworks.first() {
        Some(homework) => Ok(Some(homework)),
        None => {
            debug!("no homework updates");
            Ok(None)
        }
    }
}

/// Build the notification text for one homework record.
pub fn parse_status(homework: &Value) -> Result<String> {
    let raw_status = homework.get("status").ok_or_else(|| {
        error!("homework record has no status");
        BotError::MissingField("status")
    })?;
    let verdict = raw_status
        .as_str()
        .and_then(Verdict::from_status)
        .ok_or_else(|| {
            let shown = raw_status
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| raw_status.to_string());
            error!(status = %shown, "unknown homework status");
            BotError::UnknownVerdict(shown)
        })?;
    let name = homework
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            error!("homework record has no homework_name");
            BotError::MissingField("homework_name")
        })?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name,
        verdict.sentence()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_table_knows_three_statuses() {
        assert_eq!(Verdict::from_status("approved"), Some(Verdict::Approved));
        assert_eq!(Verdict::from_status("reviewing"), Some(Verdict::Reviewing));
        assert_eq!(Verdict::from_status("rejected"), Some(Verdict::Rejected));
        assert_eq!(Verdict::from_status("pending"), None);
        assert_eq!(Verdict::from_status("Approved"), None);
    }

    #[test]
    fn rejects_non_mapping() {
        let err = check_response(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, BotError::UnexpectedShape("not a mapping")));
    }

    #[test]
    fn rejects_missing_homeworks() {
        let err = check_response(&json!({ "current_date": 1 })).unwrap_err();
        assert!(matches!(err, BotError::UnexpectedShape("missing homeworks")));
    }

    #[test]
    fn rejects_missing_current_date() {
        let err = check_response(&json!({ "homeworks": [] })).unwrap_err();
        assert!(matches!(err, BotError::UnexpectedShape("missing current_date")));
    }

    #[test]
    fn rejects_homeworks_that_are_not_a_list() {
        let err = check_response(&json!({ "homeworks": {}, "current_date": 1 })).unwrap_err();
        assert!(matches!(err, BotError::UnexpectedShape("homeworks not a list")));
    }

    #[test]
    fn empty_homeworks_is_no_record() {
        let response = json!({ "homeworks": [], "current_date": 1 });
        assert!(check_response(&response).unwrap().is_none());
    }

    #[test]
    fn returns_first_homework() {
        let response = json!({
            "homeworks": [
                { "status": "approved", "homework_name": "newest" },
                { "status": "rejected", "homework_name": "older" }
            ],
            "current_date": 1
        });
        let homework = check_response(&response).unwrap().unwrap();
        assert_eq!(homework["homework_name"], "newest");
    }

    #[test]
    fn approved_message_text() {
        let message =
            parse_status(&json!({ "status": "approved", "homework_name": "Lab1" })).unwrap();
        assert_eq!(
            message,
            "Изменился статус проверки работы \"Lab1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn reviewing_and_rejected_messages() {
        let reviewing =
            parse_status(&json!({ "status": "reviewing", "homework_name": "hw2" })).unwrap();
        assert!(reviewing.ends_with("Работа взята на проверку ревьюером."));
        let rejected =
            parse_status(&json!({ "status": "rejected", "homework_name": "hw2" })).unwrap();
        assert!(rejected.ends_with("Работа проверена: у ревьюера есть замечания."));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err =
            parse_status(&json!({ "status": "pending", "homework_name": "Lab1" })).unwrap_err();
        match err {
            BotError::UnknownVerdict(status) => assert_eq!(status, "pending"),
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn non_string_status_is_unknown() {
        let err = parse_status(&json!({ "status": 3, "homework_name": "Lab1" })).unwrap_err();
        assert!(matches!(err, BotError::UnknownVerdict(s) if s == "3"));
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = parse_status(&json!({ "homework_name": "Lab1" })).unwrap_err();
        assert!(matches!(err, BotError::MissingField("status")));

        let err = parse_status(&json!({ "status": "approved" })).unwrap_err();
        assert!(matches!(err, BotError::MissingField("homework_name")));

        let err = parse_status(&json!("approved")).unwrap_err();
        assert!(matches!(err, BotError::MissingField("status")));
    }

    #[test]
    fn status_is_checked_before_name() {
        let err = parse_status(&json!({ "status": "pending" })).unwrap_err();
        assert!(matches!(err, BotError::UnknownVerdict(_)));
    }
}
