//! Line Handlers
//!
//! Turns one request line into one response line.

use serde::Serialize;
use tracing::debug;

use crate::models::{ErrorResponse, PredictRequest, PredictResponse};
use crate::service::PredictionService;

/// Handles one protocol line.
///
/// Returns `None` for blank lines. Malformed JSON and invalid keys produce an
/// `{"error": ...}` line instead of a prediction.
pub fn handle_line(service: &PredictionService, line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let response = match serde_json::from_str::<PredictRequest>(line) {
        Ok(req) => match req.into_key() {
            Ok(key) => {
                let ttl = service.predict(&key);
                to_line(&PredictResponse::new(&key, ttl))
            }
            Err(err) => {
                debug!(error = %err, "Rejected request");
                to_line(&ErrorResponse::from(&err))
            }
        },
        Err(err) => {
            debug!(error = %err, "Malformed request line");
            to_line(&ErrorResponse::new(format!("Malformed request: {}", err)))
        }
    };
    Some(response)
}

fn to_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::Value;

    fn service() -> PredictionService {
        PredictionService::from_config(&Config::default())
    }

    fn parse(line: Option<String>) -> Value {
        serde_json::from_str(&line.unwrap()).unwrap()
    }

    #[test]
    fn test_predict_line() {
        let svc = service();
        let json = parse(handle_line(&svc, r#"{"key":"user:42"}"#));

        assert_eq!(json["key"], "user:42");
        assert_eq!(json["ttl"], 30);
    }

    #[test]
    fn test_blank_line_is_skipped() {
        let svc = service();
        assert!(handle_line(&svc, "   ").is_none());
        assert_eq!(svc.stats().requests, 0);
    }

    #[test]
    fn test_malformed_line() {
        let svc = service();
        let json = parse(handle_line(&svc, "not json"));
        assert!(json["error"].as_str().unwrap().starts_with("Malformed request"));
    }

    #[test]
    fn test_invalid_key_line() {
        let svc = service();
        let json = parse(handle_line(&svc, r#"{"key":""}"#));
        assert_eq!(json["error"], "Invalid key: Key cannot be empty");
        assert_eq!(svc.stats().requests, 0);
    }
}
