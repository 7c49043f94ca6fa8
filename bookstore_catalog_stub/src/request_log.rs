use std::collections::VecDeque;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
struct InjectedFailure {
    method: String,
    path: String,
    status: StatusCode,
}

/// Every request that reached the stub, reads and rejected ones included,
/// plus failures queued to answer the next matching requests
#[derive(Default)]
pub struct RequestLog {
    seen: parking_lot::Mutex<Vec<(String, String)>>,
    injected_failures: parking_lot::Mutex<VecDeque<InjectedFailure>>,
}

impl RequestLog {
    /// Answers the next `method` request to `path` with `status` instead of handling it
    pub fn fail_next(&self, method: &str, path: &str, status: StatusCode) {
        self.injected_failures.lock().push_back(InjectedFailure {
            method: method.to_string(),
            path: path.to_string(),
            status,
        });
    }

    /// Number of `method` requests that reached `path`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|(seen_method, seen_path)| seen_method == method && seen_path == path)
            .count()
    }

    /// Logs the request and takes the failure queued for it, if any
    pub fn observe(&self, method: &str, path: &str) -> Option<StatusCode> {
        self.seen
            .lock()
            .push((method.to_string(), path.to_string()));

        let mut injected_failures = self.injected_failures.lock();
        let position = injected_failures
            .iter()
            .position(|failure| failure.method == method && failure.path == path)?;
        injected_failures.remove(position).map(|failure| failure.status)
    }
}

#[cfg(test)]
mod request_log_tests {
    use actix_web::http::StatusCode;

    use super::RequestLog;

    #[test]
    fn queued_failure_answers_one_matching_request() {
        let log = RequestLog::default();
        log.fail_next("GET", "/api/v1/categories", StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(log.observe("POST", "/api/v1/categories"), None);
        assert_eq!(log.observe("GET", "/api/v1/age-groups"), None);
        assert_eq!(
            log.observe("GET", "/api/v1/categories"),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
        assert_eq!(log.observe("GET", "/api/v1/categories"), None);

        assert_eq!(log.count("GET", "/api/v1/categories"), 2);
        assert_eq!(log.count("POST", "/api/v1/categories"), 1);
    }
}
