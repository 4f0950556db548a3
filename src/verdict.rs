use crate::{NotReady, Response, Verdict};

/// Reduces an observed status and body to a verdict.
///
/// A wrong status is reported before missing content when both fail.
pub fn reduce(
    status: u16,
    body: &str,
    expected_status: u16,
    expected_substring: &str,
    ready_message: &str,
) -> Verdict {
    if status != expected_status {
        return Verdict::NotReady(NotReady::StatusMismatch {
            expected: expected_status,
            actual: status,
        });
    }
    if !body.contains(expected_substring) {
        return Verdict::NotReady(NotReady::ContentMissing {
            expected: expected_substring.to_owned(),
        });
    }
    Verdict::Ready(ready_message.to_owned())
}

pub(crate) fn reduce_response(response: &Response, request: &crate::ProbeRequest) -> Verdict {
    reduce(
        response.status(),
        response.body(),
        request.expected_status,
        &request.expected_substring,
        &request.ready_message,
    )
}

#[cfg(test)]
mod tests {
    use super::reduce;
    use crate::{NotReady, Verdict};

    const MARKER: &str = "Static site successfully deployed";

    #[test]
    fn matching_status_and_content_is_ready() {
        let body = format!("<html><h1>{MARKER}</h1></html>");
        assert_eq!(
            reduce(200, &body, 200, MARKER, "Website is accessible"),
            Verdict::Ready("Website is accessible".to_owned())
        );
    }

    #[test]
    fn status_mismatch_names_both_codes() {
        let verdict = reduce(503, "Service Unavailable", 200, MARKER, "ok");
        assert_eq!(
            verdict,
            Verdict::NotReady(NotReady::StatusMismatch {
                expected: 200,
                actual: 503
            })
        );
        let Verdict::NotReady(reason) = verdict else {
            panic!("expected not ready");
        };
        assert_eq!(reason.to_string(), "expected status code 200, got 503");
    }

    #[test]
    fn missing_content_is_distinct_from_status_mismatch() {
        let verdict = reduce(200, "<html>AccessDenied</html>", 200, MARKER, "ok");
        match verdict {
            Verdict::NotReady(reason @ NotReady::ContentMissing { .. }) => {
                assert!(reason.is_mismatch());
                assert_eq!(reason.to_string(), "expected content not found");
            }
            other => panic!("expected missing content, got {other:?}"),
        }
    }

    #[test]
    fn status_is_reported_before_content_when_both_fail() {
        assert!(matches!(
            reduce(403, "AccessDenied", 404, "Page Not Found", "ok"),
            Verdict::NotReady(NotReady::StatusMismatch {
                expected: 404,
                actual: 403
            })
        ));
    }

    #[test]
    fn empty_expected_substring_always_matches() {
        assert!(reduce(204, "", 204, "", "ok").is_ready());
    }

    #[test]
    fn reduction_is_deterministic() {
        let body = format!("prefix {MARKER} suffix");
        let first = reduce(200, &body, 200, MARKER, "ready");
        for _ in 0..5 {
            assert_eq!(reduce(200, &body, 200, MARKER, "ready"), first);
        }
    }
}
