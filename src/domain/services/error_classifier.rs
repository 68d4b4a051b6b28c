//! Single place where upstream HTTP statuses and transport failures become
//! user-facing errors. Both the direct inference client and the relay-proxy
//! client route their failures through [`classify_upstream_failure`].

use crate::domain::{DomainError, ErrorKind};

const ANONYMOUS_TRANSPORT_MESSAGE: &str = "Could not reach the inference server. Check OLLAMA_URL \
     and that the tunnel (or Ollama) is running.";

/// Transport-level failure observed before any HTTP status was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    connect: bool,
    detail: String,
}

impl TransportFailure {
    /// The peer could not be reached at all (refused, DNS, no route).
    pub fn connect(detail: impl Into<String>) -> Self {
        Self {
            connect: true,
            detail: detail.into(),
        }
    }

    /// The connection was made but the exchange failed (timeout, broken body).
    pub fn other(detail: impl Into<String>) -> Self {
        Self {
            connect: false,
            detail: detail.into(),
        }
    }

    pub fn is_connect(&self) -> bool {
        self.connect
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// What the caller knows about the request that failed.
#[derive(Debug, Clone, Copy)]
pub struct FailureContext<'a> {
    /// Model the request asked for; named in not-found messages.
    pub model: &'a str,
    /// Where the request went. `None` keeps the location out of messages,
    /// which the relay proxy relies on to hide its upstream.
    pub target: Option<&'a str>,
}

impl<'a> FailureContext<'a> {
    pub fn new(model: &'a str) -> Self {
        Self {
            model,
            target: None,
        }
    }

    pub fn with_target(mut self, target: &'a str) -> Self {
        self.target = Some(target);
        self
    }
}

/// Classification order: transport failure, 404, 502 (or the synthetic 0),
/// then any other status.
pub fn classify_kind(status: Option<u16>, transport: Option<&TransportFailure>) -> ErrorKind {
    if let Some(failure) = transport {
        return if failure.is_connect() {
            ErrorKind::UpstreamUnreachable
        } else {
            ErrorKind::TransportFailure
        };
    }

    match status {
        Some(404) => ErrorKind::UpstreamNotFound,
        Some(0) | Some(502) | None => ErrorKind::UpstreamUnreachable,
        Some(_) => ErrorKind::UpstreamOther,
    }
}

/// Maps one failed upstream exchange to a [`DomainError`] whose display text is
/// ready to show the user.
pub fn classify_upstream_failure(
    status: Option<u16>,
    body: &str,
    transport: Option<&TransportFailure>,
    context: FailureContext<'_>,
) -> DomainError {
    match classify_kind(status, transport) {
        ErrorKind::UpstreamNotFound => DomainError::model_not_found(context.model),
        ErrorKind::UpstreamUnreachable => DomainError::unreachable(unreachable_message(context)),
        ErrorKind::TransportFailure => match context.target {
            Some(target) => {
                let detail = transport.map(TransportFailure::detail).unwrap_or_default();
                DomainError::transport(format!("Failed to fetch from {target}: {detail}"))
            }
            // Transport details name the URL; an anonymous caller gets a fixed message.
            None => DomainError::transport(ANONYMOUS_TRANSPORT_MESSAGE),
        },
        _ => DomainError::upstream_status(status.unwrap_or_default(), body),
    }
}

fn unreachable_message(context: FailureContext<'_>) -> String {
    match context.target {
        Some(target) => format!(
            "Inference server unreachable at {target}. Is it running? Start it with: ollama serve, \
             or check that the tunnel URL is correct and the tunnel is up."
        ),
        None => "Inference server unreachable. Is Ollama running? Check the upstream URL and \
                 that the tunnel (or Ollama) is up."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FailureContext<'static> {
        FailureContext::new("dolphin-llama3")
    }

    #[test]
    fn not_found_mentions_model() {
        let err = classify_upstream_failure(Some(404), "", None, ctx());
        assert_eq!(err.kind(), ErrorKind::UpstreamNotFound);
        assert!(err.user_message().contains("ollama pull dolphin-llama3"));
    }

    #[test]
    fn bad_gateway_and_zero_are_unreachable() {
        for status in [0u16, 502] {
            let err = classify_upstream_failure(Some(status), "gateway", None, ctx());
            assert!(err.is_unreachable());
            assert!(err.user_message().contains("unreachable"));
        }
    }

    #[test]
    fn connect_failure_is_unreachable_and_names_target_when_given() {
        let failure = TransportFailure::connect("connection refused");
        let err = classify_upstream_failure(
            None,
            "",
            Some(&failure),
            ctx().with_target("http://localhost:11434"),
        );
        assert!(err.is_unreachable());
        assert!(err.user_message().contains("http://localhost:11434"));
    }

    #[test]
    fn anonymous_context_hides_location() {
        let failure = TransportFailure::connect("refused");
        let err = classify_upstream_failure(None, "", Some(&failure), ctx());
        assert!(!err.user_message().contains("http"));
    }

    #[test]
    fn other_transport_failures_are_transport_errors() {
        let failure = TransportFailure::other("timed out");
        let err = classify_upstream_failure(
            None,
            "",
            Some(&failure),
            ctx().with_target("http://localhost:11434"),
        );
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert!(err.user_message().contains("timed out"));
    }

    #[test]
    fn anonymous_transport_failure_drops_detail() {
        let failure = TransportFailure::other(
            "error sending request for url (http://10.0.0.5:11434/api/generate)",
        );
        let err = classify_upstream_failure(None, "", Some(&failure), ctx());
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert_eq!(err.user_message(), ANONYMOUS_TRANSPORT_MESSAGE);
        assert!(!err.user_message().contains("10.0.0.5"));
    }

    #[test]
    fn other_statuses_carry_status_and_body() {
        let err = classify_upstream_failure(Some(500), "out of memory", None, ctx());
        match err {
            DomainError::UpstreamStatus { status, ref body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "out of memory");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_wins_over_body_content() {
        assert_eq!(
            classify_kind(Some(404), None),
            ErrorKind::UpstreamNotFound
        );
        assert_eq!(classify_kind(Some(418), None), ErrorKind::UpstreamOther);
    }
}
