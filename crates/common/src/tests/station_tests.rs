use super::*;

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use crate::{error::LookupError, models::LookupResponse};

struct FakeLookup {
    replies: Mutex<VecDeque<Result<LookupOutcome, LookupError>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn reply(self, reply: Result<LookupOutcome, LookupError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn found(self, size: &str, id: &str, code: &str) -> Self {
        self.reply(Ok(LookupOutcome::Found(ProductDetails::new(size, id, code))))
    }

    fn rejected(self, message: Option<&str>) -> Self {
        self.reply(Ok(LookupOutcome::Rejected(message.map(String::from))))
    }

    fn unreachable(self) -> Self {
        let source = serde_json::from_str::<LookupResponse>("<html>502</html>").unwrap_err();
        self.reply(Err(LookupError::Malformed {
            status: reqwest::StatusCode::BAD_GATEWAY,
            source,
        }))
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductLookup for FakeLookup {
    async fn search_code(&self, code: &str) -> Result<LookupOutcome, LookupError> {
        self.calls.lock().unwrap().push(code.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        reply.expect("unexpected lookup")
    }
}

#[tokio::test]
async fn rescanning_an_accepted_code_is_a_duplicate() {
    let lookup = FakeLookup::new()
        .found("M", "U1", "P-one")
        .found("L", "U2", "P-two");
    let mut station = ScanStation::default();

    station.submit(&lookup, "C1").await.expect("first lookup");
    let err = station.scan(&lookup, "C1").await.unwrap_err();
    assert_eq!(err, ScanError::Duplicate("C1".into()));
    assert_eq!(station.error(), Some("C1 already scanned"));
    assert_eq!(lookup.calls(), vec!["C1"]);

    // A different code still goes through.
    station.scan(&lookup, " C2 ").await.expect("second lookup");
    assert_eq!(lookup.calls(), vec!["C1", "C2"]);
}

#[tokio::test]
async fn blank_submissions_never_reach_the_service() {
    let lookup = FakeLookup::new();
    let mut station = ScanStation::default();

    for blank in ["", "   ", "\t\n"] {
        let err = station.submit(&lookup, blank).await.unwrap_err();
        assert_eq!(err, ScanError::EmptyInput);
        assert_eq!(station.error(), Some("Please enter or scan a QR code"));
    }

    station.on_input_changed("  ");
    assert!(!station.can_submit());
    assert_eq!(
        station.manual_submit(&lookup).await.unwrap_err(),
        ScanError::EmptyInput
    );
    assert!(lookup.calls().is_empty());
    assert!(!station.is_loading());
}

#[tokio::test]
async fn blank_scan_is_ignored() {
    let lookup = FakeLookup::new();
    let mut station = ScanStation::default();
    station.on_input_changed("typed");

    assert_eq!(station.scan(&lookup, "  \n").await, Ok(None));
    assert_eq!(station.input(), "typed");
    assert_eq!(station.error(), None);
    assert!(lookup.calls().is_empty());
}

#[tokio::test]
async fn successful_lookup_replaces_the_result() {
    let lookup = FakeLookup::new().found("S1", "U1", "P1");
    let mut station = ScanStation::default();

    let found = station.scan(&lookup, "P1").await.expect("lookup");
    let expected = ProductDetails::new("S1", "U1", "P1");
    assert_eq!(found, Some(expected.clone()));
    assert_eq!(station.result(), Some(&expected));
    assert_eq!(station.error(), None);
    assert_eq!(station.input(), "");
    assert_eq!(station.last_accepted(), Some("P1"));
    assert!(!station.is_loading());
}

#[tokio::test]
async fn rejection_clears_the_result_and_shows_the_server_message() {
    let lookup = FakeLookup::new()
        .found("S0", "U0", "P0")
        .rejected(Some("Not found"));
    let mut station = ScanStation::default();
    station.submit(&lookup, "P0").await.expect("lookup");

    station.on_input_changed("P1");
    let err = station.manual_submit(&lookup).await.unwrap_err();
    assert_eq!(
        err,
        ScanError::Rejected {
            code: "P1".into(),
            message: "Not found".into()
        }
    );
    assert_eq!(station.error(), Some("P1 Not found"));
    assert_eq!(station.result(), None);
    assert_eq!(station.input(), "");
    assert_eq!(station.last_accepted(), Some("P1"));
}

#[tokio::test]
async fn rejection_without_message_uses_the_default() {
    let lookup = FakeLookup::new().rejected(None).rejected(Some("  "));
    let mut station = ScanStation::default();

    station.submit(&lookup, "P1").await.unwrap_err();
    assert_eq!(station.error(), Some("P1 Error fetching data"));
    station.submit(&lookup, "P2").await.unwrap_err();
    assert_eq!(station.error(), Some("P2 Error fetching data"));
}

#[tokio::test]
async fn scanning_the_displayed_product_code_is_a_duplicate() {
    let lookup = FakeLookup::new().found("S1", "U1", "P9");
    let mut station = ScanStation::default();
    station.submit(&lookup, "QR-1").await.expect("lookup");

    let err = station.scan(&lookup, "P9").await.unwrap_err();
    assert_eq!(err, ScanError::Duplicate("P9".into()));
    assert_eq!(station.error(), Some("P9 already scanned"));
    assert_eq!(lookup.calls(), vec!["QR-1"]);
}

#[tokio::test]
async fn duplicate_does_not_replace_a_showing_error() {
    let lookup = FakeLookup::new().rejected(Some("Not found"));
    let mut station = ScanStation::default();
    station.submit(&lookup, "X1").await.unwrap_err();

    let err = station.scan(&lookup, "X1").await.unwrap_err();
    assert_eq!(err, ScanError::Duplicate("X1".into()));
    assert_eq!(station.error(), Some("X1 Not found"));
}

#[test]
fn loading_flag_spans_exactly_one_lookup() {
    let mut station = ScanStation::default();
    assert!(!station.is_loading());

    station.on_input_changed("P1");
    assert!(station.can_submit());
    let code = station.on_manual_submit().expect("gate open");
    assert!(station.is_loading());
    assert!(!station.can_submit());

    station
        .settle(
            &code,
            Ok::<_, LookupError>(LookupOutcome::Found(ProductDetails::new("S", "U", "P1"))),
        )
        .expect("found");
    assert!(!station.is_loading());
    assert!(!station.can_submit(), "input was cleared");
}

#[test]
fn second_submission_is_refused_while_loading() {
    let mut station = ScanStation::default();
    station.on_input_changed("A");
    let code = station.on_manual_submit().expect("gate open");

    assert_eq!(station.on_scan("B"), Err(ScanError::Busy));
    assert_eq!(station.input(), "A");
    assert_eq!(station.on_manual_submit(), Err(ScanError::Busy));
    assert_eq!(station.error(), None);
    assert!(station.is_loading());

    station
        .settle(&code, Ok::<_, LookupError>(LookupOutcome::Rejected(None)))
        .unwrap_err();
    assert_eq!(station.on_scan("B"), Ok(Some("B".to_string())));
    assert_eq!(station.input(), "B");
}

#[tokio::test]
async fn transport_failure_preserves_the_display_by_default() {
    let lookup = FakeLookup::new().found("S1", "U1", "P1").unreachable();
    let mut station = ScanStation::default();
    station.submit(&lookup, "P1").await.expect("lookup");

    station.on_input_changed("P2");
    let err = station.manual_submit(&lookup).await.unwrap_err();
    assert_eq!(err, ScanError::TransportFailure { code: "P2".into() });
    assert_eq!(station.result(), Some(&ProductDetails::new("S1", "U1", "P1")));
    assert_eq!(station.error(), None);
    assert_eq!(station.input(), "P2");
    assert_eq!(station.last_accepted(), Some("P1"));
    assert!(!station.is_loading());

    assert_eq!(station.notice(), Some("Something went wrong!"));
    station.acknowledge_notice();
    assert_eq!(station.notice(), None);
}

#[tokio::test]
async fn transport_failure_clears_the_display_when_configured() {
    let lookup = FakeLookup::new().found("S1", "U1", "P1").unreachable();
    let mut station = ScanStation::new(TransportFailurePolicy::Clear);
    station.submit(&lookup, "P1").await.expect("lookup");

    station.scan(&lookup, "P2").await.unwrap_err();
    assert_eq!(station.result(), None);
    assert_eq!(station.error(), Some("P2 Something went wrong!"));
    assert_eq!(station.notice(), Some("Something went wrong!"));
}

#[tokio::test]
async fn failed_request_does_not_mark_the_code_as_scanned() {
    let lookup = FakeLookup::new().unreachable().found("S1", "U1", "P1");
    let mut station = ScanStation::default();

    station.scan(&lookup, "P1").await.unwrap_err();
    assert_eq!(station.last_accepted(), None);
    station.scan(&lookup, "P1").await.expect("retry by rescanning");
    assert_eq!(lookup.calls(), vec!["P1", "P1"]);
}

#[test]
fn policy_parses_from_text() {
    assert_eq!(
        "Clear".parse::<TransportFailurePolicy>(),
        Ok(TransportFailurePolicy::Clear)
    );
    assert_eq!(
        " preserve ".parse::<TransportFailurePolicy>(),
        Ok(TransportFailurePolicy::Preserve)
    );
    assert!("reset".parse::<TransportFailurePolicy>().is_err());
}
