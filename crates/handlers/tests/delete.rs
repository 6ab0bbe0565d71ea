mod common;

use common::*;
use fleetmetric_core::OutcomeCode;
use fleetmetric_handlers::{DeleteHandler, Handler};
use fleetmetric_remote::{Call, Operation, RemoteError};

#[tokio::test]
async fn deletes_existing_resource() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[]));
    let handler = DeleteHandler::new(client(&fleet));

    let out = handler.handle_request(request(model())).await.unwrap();

    assert!(out.is_success());
    assert_eq!(out.resource_model, None);
    assert!(fleet.metric(METRIC_NAME).is_none());
    assert_eq!(
        fleet.calls(),
        vec![
            Call::DescribeFleetMetric { metric_name: METRIC_NAME.to_string() },
            Call::DeleteFleetMetric { metric_name: METRIC_NAME.to_string() },
        ]
    );
}

#[tokio::test]
async fn missing_resource_is_not_found_without_delete_call() {
    let fleet = fleet();
    let handler = DeleteHandler::new(client(&fleet));

    let out = handler.handle_request(request(model())).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::NotFound));
    assert_eq!(fleet.count(Operation::DeleteFleetMetric), 0);
}

#[tokio::test]
async fn malformed_name_is_remapped_to_not_found() {
    let fleet = fleet();
    let handler = DeleteHandler::new(client(&fleet));
    let mut m = model();
    m.metric_name = Some("not a valid name!".to_string());

    let out = handler.handle_request(request(m)).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::NotFound));
    assert_eq!(out.message, None);
    assert_eq!(fleet.count(Operation::DeleteFleetMetric), 0);
}

#[tokio::test]
async fn delete_not_found_after_describe_converges() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[]));
    fleet.inject(Operation::DeleteFleetMetric, RemoteError::not_found("deleted concurrently"));
    let handler = DeleteHandler::new(client(&fleet));

    let out = handler.handle_request(request(model())).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::NotFound));
    assert_eq!(out.message.as_deref(), Some("deleted concurrently"));
}

#[tokio::test]
async fn describe_throttling_is_retryable() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[]));
    fleet.inject(Operation::DescribeFleetMetric, RemoteError::throttling("Rate exceeded"));
    let handler = DeleteHandler::new(client(&fleet));

    let out = handler.handle_request(request(model())).await.unwrap();

    let code = out.error_code.unwrap();
    assert_eq!(code, OutcomeCode::Throttling);
    assert!(code.is_retryable());
    assert!(fleet.metric(METRIC_NAME).is_some());
}
