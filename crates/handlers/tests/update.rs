mod common;

use common::*;
use fleetmetric_core::{OperationStatus, OutcomeCode};
use fleetmetric_handlers::{Handler, UpdateHandler};
use fleetmetric_remote::{Call, Operation, RemoteError, RemoteTag};

#[tokio::test]
async fn updates_fields_and_reconciles_tags() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[("PreviousTagKey", "PreviousTagValue"), (STACK_TAG_KEY, "UnitTestStack")]));
    let handler = UpdateHandler::new(client(&fleet));
    let mut desired = model();
    desired.description = Some("new description".to_string());
    let mut req = request(desired.clone())
        .with_desired_tags(map(&[("DesiredTagKey", "DesiredTagValue")]))
        .with_system_tags(system_tags());
    req.previous_resource_tags = Some(map(&[("doesn't", "matter")]));

    let out = handler.handle_request(req).await.unwrap();

    assert_eq!(out.status, OperationStatus::Success);
    assert_eq!(out.message, None);
    let m = out.resource_model.unwrap();
    assert_eq!(m.description, desired.description);
    assert_eq!(m.metric_arn.as_deref(), Some(METRIC_ARN));

    assert_eq!(
        fleet.calls(),
        vec![
            Call::UpdateFleetMetric { metric_name: METRIC_NAME.to_string() },
            Call::DescribeFleetMetric { metric_name: METRIC_NAME.to_string() },
            Call::ListTagsForResource { resource_arn: METRIC_ARN.to_string(), next_token: None },
            Call::TagResource {
                resource_arn: METRIC_ARN.to_string(),
                tags: vec![RemoteTag::new("DesiredTagKey", "DesiredTagValue")],
            },
            Call::UntagResource { resource_arn: METRIC_ARN.to_string(), tag_keys: vec!["PreviousTagKey".to_string()] },
        ]
    );
    let after = fleet.metric(METRIC_NAME).unwrap();
    assert_eq!(after.version, 2);
    assert_eq!(after.spec.description.as_deref(), Some("new description"));
    assert_eq!(after.tags.keys().map(String::as_str).collect::<Vec<_>>(), vec!["DesiredTagKey", STACK_TAG_KEY]);
}

#[tokio::test]
async fn same_key_different_value_only_tags() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[("DesiredTagKey", "PreviousTagValue"), (STACK_TAG_KEY, "UnitTestStack")]));
    let handler = UpdateHandler::new(client(&fleet));
    let req = request(model()).with_desired_tags(map(&[("DesiredTagKey", "DesiredTagValue")])).with_system_tags(system_tags());

    handler.handle_request(req).await.unwrap();

    assert_eq!(fleet.count(Operation::TagResource), 1);
    assert_eq!(fleet.count(Operation::UntagResource), 0);
}

#[tokio::test]
async fn no_desired_tags_only_untags() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[("PreviousTagKey", "PreviousTagValue"), (STACK_TAG_KEY, "UnitTestStack")]));
    let handler = UpdateHandler::new(client(&fleet));
    let req = request(model()).with_desired_tags(map(&[])).with_system_tags(system_tags());

    handler.handle_request(req).await.unwrap();

    assert_eq!(fleet.count(Operation::TagResource), 0);
    assert_eq!(
        fleet.calls().last(),
        Some(&Call::UntagResource { resource_arn: METRIC_ARN.to_string(), tag_keys: vec!["PreviousTagKey".to_string()] })
    );
}

#[tokio::test]
async fn matching_tags_issue_no_tag_calls() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[("team", "iot"), (STACK_TAG_KEY, "UnitTestStack")]));
    let handler = UpdateHandler::new(client(&fleet));
    let req = request(model()).with_desired_tags(map(&[("team", "iot")])).with_system_tags(system_tags());

    let out = handler.handle_request(req).await.unwrap();

    assert!(out.is_success());
    assert_eq!(fleet.count(Operation::TagResource) + fleet.count(Operation::UntagResource), 0);
}

#[tokio::test]
async fn drifted_tags_are_removed_despite_previous_state() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[("team", "iot")]));
    fleet.set_tags_out_of_band(METRIC_NAME, &[("added-by-hand", "x")]);
    let handler = UpdateHandler::new(client(&fleet));
    let mut req = request(model()).with_desired_tags(map(&[("team", "iot")])).with_system_tags(system_tags());
    // the orchestrator's cache does not know about the drifted tag
    req.previous_resource_tags = Some(map(&[("team", "iot")]));

    handler.handle_request(req).await.unwrap();

    assert!(!fleet.metric(METRIC_NAME).unwrap().tags.contains_key("added-by-hand"));
}

#[tokio::test]
async fn caller_arn_is_ignored_not_rejected() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[]));
    let handler = UpdateHandler::new(client(&fleet));
    let mut desired = model();
    desired.metric_arn = Some("arn:aws:iot:us-east-1:123456789012:fleetmetric/Stale".to_string());

    let out = handler.handle_request(request(desired)).await.unwrap();

    assert!(out.is_success());
    assert_eq!(out.resource_model.unwrap().metric_arn.as_deref(), Some(METRIC_ARN));
}

#[tokio::test]
async fn deleted_resource_short_circuits_as_not_found() {
    let fleet = fleet();
    let handler = UpdateHandler::new(client(&fleet));

    let out = handler.handle_request(request(model())).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::NotFound));
    assert_eq!(fleet.calls(), vec![Call::UpdateFleetMetric { metric_name: METRIC_NAME.to_string() }]);
}

#[tokio::test]
async fn update_invalid_request_is_classified() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[]));
    fleet.inject(Operation::UpdateFleetMetric, RemoteError::invalid_request("bad"));
    let handler = UpdateHandler::new(client(&fleet));

    let out = handler.handle_request(request(model())).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::InvalidRequest));
    assert_eq!(fleet.count(Operation::DescribeFleetMetric), 0);
}

#[tokio::test]
async fn tag_call_failure_aborts_remaining_steps() {
    let fleet = fleet();
    fleet.seed(stored(METRIC_NAME, &[("old", "x")]));
    fleet.inject(Operation::TagResource, RemoteError::limit_exceeded("too many tags"));
    let handler = UpdateHandler::new(client(&fleet));
    let req = request(model()).with_desired_tags(map(&[("new", "y")])).with_system_tags(system_tags());

    let out = handler.handle_request(req).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::ServiceLimitExceeded));
    assert_eq!(fleet.count(Operation::UntagResource), 0);
    // the field update already went through
    assert_eq!(fleet.metric(METRIC_NAME).unwrap().version, 2);
}
