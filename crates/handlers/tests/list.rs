mod common;

use std::sync::Arc;

use common::*;
use fleetmetric_core::{OutcomeCode, ResourceModel};
use fleetmetric_handlers::{Handler, ListHandler};
use fleetmetric_remote::{InMemoryFleet, Operation, RemoteError};

#[tokio::test]
async fn lists_identity_only_descriptors_page_by_page() {
    let fleet = Arc::new(InMemoryFleet::new().with_page_sizes(25, 2));
    for name in ["m1", "m2", "m3"] {
        fleet.seed(stored(name, &[("team", "iot")]));
    }
    let handler = ListHandler::new(client(&fleet));

    let first = handler.handle_request(request(ResourceModel::default())).await.unwrap();
    assert!(first.is_success());
    let models = first.resource_models.unwrap();
    assert_eq!(models, vec![
        ResourceModel::identity("m1", fleet.arn_for("m1")),
        ResourceModel::identity("m2", fleet.arn_for("m2")),
    ]);
    assert!(models.iter().all(|m| m.tags.is_none() && m.query_string.is_none()));
    let token = first.next_token.clone();
    assert_eq!(token.as_deref(), Some("2"));

    let second = handler.handle_request(request(ResourceModel::default()).with_next_token(token)).await.unwrap();
    assert_eq!(second.resource_models.unwrap(), vec![ResourceModel::identity("m3", fleet.arn_for("m3"))]);
    assert_eq!(second.next_token, None);
    assert_eq!(fleet.count(Operation::ListTagsForResource), 0);
}

#[tokio::test]
async fn empty_fleet_lists_nothing() {
    let fleet = fleet();
    let handler = ListHandler::new(client(&fleet));

    let out = handler.handle_request(request(ResourceModel::default())).await.unwrap();

    assert_eq!(out.resource_models, Some(vec![]));
    assert_eq!(out.next_token, None);
}

#[tokio::test]
async fn list_failure_is_classified() {
    let fleet = fleet();
    fleet.inject(Operation::ListFleetMetrics, RemoteError::throttling("Rate exceeded"));
    let handler = ListHandler::new(client(&fleet));

    let out = handler.handle_request(request(ResourceModel::default())).await.unwrap();

    assert_eq!(out.error_code, Some(OutcomeCode::Throttling));
}
