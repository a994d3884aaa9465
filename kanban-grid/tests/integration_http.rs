//! Router driving the REST gateway against a mock service

use kanban_grid::{
    ActionOutcome, BoardConfig, Cell, ColumnId, DragEvent, DragKind, DropRouter, DropTarget,
    TaskId, TransferData,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_board(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/columns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "todo", "name": "To Do", "position": 0, "wipLimit": 0},
            {"id": "doing", "name": "Doing", "position": 1, "wipLimit": 1}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "lane", "name": "Lane", "position": 0}
        ])))
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> BoardConfig {
    BoardConfig {
        api_base_url: format!("{}/api/", server.uri()),
        retry_attempts: 2,
        actor: Some("http-tester".into()),
        ..BoardConfig::default()
    }
}

#[test_log::test(tokio::test)]
async fn test_move_over_http_reconciles_from_service() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "One", "columnId": "todo", "rowId": "lane", "position": 0, "labels": ["ui"], "userIds": []}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "One", "columnId": "doing", "rowId": "lane", "position": 0, "labels": ["ui"], "userIds": []}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/t1/column"))
        .and(body_json(json!({"columnId": "doing"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"id": "t1", "title": "One", "columnId": "doing", "rowId": "lane", "position": 0}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let router = DropRouter::connect(&config(&server)).unwrap();
    router.load().await.unwrap();

    let mut event = DragEvent::new(TransferData::new());
    router
        .handle_drag_start(&mut event, "t1", DragKind::Task, Some("todo".into()), Some("lane".into()))
        .await
        .unwrap();
    let outcome = router
        .handle_drop(&mut event, DropTarget::Cell(Cell::at("doing", "lane")))
        .await;
    router.handle_drag_end().await;

    assert!(outcome.is_applied(), "{outcome:?}");
    let model = router.context().model().await;
    let task = model.task(&TaskId::from("t1")).unwrap();
    assert_eq!(task.column_id, ColumnId::from("doing"));
    assert!(task.labels.contains("ui"));
    assert_eq!(model.column_occupancy(&ColumnId::from("doing")), Some(1));
    assert!(!model.is_column_over_limit(&ColumnId::from("doing")));
    drop(model);

    let activity = router.context().read_activity(None).await;
    assert_eq!(activity[0].actor.as_deref(), Some("http-tester"));
}

#[tokio::test]
async fn test_service_rejection_becomes_notice() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "One", "columnId": "todo", "rowId": "lane", "position": 0}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/t1/column"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Doing is frozen for the release"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let router = DropRouter::connect(&config(&server)).unwrap();
    router.load().await.unwrap();
    let before = router.context().snapshot().await;

    let mut event = DragEvent::new(TransferData::new().with("taskId", "t1"));
    let outcome = router
        .handle_drop(&mut event, DropTarget::Cell(Cell::at("doing", "lane")))
        .await;

    let ActionOutcome::Failed { message, .. } = outcome else {
        panic!("expected the move to fail");
    };
    assert_eq!(message, "Doing is frozen for the release");
    assert_eq!(router.context().snapshot().await, before);
    assert_eq!(router.context().notices().await.len(), 1);
}

#[tokio::test]
async fn test_load_retries_flaky_fetch() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let router = DropRouter::connect(&config(&server)).unwrap();
    router.load().await.unwrap();

    assert_eq!(router.context().model().await.columns().len(), 2);
}

#[tokio::test]
async fn test_empty_success_response_still_applies_move() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "One", "columnId": "todo", "rowId": "lane", "position": 0}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "One", "columnId": "doing", "rowId": "lane", "position": 0}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/t1/column"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let router = DropRouter::connect(&config(&server)).unwrap();
    router.load().await.unwrap();

    let mut event = DragEvent::new(TransferData::new().with("taskId", "t1"));
    let outcome = router
        .handle_drop(&mut event, DropTarget::Cell(Cell::at("doing", "lane")))
        .await;

    assert!(outcome.is_applied(), "{outcome:?}");
    assert!(router.context().notices().await.is_empty());
    let model = router.context().model().await;
    assert_eq!(
        model.task(&TaskId::from("t1")).unwrap().column_id,
        ColumnId::from("doing")
    );
}
