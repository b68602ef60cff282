mod utils;

use std::sync::Arc;

use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;
use utils::{ScoreAssertion, TestApp, TestSetupBuilder};

use ultiscore::session::repository::FileSnapshotStore;

#[tokio::test]
async fn test_betli_won_without_kontra() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let response = setup
        .declare(json!({ "declarer_id": 0, "game_type_id": 6, "won": true }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    let round = response.json();
    assert_eq!(round["round_number"], 1);
    assert_eq!(round["deltas"], json!({ "0": 10, "1": -5, "2": -5 }));

    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[10, -5, -5])
        .has_round_count(1)
        .is_led_by(Some(0))
        .rounds_are_consistent();
}

#[tokio::test]
async fn test_colorless_kontra_only_doubles_the_caller() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let response = setup
        .declare(json!({
            "declarer_id": 0,
            "game_type_id": 6,
            "won": true,
            "kontra_ids": [1]
        }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[15, -10, -5])
        .rounds_are_consistent();
}

#[tokio::test]
async fn test_four_players_colored_round_lost_with_kontra() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    let response = setup
        .declare(json!({
            "declarer_id": 0,
            "game_type_id": 2,
            "won": false,
            "kontra_ids": [1],
            "sitting_out_id": 3
        }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    let round = response.json();
    assert_eq!(round["deltas"]["3"], 0);
    assert_eq!(round["sitting_out_id"], 3);
    assert_eq!(round["kontra_ids"], json!([1]));

    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[-8, 4, 4, 0])
        .is_led_by(None)
        .has_standings(&[1, 2, 3, 0])
        .rounds_are_consistent();
}

#[tokio::test]
async fn test_undo_on_empty_ledger_is_a_conflict() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let response = setup.undo().await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(response.json()["error"].is_string());
    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[0, 0, 0])
        .has_round_count(0);
}

#[tokio::test]
async fn test_undo_restores_previous_scores() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;
    setup
        .declare(json!({ "declarer_id": 1, "game_type_id": 5, "won": true }))
        .await;
    let before = setup.session().await;

    let committed = setup
        .declare(json!({ "declarer_id": 2, "game_type_id": 7, "won": false, "kontra_ids": [0, 1] }))
        .await;
    assert_eq!(committed.status, StatusCode::CREATED, "{}", committed.text);

    let undone = setup.undo().await;
    assert_eq!(undone.status, StatusCode::OK);
    assert_eq!(undone.json(), committed.json());

    let after = setup.session().await;
    assert_eq!(after["players"], before["players"]);
    assert_eq!(after["rounds"], before["rounds"]);

    // the next round reuses the freed number
    let again = setup
        .declare(json!({ "declarer_id": 0, "game_type_id": 1, "won": true }))
        .await;
    assert_eq!(again.json()["round_number"], 2);
}

#[rstest]
#[case::unknown_game_type(json!({ "declarer_id": 0, "game_type_id": 40, "won": true }))]
#[case::declarer_outside_session(json!({ "declarer_id": 9, "game_type_id": 1, "won": true }))]
#[case::declarer_kontras_themselves(json!({ "declarer_id": 0, "game_type_id": 1, "won": true, "kontra_ids": [0] }))]
#[case::sitting_out_with_three_players(json!({ "declarer_id": 0, "game_type_id": 1, "won": true, "sitting_out_id": 2 }))]
#[tokio::test]
async fn test_invalid_declarations_are_rejected(#[case] declaration: serde_json::Value) {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let response = setup.declare(declaration).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text);
    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[0, 0, 0])
        .has_round_count(0);
}

#[tokio::test]
async fn test_manual_rounds() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    let response = setup
        .manual(json!({
            "deltas": { "0": 6, "1": -3, "2": -3, "3": 0 },
            "declarer_id": 0,
            "sitting_out_id": 3
        }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    assert_eq!(response.json()["declarer_id"], 0);

    let response = setup
        .manual(json!({ "loss": { "loser_id": 1, "amount": 7 }, "sitting_out_id": 0 }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    assert_eq!(response.json()["deltas"], json!({ "0": 0, "1": -7, "2": 4, "3": 3 }));

    let response = setup
        .manual(json!({ "deltas": { "0": 1, "1": 1, "2": -1, "3": 0 }, "sitting_out_id": 3 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[6, -10, 1, 3])
        .has_round_count(2)
        .rounds_are_consistent();
}

#[tokio::test]
async fn test_manual_round_cannot_overflow_scores() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    // wraps to zero in 32-bit arithmetic
    let response = setup
        .manual(json!({ "deltas": { "0": i32::MAX, "1": i32::MAX, "2": 2 } }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text);

    let big = json!({ "deltas": { "0": 2_000_000_000, "1": -2_000_000_000, "2": 0 } });
    let response = setup.manual(big.clone()).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    let response = setup.manual(big).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.text);

    ScoreAssertion::for_session(&setup)
        .await
        .has_scores(&[2_000_000_000, -2_000_000_000, 0])
        .has_round_count(1)
        .rounds_are_consistent();
}

#[tokio::test]
async fn test_export_downloads_csv() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;
    setup
        .declare(json!({ "declarer_id": 0, "game_type_id": 6, "won": true, "kontra_ids": [1, 2] }))
        .await;

    let response = setup.app.get(&setup.uri("/export")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.content_type.as_deref(),
        Some("text/csv; charset=utf-8")
    );
    let disposition = response.content_disposition.unwrap();
    assert!(disposition.starts_with("attachment; filename=\"ulti-"));
    assert!(disposition.ends_with(".csv\""));

    let lines: Vec<&str> = response.text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Round,Anna,Bence,Csaba,"));
    assert!(lines[1].starts_with("1,+20,-10,-10,Anna,betli,\"Bence, Csaba\""));
    assert!(lines[2].starts_with("Total,20,-10,-10"));
}

#[tokio::test]
async fn test_reset_and_start_again() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;
    setup
        .declare(json!({ "declarer_id": 0, "game_type_id": 1, "won": true }))
        .await;

    let response = setup
        .app
        .post(&setup.uri("/start"), json!({ "names": ["Eszter", "Feri", "Gabi"] }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = setup.app.post(&setup.uri("/reset"), json!({})).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.json()["started"], false);

    let response = setup
        .declare(json!({ "declarer_id": 0, "game_type_id": 1, "won": true }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = setup
        .app
        .post(
            &setup.uri("/start"),
            json!({ "names": ["Eszter", "Feri", "Gabi", "Hanna"] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let session = setup.session().await;
    assert_eq!(session["session_id"], setup.session_id.as_str());
    assert_eq!(session["players"][3]["name"], "Hanna");
    assert_eq!(session["players"][3]["id"], 3);
    assert_eq!(session["rounds"], json!([]));
}

#[tokio::test]
async fn test_unknown_session_routes_are_not_found() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    assert_eq!(
        setup.app.get("/sessions/missing").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        setup.app.delete("/sessions/missing/rounds/last").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        setup.app.get("/sessions/missing/export").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_deleted_session_is_gone_after_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = TestApp::new(Arc::new(FileSnapshotStore::new(dir.path())));
    let session_id = first.create_session(&["Anna", "Bence", "Csaba"]).await;
    let uri = format!("/sessions/{session_id}");

    assert_eq!(first.delete(&uri).await.status, StatusCode::NO_CONTENT);
    assert_eq!(first.delete(&uri).await.status, StatusCode::NOT_FOUND);
    assert!(!dir.path().join(format!("{session_id}.json")).exists());

    let second = TestApp::new(Arc::new(FileSnapshotStore::new(dir.path())));
    assert_eq!(second.get(&uri).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sessions_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = TestApp::new(Arc::new(FileSnapshotStore::new(dir.path())));
    let session_id = first.create_session(&["Anna", "Bence", "Csaba"]).await;
    let response = first
        .post(
            &format!("/sessions/{session_id}/rounds"),
            json!({ "declarer_id": 2, "game_type_id": 11, "won": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);

    let second = TestApp::new(Arc::new(FileSnapshotStore::new(dir.path())));
    let response = second.get(&format!("/sessions/{session_id}")).await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    let session = response.json();
    assert_eq!(session["players"][2]["score"], 20);
    assert_eq!(session["leader_id"], 2);
    assert_eq!(session["rounds"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_snapshot_reads_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let app = TestApp::new(Arc::new(FileSnapshotStore::new(dir.path())));
    let response = app.get("/sessions/broken").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_are_serialized() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let mut handles = Vec::new();
    for i in 0..12u32 {
        let app = setup.app.clone();
        let uri = setup.uri("/rounds");
        handles.push(tokio::spawn(async move {
            app.post(
                &uri,
                json!({ "declarer_id": i % 3, "game_type_id": 1 + i % 16, "won": i % 2 == 0 }),
            )
            .await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        numbers.push(response.json()["round_number"].as_u64().unwrap());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=12).collect::<Vec<u64>>());

    ScoreAssertion::for_session(&setup)
        .await
        .has_round_count(12)
        .rounds_are_consistent();
}
