//! Port error constructors and mock wiring.

use super::*;
use crate::domain::{HistoryEntry, UserId};
use rstest::rstest;
use uuid::Uuid;

#[rstest]
#[case(UserPersistenceError::connection("refused"), "user repository connection failed: refused")]
#[case(UserPersistenceError::query("syntax"), "user repository query failed: syntax")]
#[case(UserPersistenceError::duplicate_email(), "email is already registered")]
#[case(UserPersistenceError::duplicate_username(), "username is already taken")]
fn user_errors_render_their_cause(#[case] error: UserPersistenceError, #[case] expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[rstest]
fn history_error_constructors_accept_owned_and_borrowed_text() {
    let borrowed = HistoryPersistenceError::query("timeout");
    let owned = HistoryPersistenceError::query(String::from("timeout"));
    assert_eq!(borrowed, owned);
    assert_eq!(
        HistoryPersistenceError::connection("reset").to_string(),
        "history repository connection failed: reset"
    );
}

#[rstest]
#[tokio::test]
async fn history_mock_reports_failures_through_the_port() {
    let mut repo = MockHistoryRepository::new();
    repo.expect_list_for()
        .times(1)
        .returning(|_| Err(HistoryPersistenceError::connection("down")));
    repo.expect_append().times(0);

    let port: &dyn HistoryRepository = &repo;
    let result: Result<Vec<HistoryEntry>, _> =
        port.list_for(&UserId::from_uuid(Uuid::nil())).await;
    assert_eq!(result, Err(HistoryPersistenceError::connection("down")));
}
