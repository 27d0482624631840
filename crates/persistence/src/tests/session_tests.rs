// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_persistence, create_test_user};
use crate::{Persistence, PersistenceError, SessionData};

#[test]
fn test_create_and_lookup_session() {
    let mut persistence: Persistence = create_test_persistence();
    let user_id: i64 = create_test_user(&mut persistence, "a@mutlukent.com", "admin", None);

    let session_id: i64 = persistence
        .create_session("abc", user_id, "2099-01-01T00:00:00.000000000Z")
        .unwrap();
    persistence.update_session_activity(session_id).unwrap();

    let session: SessionData = persistence.get_session_by_token("abc").unwrap().unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.user_id, user_id);

    persistence.delete_session("abc").unwrap();
    assert!(persistence.get_session_by_token("abc").unwrap().is_none());
}

#[test]
fn test_duplicate_token_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let user_id: i64 = create_test_user(&mut persistence, "a@mutlukent.com", "admin", None);
    persistence
        .create_session("abc", user_id, "2099-01-01T00:00:00.000000000Z")
        .unwrap();
    let result: Result<i64, PersistenceError> =
        persistence.create_session("abc", user_id, "2099-01-01T00:00:00.000000000Z");
    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_expired_sessions_are_purged() {
    let mut persistence: Persistence = create_test_persistence();
    let user_id: i64 = create_test_user(&mut persistence, "a@mutlukent.com", "admin", None);
    persistence
        .create_session("old", user_id, "2026-01-01T00:00:00.000000000Z")
        .unwrap();
    persistence
        .create_session("new", user_id, "2026-12-01T00:00:00.000000000Z")
        .unwrap();

    let purged: usize = persistence
        .delete_expired_sessions("2026-06-01T00:00:00.000000000Z")
        .unwrap();
    assert_eq!(purged, 1);
    assert!(persistence.get_session_by_token("old").unwrap().is_none());
    assert!(persistence.get_session_by_token("new").unwrap().is_some());
}

#[test]
fn test_sessions_revoked_per_user() {
    let mut persistence: Persistence = create_test_persistence();
    let user_id: i64 = create_test_user(&mut persistence, "a@mutlukent.com", "admin", None);
    persistence
        .create_session("one", user_id, "2099-01-01T00:00:00.000000000Z")
        .unwrap();
    persistence
        .create_session("two", user_id, "2099-01-01T00:00:00.000000000Z")
        .unwrap();

    assert_eq!(persistence.count_sessions_for_user(user_id).unwrap(), 2);
    assert_eq!(persistence.delete_sessions_for_user(user_id).unwrap(), 2);
    assert_eq!(persistence.count_sessions_for_user(user_id).unwrap(), 0);
}
