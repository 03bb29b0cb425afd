//! Failing records and streams must not change the store.

use dynsec_acl::EntityStore;
use dynsec_core::{Error, LoadOptions};
use dynsec_yaml::{load, load_str, Event};

use crate::common::{failing_after, load as load_yaml, snapshot};

const BASE: &str = r#"
groups:
  - groupname: staff
    clients:
      - username: alice
        priority: 3
"#;

#[test]
fn test_missing_groupname_changes_nothing() {
    let mut store = load_yaml(BASE);
    let before = snapshot(&store);

    let err = load_str(
        &mut store,
        r#"
groups:
  - textname: Nameless
    clients:
      - username: alice
        priority: 8
      - username: mallory
"#,
        &LoadOptions::default(),
    )
    .unwrap_err();

    assert!(err.is_record_local());
    assert_eq!(snapshot(&store), before);
    assert!(store.find_client("mallory").is_none());
}

#[test]
fn test_partial_mode_keeps_earlier_records() {
    let mut store = EntityStore::new();
    let err = load_str(
        &mut store,
        r#"
groups:
  - groupname: first
    clients:
      - username: a
  - groupname: second
    clients:
      - priority: 4
"#,
        &LoadOptions::default(),
    )
    .unwrap_err();

    assert!(err.is_record_local());
    assert!(store.find_group("first").is_some());
    assert!(store.find_group("second").is_none());
    store.check_links().unwrap();
}

#[test]
fn test_atomic_mode_rolls_back_whole_document() {
    let mut store = load_yaml(BASE);
    let before = snapshot(&store);

    let err = load_str(
        &mut store,
        r#"
clients:
  - username: alice
    textname: Changed
groups:
  - groupname: first
    clients:
      - username: alice
        priority: 1
  - groupname: second
    roles:
      - rolename: r
        priority: high
"#,
        &LoadOptions::atomic(),
    )
    .unwrap_err();

    assert!(err.is_record_local());
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_atomic_mode_applies_on_success() {
    let mut store = load_yaml(BASE);
    load_str(
        &mut store,
        "groups:\n  - groupname: extra\n",
        &LoadOptions::atomic(),
    )
    .unwrap();
    assert!(store.find_group("extra").is_some());
    assert!(store.find_group("staff").is_some());
}

#[test]
fn test_reader_failure_mid_record_releases_buffers() {
    let mut store = load_yaml(BASE);
    let before = snapshot(&store);

    // A record for a new group, cut off inside its clients list after a
    // textname and one complete member have been buffered.
    let events = vec![
        Event::MappingStart,
        Event::str("groups"),
        Event::SequenceStart,
        Event::MappingStart,
        Event::str("groupname"),
        Event::str("intruders"),
        Event::str("textname"),
        Event::str("Intruders"),
        Event::str("clients"),
        Event::SequenceStart,
        Event::MappingStart,
        Event::str("username"),
        Event::str("alice"),
        Event::str("priority"),
        Event::int(99),
        Event::MappingEnd,
        Event::MappingStart,
        Event::str("username"),
        Event::str("bob"),
    ];
    let mut reader = failing_after(events);
    let err = load(&mut reader, &mut store, &LoadOptions::default()).unwrap_err();

    assert!(matches!(err, Error::Stream { .. }));
    assert_eq!(snapshot(&store), before);
    assert!(store.find_group("intruders").is_none());
    assert!(store.find_client("bob").is_none());

    let alice = store.find_client("alice").unwrap();
    assert_eq!(store.client(alice).unwrap().grouplist().len(), 1);
}

#[test]
fn test_truncated_stream() {
    let mut store = EntityStore::new();
    let events = vec![
        Event::MappingStart,
        Event::str("groups"),
        Event::SequenceStart,
        Event::MappingStart,
        Event::str("groupname"),
        Event::str("g"),
    ];
    let mut reader = events.into_iter().map(Ok);
    let err = load(&mut reader, &mut store, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Stream { .. }));
    assert_eq!(store.group_count(), 0);
}

#[test]
fn test_malformed_yaml() {
    let mut store = load_yaml(BASE);
    let before = snapshot(&store);
    let err = load_str(
        &mut store,
        "groups:\n  - groupname: [unclosed\n",
        &LoadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Stream { .. }));
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_roles_must_be_a_sequence() {
    let mut store = EntityStore::new();
    let err = load_str(
        &mut store,
        "groups:\n  - groupname: g\n    roles: admin\n",
        &LoadOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_record_local());
    assert_eq!(store.group_count(), 0);
    assert_eq!(store.role_count(), 0);
}
