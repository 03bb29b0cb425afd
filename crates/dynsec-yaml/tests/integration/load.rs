//! Document loading through the YAML adapter.

use dynsec_acl::{Entity, EntityStore, DEFAULT_PRIORITY};
use dynsec_core::{Error, Limits, LoadOptions};
use dynsec_yaml::load_str;
use std::io::Write;

use crate::common::{load, snapshot};

#[test]
fn test_admins_scenario() {
    let store = load(
        r#"
groups:
  - groupname: admins
    clients:
      - username: alice
        priority: 10
      - username: bob
        priority: 5
"#,
    );

    let admins = store.find_group("admins").unwrap();
    let alice = store.find_client("alice").unwrap();
    let bob = store.find_client("bob").unwrap();

    let group = store.group(admins).unwrap();
    let members: Vec<_> = group
        .clientlist()
        .iter()
        .map(|a| (a.target, a.priority))
        .collect();
    assert_eq!(members, vec![(alice, 10), (bob, 5)]);

    assert_eq!(store.client(alice).unwrap().grouplist().priority(&admins), Some(10));
    assert_eq!(store.client(bob).unwrap().grouplist().priority(&admins), Some(5));
}

#[test]
fn test_full_document() {
    let store = load(
        r##"
clients:
  - username: alice
    textname: Alice
    password: aGFzaA==
    salt: c2FsdA==
    iterations: 101
roles:
  - rolename: admin
    textdescription: Full access
    acls:
      - acltype: publishClientSend
        topic: "#"
        allow: true
groups:
  - groupname: admins
    textname: Administrators
    roles:
      - rolename: admin
        priority: 1
    clients:
      - username: alice
        priority: 10
  - groupname: guests
anonymousGroup: guests
"##,
    );

    assert_eq!(store.group_count(), 2);
    assert_eq!(store.role_count(), 1);
    assert_eq!(store.client_count(), 1);

    let snap = snapshot(&store);
    assert_eq!(snap.anonymous_group.as_deref(), Some("guests"));
    assert_eq!(snap.clients["alice"].text_name.as_deref(), Some("Alice"));
    assert_eq!(
        snap.roles["admin"].text_description.as_deref(),
        Some("Full access")
    );
    assert!(snap.roles["admin"].links.contains(&("admins".to_string(), 1)));
    assert_eq!(
        snap.groups["admins"].text_name.as_deref(),
        Some("Administrators")
    );
}

#[test]
fn test_member_defaults_and_text_priority() {
    let store = load(
        r#"
groups:
  - groupname: g
    roles:
      - rolename: r1
      - rolename: r2
        priority: "7"
"#,
    );
    let g = store.find_group("g").unwrap();
    let group = store.group(g).unwrap();
    let r1 = store.find_role("r1").unwrap();
    let r2 = store.find_role("r2").unwrap();
    assert_eq!(group.rolelist().priority(&r1), Some(DEFAULT_PRIORITY));
    assert_eq!(group.rolelist().priority(&r2), Some(7));
}

#[test]
fn test_keys_match_case_insensitively() {
    let store = load(
        r#"
Groups:
  - GroupName: g
    TextName: G
    Clients:
      - UserName: u
        Priority: 2
AnonymousGroup: g
"#,
    );
    let g = store.find_group("g").unwrap();
    assert_eq!(store.anonymous_group(), Some(g));
    assert_eq!(store.group(g).unwrap().text_name(), Some("G"));
    assert!(store.find_client("u").is_some());
}

#[test]
fn test_names_are_case_sensitive() {
    let store = load(
        r#"
groups:
  - groupname: Admins
  - groupname: admins
"#,
    );
    assert_eq!(store.group_count(), 2);
}

#[test]
fn test_numeric_looking_names_keep_their_text() {
    let store = load(
        r#"
clients:
  - username: 0x1F
    textname: 1e3
groups:
  - groupname: 007
    textname: true
    roles:
      - rolename: 1.50
    clients:
      - username: 0x1F
        priority: 1
"#,
    );

    let group = store.find_group("007").unwrap();
    let client = store.find_client("0x1F").unwrap();
    let role = store.find_role("1.50").unwrap();
    assert!(store.find_group("7").is_none());
    assert!(store.find_client("31").is_none());

    assert_eq!(store.group(group).unwrap().text_name(), Some("true"));
    assert_eq!(store.client(client).unwrap().text_name(), Some("1e3"));
    assert_eq!(store.group(group).unwrap().clientlist().priority(&client), Some(1));
    assert!(store.group(group).unwrap().rolelist().contains(&role));

    let saved = dynsec_yaml::save_string(&store).unwrap();
    let reloaded = load(&saved);
    assert_eq!(snapshot(&reloaded), snapshot(&store));
}

#[test]
fn test_repeated_text_keys_last_wins() {
    let store = load(
        r#"
groups:
  - groupname: g
    textname: first
    textdescription: one
    textname: second
    textdescription: two
"#,
    );
    let g = store.find_group("g").unwrap();
    let group = store.group(g).unwrap();
    assert_eq!(group.text_name(), Some("second"));
    assert_eq!(group.text_description(), Some("two"));
}

#[test]
fn test_unknown_key_tolerated() {
    let store = load(
        r#"
groups:
  - groupname: viewers
    colour: blue
    extra:
      nested: [1, 2, 3]
    clients:
      - username: carol
"#,
    );
    let viewers = store.find_group("viewers").unwrap();
    let carol = store.find_client("carol").unwrap();
    assert!(store.group(viewers).unwrap().clientlist().contains(&carol));
}

#[test]
fn test_reload_merges_into_existing_store() {
    let mut store = load(
        r#"
groups:
  - groupname: g
    clients:
      - username: a
        priority: 1
"#,
    );
    load_str(
        &mut store,
        r#"
groups:
  - groupname: g
    clients:
      - username: a
        priority: 9
      - username: b
"#,
        &LoadOptions::default(),
    )
    .unwrap();
    store.check_links().unwrap();

    let g = store.find_group("g").unwrap();
    let a = store.find_client("a").unwrap();
    let group = store.group(g).unwrap();
    assert_eq!(group.clientlist().len(), 2);
    assert_eq!(group.clientlist().priority(&a), Some(9));
    assert_eq!(store.client(a).unwrap().grouplist().priority(&g), Some(9));
}

#[test]
fn test_capacity_exhausted_leaves_store_unchanged() {
    let limits = Limits {
        max_clients: 2,
        ..Limits::default()
    };
    let mut store = EntityStore::with_limits(limits);
    load_str(
        &mut store,
        "groups:\n  - groupname: first\n    clients:\n      - username: a\n",
        &LoadOptions::default(),
    )
    .unwrap();
    let before = snapshot(&store);

    let err = load_str(
        &mut store,
        r#"
groups:
  - groupname: second
    textname: Second
    clients:
      - username: a
      - username: b
      - username: c
"#,
        &LoadOptions::default(),
    )
    .unwrap_err();

    let Error::InvalidRecord { source, .. } = err else {
        panic!("Expected InvalidRecord");
    };
    assert!(matches!(
        source.as_deref(),
        Some(Error::OutOfMemory { kind: "client", limit: 2 })
    ));
    assert_eq!(snapshot(&store), before);
    store.check_links().unwrap();
}

#[test]
fn test_load_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "groups:\n  - groupname: from-file").unwrap();

    let mut store = EntityStore::new();
    let report = dynsec_yaml::load_file(&mut store, file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(report.groups, 1);
    assert!(store.find_group("from-file").is_some());
}
