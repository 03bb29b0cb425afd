//! `load(save(store))` reproduces the store.

use dynsec_acl::{Entity, EntityStore};
use dynsec_core::LoadOptions;
use dynsec_yaml::{load_str, save_string};
use proptest::prelude::*;

use crate::common::{load, snapshot};

fn reload(store: &EntityStore) -> EntityStore {
    let text = save_string(store).unwrap();
    let mut copy = EntityStore::new();
    load_str(&mut copy, &text, &LoadOptions::default()).unwrap();
    copy.check_links().unwrap();
    copy
}

#[test]
fn test_roundtrip_document() {
    let store = load(
        r#"
clients:
  - username: alice
    textname: Alice
    textdescription: On call
  - username: "123"
roles:
  - rolename: admin
groups:
  - groupname: admins
    textname: Administrators
    roles:
      - rolename: admin
        priority: 1
    clients:
      - username: alice
        priority: 10
      - username: "123"
        priority: -4
  - groupname: guests
    textdescription: Unauthenticated clients
anonymousGroup: guests
"#,
    );

    let copy = reload(&store);
    assert_eq!(snapshot(&copy), snapshot(&store));
    assert!(copy.find_client("123").is_some());
}

#[test]
fn test_saved_output_is_stable() {
    let store = load("groups:\n  - groupname: g\n    roles:\n      - rolename: r\n");
    let first = save_string(&store).unwrap();
    let second = save_string(&reload(&store)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_save_omits_empty_display_fields() {
    let mut store = EntityStore::new();
    let g = store.find_or_create_group("plain").unwrap();
    store.group_mut(g).unwrap().set_text(Some(String::new()), None);

    let text = save_string(&store).unwrap();
    assert!(!text.contains("textname"));
    assert!(!text.contains("textdescription"));
    assert!(!text.contains("anonymousGroup"));
}

// ----------------------------------------------------------------------------
// Property: arbitrary stores survive a round trip
// ----------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    LinkRole(u8, u8, i64),
    LinkClient(u8, u8, i64),
    GroupText(u8, Option<String>, Option<String>),
    RoleText(u8, Option<String>),
    ClientText(u8, Option<String>),
    Anonymous(u8),
    RemoveClient(u8),
}

fn text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Z][a-z]{1,6} [a-z]{1,6}")
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..5u8, 0..5u8, -100..100i64).prop_map(|(g, r, p)| Op::LinkRole(g, r, p)),
        4 => (0..5u8, 0..6u8, -100..100i64).prop_map(|(g, c, p)| Op::LinkClient(g, c, p)),
        2 => (0..5u8, text(), text()).prop_map(|(g, n, d)| Op::GroupText(g, n, d)),
        1 => (0..5u8, text()).prop_map(|(r, n)| Op::RoleText(r, n)),
        1 => (0..6u8, text()).prop_map(|(c, n)| Op::ClientText(c, n)),
        1 => (0..5u8).prop_map(Op::Anonymous),
        1 => (0..6u8).prop_map(Op::RemoveClient),
    ]
}

fn build(ops: &[Op]) -> EntityStore {
    let mut store = EntityStore::new();
    for op in ops {
        match op {
            Op::LinkRole(g, r, p) => {
                let g = store.find_or_create_group(&format!("group-{g}")).unwrap();
                let r = store.find_or_create_role(&format!("role-{r}")).unwrap();
                store.link_group_role(g, r, *p).unwrap();
            }
            Op::LinkClient(g, c, p) => {
                let g = store.find_or_create_group(&format!("group-{g}")).unwrap();
                let c = store.find_or_create_client(&format!("client-{c}")).unwrap();
                store.link_group_client(g, c, *p).unwrap();
            }
            Op::GroupText(g, n, d) => {
                let g = store.find_or_create_group(&format!("group-{g}")).unwrap();
                store.group_mut(g).unwrap().set_text(n.clone(), d.clone());
            }
            Op::RoleText(r, n) => {
                let r = store.find_or_create_role(&format!("role-{r}")).unwrap();
                store.role_mut(r).unwrap().set_text(n.clone(), None);
            }
            Op::ClientText(c, n) => {
                let c = store.find_or_create_client(&format!("client-{c}")).unwrap();
                store.client_mut(c).unwrap().set_text(None, n.clone());
            }
            Op::Anonymous(g) => {
                let g = store.find_or_create_group(&format!("group-{g}")).unwrap();
                store.set_anonymous_group(Some(g)).unwrap();
            }
            Op::RemoveClient(c) => {
                if let Some(c) = store.find_client(&format!("client-{c}")) {
                    store.remove_client(c);
                }
            }
        }
    }
    store
}

proptest! {
    #[test]
    fn test_roundtrip_preserves_store(ops in prop::collection::vec(op(), 0..40)) {
        let store = build(&ops);
        let copy = reload(&store);
        prop_assert_eq!(snapshot(&copy), snapshot(&store));
    }
}
