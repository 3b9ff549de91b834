//! Integration test: the bundled models end to end.
//!
//! Builds schemas from `models/`, populates data through the editor or the
//! decoder, then validates and encodes.

use std::path::PathBuf;

use serde_json::json;
use ydm_core::{BuildError, DecodeError, Value};
use ydm_data::{
    decode, decode_subtree, encode, encode_container, validate, DataTree, DecodeOptions,
    EncodeOptions,
};
use ydm_schema::{build, ModuleFragment, SchemaTree, ViolationKind};

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn load(name: &str) -> ModuleFragment {
    let path = repo_root().join("models").join(name);
    ModuleFragment::from_path(&path)
        .unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()))
}

fn network_device() -> SchemaTree {
    build(
        &[load("network-device.yaml")],
        &[load("network-device-deviations.yaml")],
        &[load("network-device-ext.yaml")],
    )
    .unwrap()
}

fn tutorial() -> SchemaTree {
    build(&[load("test.yaml"), load("empty-branch.yaml")], &[], &[]).unwrap()
}

fn interface(schema: &SchemaTree, name: &str) -> DataTree {
    let mut data = DataTree::new();
    data.edit(schema)
        .container("device")
        .unwrap()
        .container("interface")
        .unwrap()
        .set("name", name)
        .unwrap();
    data
}

// -- Augmentation ------------------------------------------------------------

#[test]
fn test_augmented_interface_validates_and_encodes() {
    let schema = network_device();
    let mut data = DataTree::new();
    {
        let mut root = data.edit(&schema);
        let mut device = root.container("device").unwrap();
        device
            .container("interface")
            .unwrap()
            .set("name", "eth0")
            .unwrap()
            .set("mtu", 1500u16)
            .unwrap()
            .set("priority", 12u8)
            .unwrap()
            .set("status", "up")
            .unwrap()
            .set("bandwidth", 1000u32)
            .unwrap();
    }
    assert!(validate(&data, &schema).is_empty());

    let iface = data
        .root()
        .container("device")
        .and_then(|d| d.container("interface"))
        .unwrap();
    assert_eq!(
        iface.leaf("status"),
        Some(&Value::union(0, Value::enumeration("up")))
    );

    let opts = EncodeOptions::new().indent("  ");
    let text = encode_container(iface, &schema, &opts).unwrap();
    assert!(text.contains("\n  \"name\": \"eth0\""), "{text}");
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed,
        json!({
            "bandwidth": 1000,
            "mtu": 1500,
            "name": "eth0",
            "priority": 12,
            "status": "up"
        })
    );
}

#[test]
fn test_custom_status_uses_string_alternative() {
    let schema = network_device();
    let mut data = interface(&schema, "wlan0");
    data.edit(&schema)
        .container("device")
        .unwrap()
        .container("interface")
        .unwrap()
        .set("status", "maintenance-scheduled")
        .unwrap();

    assert!(validate(&data, &schema).is_empty());
    let status = data
        .root()
        .container("device")
        .and_then(|d| d.container("interface"))
        .and_then(|i| i.leaf("status"))
        .unwrap();
    assert_eq!(status.branch(), Some(1));
    assert_eq!(status.as_str(), Some("maintenance-scheduled"));

    let decoded = decode(
        &encode(&data, &schema, &EncodeOptions::default()).unwrap(),
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_augmentation_cannot_shadow_existing_child() {
    let ext = ModuleFragment::from_yaml_str(
        r#"
module: clash
prefix: c
namespace: urn:example:clash
imports:
  - module: network-device
    prefix: nd
augments:
  - target: /nd:device/nd:interface
    children:
      - kind: leaf
        name: name
        type: { name: string }
"#,
    )
    .unwrap();
    let err = build(&[load("network-device.yaml")], &[], &[ext]).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateChild { .. }), "{err:?}");
}

// -- Deviation ---------------------------------------------------------------

#[test]
fn test_deviation_restricts_interface_names() {
    let base = build(&[load("network-device.yaml")], &[], &[]).unwrap();
    assert!(validate(&interface(&base, "lo0"), &base).is_empty());

    let schema = network_device();
    assert!(validate(&interface(&schema, "eth0"), &schema).is_empty());
    assert!(validate(&interface(&schema, "wlan1"), &schema).is_empty());

    let violations = validate(&interface(&schema, "lo0"), &schema);
    assert_eq!(violations.len(), 1, "{violations}");
    let v = &violations.violations()[0];
    assert_eq!(v.kind, ViolationKind::PatternViolation);
    assert_eq!(v.path, "/device/interface/name");
    assert!(v.message.contains("lo0"), "{}", v.message);
}

// -- Tutorial model ----------------------------------------------------------

#[test]
fn test_build_and_emit_base_container() {
    let schema = tutorial();
    let mut data = DataTree::new();
    data.edit(&schema)
        .container("base-container")
        .unwrap()
        .set("base-container-leaf-1", "hello")
        .unwrap()
        .set("base-container-leaf-2", 1i32)
        .unwrap();

    let container = data.root().container("base-container").unwrap();
    assert_eq!(
        encode_container(container, &schema, &EncodeOptions::default()).unwrap(),
        r#"{"base-container-leaf-1":"hello","base-container-leaf-2":1}"#
    );
}

#[test]
fn test_parse_base_container() {
    let schema = tutorial();
    let data = decode(
        r#"{ "base-container": { "base-container-leaf-1": "hello", "base-container-leaf-2": 1 } }"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap();
    let c = data.root().container("base-container").unwrap();
    assert_eq!(c.leaf("base-container-leaf-1"), Some(&Value::from("hello")));
    assert_eq!(c.leaf("base-container-leaf-2"), Some(&Value::Int(1)));
    assert_eq!(c.leaf("base-container-leaf-3"), None);
}

#[test]
fn test_range_disjunction_on_parsed_and_built_data() {
    let schema = tutorial();
    let parsed = decode(
        r#"{"base-container":{"base-container-leaf-3":5}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap();
    assert!(validate(&parsed, &schema).is_empty());

    let mut built = DataTree::new();
    built
        .edit(&schema)
        .container("base-container")
        .unwrap()
        .set("base-container-leaf-3", 21i32)
        .unwrap();
    let violations = validate(&built, &schema);
    assert_eq!(violations.len(), 1);
    let v = &violations.violations()[0];
    assert_eq!(v.kind, ViolationKind::RangeViolation);
    assert_eq!(v.path, "/base-container/base-container-leaf-3");
    assert_eq!(v.message, "value 21 is outside specified ranges 1..5 | 10..15");
}

#[test]
fn test_range_boundaries() {
    let schema = tutorial();
    let cases: [(i32, bool); 9] = [
        (0, false),
        (1, true),
        (3, true),
        (5, true),
        (7, false),
        (10, true),
        (12, true),
        (15, true),
        (25, false),
    ];
    for (n, ok) in cases {
        let mut data = DataTree::new();
        data.edit(&schema)
            .container("base-container")
            .unwrap()
            .set("base-container-leaf-3", n)
            .unwrap();
        assert_eq!(validate(&data, &schema).is_empty(), ok, "value {n}");
    }
}

#[test]
fn test_empty_branch_subtree() {
    let schema = tutorial();
    let branch = decode_subtree(
        r#"{"string":"hello"}"#,
        &schema,
        "/empty-branch-test-one",
        &DecodeOptions::default(),
    )
    .unwrap();
    assert_eq!(branch.leaf("string"), Some(&Value::from("hello")));

    let mut data = DataTree::new();
    data.edit(&schema)
        .container("empty-branch-test-one")
        .unwrap()
        .set("string", "goodbye")
        .unwrap();
    let container = data.root().container("empty-branch-test-one").unwrap();
    assert_eq!(
        encode_container(container, &schema, &EncodeOptions::default()).unwrap(),
        r#"{"string":"goodbye"}"#
    );
}

#[test]
fn test_floats_are_not_integers() {
    let schema = tutorial();
    let err = decode(
        r#"{"base-container":{"base-container-leaf-2":1.5}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap_err();
    match err {
        DecodeError::TypeMismatch { path, .. } => {
            assert_eq!(path, "/base-container/base-container-leaf-2")
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

// -- Aggregation -------------------------------------------------------------

#[test]
fn test_all_violations_reported_in_one_pass() {
    let schema = network_device();
    let mut data = interface(&schema, "eth0");
    data.edit(&schema)
        .container("device")
        .unwrap()
        .container("interface")
        .unwrap()
        .set("mtu", 10u16)
        .unwrap()
        .set("priority", 7u8)
        .unwrap();

    let violations = validate(&data, &schema);
    assert_eq!(violations.len(), 2, "{violations}");
    assert_eq!(violations.of_kind(ViolationKind::RangeViolation).count(), 2);
    assert_eq!(violations.at("/device/interface/mtu").count(), 1);
    assert_eq!(violations.at("/device/interface/priority").count(), 1);
}

#[test]
fn test_list_entry_violation_paths_carry_key() {
    let schema = network_device();
    let mut data = DataTree::new();
    data.edit(&schema)
        .container("device")
        .unwrap()
        .list_entry("vlan", 10u16)
        .unwrap()
        .set("name", "mgmt")
        .unwrap();
    data.edit(&schema)
        .container("device")
        .unwrap()
        .list_entry("vlan", 5000u16)
        .unwrap();

    let violations = validate(&data, &schema);
    assert_eq!(violations.len(), 1, "{violations}");
    assert_eq!(violations.violations()[0].path, "/device/vlan[id=5000]/id");
}

// -- Module-qualified names --------------------------------------------------

#[test]
fn test_module_qualified_encoding() {
    let schema = network_device();
    let mut data = interface(&schema, "eth0");
    data.edit(&schema)
        .container("device")
        .unwrap()
        .container("interface")
        .unwrap()
        .set("status", "down")
        .unwrap();

    let opts = EncodeOptions::new().module_names(true);
    let text = encode(&data, &schema, &opts).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed,
        json!({
            "network-device:device": {
                "interface": {
                    "name": "eth0",
                    "network-device-ext:status": "down"
                }
            }
        })
    );

    let decoded = decode(&text, &schema, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_wrong_module_qualifier_is_unknown() {
    let schema = network_device();
    let err = decode(
        r#"{"network-device-ext:device":{}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownField { .. }), "{err:?}");
}

// -- Decode errors -----------------------------------------------------------

#[test]
fn test_unknown_member_strict_and_lenient() {
    let schema = network_device();
    let doc = r#"{"device":{"hostname":"edge-1","serial":"X1"}}"#;

    match decode(doc, &schema, &DecodeOptions::default()).unwrap_err() {
        DecodeError::UnknownField { path } => assert_eq!(path, "/device/serial"),
        other => panic!("expected UnknownField, got {other:?}"),
    }

    let data = decode(doc, &schema, &DecodeOptions::new().lenient(true)).unwrap();
    let device = data.root().container("device").unwrap();
    assert_eq!(device.leaf("hostname"), Some(&Value::from("edge-1")));
    assert_eq!(device.len(), 1);
}

#[test]
fn test_duplicate_list_key_rejected() {
    let schema = network_device();
    let err = decode(
        r#"{"device":{"vlan":[{"id":10},{"id":10,"name":"again"}]}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap_err();
    match err {
        DecodeError::DuplicateKey { path, key } => {
            assert_eq!(path, "/device/vlan");
            assert_eq!(key, "10");
        }
        other => panic!("expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn test_missing_list_key_rejected() {
    let schema = network_device();
    let err = decode(
        r#"{"device":{"vlan":[{"name":"no-id"}]}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap_err();
    assert!(
        matches!(&err, DecodeError::MissingKey { key, .. } if key == "id"),
        "{err:?}"
    );
}

#[test]
fn test_choice_cases_decode_and_conflict() {
    let schema = network_device();
    let ok = decode(
        r#"{"device":{"ipv4-address":"192.0.2.1"}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap();
    assert!(validate(&ok, &schema).is_empty());

    let both = decode(
        r#"{"device":{"ipv4-address":"192.0.2.1","dhcp-client":true}}"#,
        &schema,
        &DecodeOptions::default(),
    )
    .unwrap();
    let violations = validate(&both, &schema);
    assert_eq!(violations.of_kind(ViolationKind::ChoiceConflict).count(), 1, "{violations}");
}
