//! Property tests: trees populated through the editor survive an
//! encode/decode cycle, and range checks agree with interval membership.
//!
//! The `counters` schema puts string-encoded alternatives (64-bit integers,
//! binary) ahead of `string` in its unions, so a plain string can be read
//! back as either.

use std::path::PathBuf;

use proptest::prelude::*;
use ydm_core::Value;
use ydm_data::{decode, encode, validate, DataTree, DecodeOptions, EncodeOptions};
use ydm_schema::{
    build, ContainerStmt, LeafStmt, ModuleFragment, SchemaBuilder, SchemaTree, TypeStmt,
    ViolationKind,
};

fn model(name: &str) -> ModuleFragment {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.pop();
    ModuleFragment::from_path(&path.join("models").join(name)).unwrap()
}

fn network_device() -> SchemaTree {
    build(
        &[model("network-device.yaml")],
        &[model("network-device-deviations.yaml")],
        &[model("network-device-ext.yaml")],
    )
    .unwrap()
}

#[derive(Debug, Clone)]
struct Device {
    hostname: Option<String>,
    iface: String,
    mtu: Option<u16>,
    status: Option<String>,
    bandwidth: Option<u32>,
    vlans: Vec<(u16, Option<String>, Vec<String>)>,
    dhcp: Option<bool>,
}

fn device() -> impl Strategy<Value = Device> {
    (
        proptest::option::of("[a-z][a-z0-9-]{0,12}"),
        "(eth|wlan)[0-9]{1,2}",
        proptest::option::of(any::<u16>()),
        proptest::option::of(prop_oneof![
            Just("up".to_string()),
            Just("down".to_string()),
            "[a-z ]{0,10}",
        ]),
        proptest::option::of(any::<u32>()),
        proptest::collection::btree_map(
            any::<u16>(),
            (
                proptest::option::of("[a-z]{1,6}"),
                proptest::collection::vec("[a-z]{1,4}[0-9]", 0..3),
            ),
            0..4,
        ),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(hostname, iface, mtu, status, bandwidth, vlans, dhcp)| Device {
            hostname,
            iface,
            mtu,
            status,
            bandwidth,
            vlans: vlans
                .into_iter()
                .map(|(id, (name, ports))| (id, name, ports))
                .collect(),
            dhcp,
        })
}

fn populate(schema: &SchemaTree, d: &Device) -> DataTree {
    let mut data = DataTree::new();
    let mut root = data.edit(schema);
    let mut device = root.container("device").unwrap();
    if let Some(h) = &d.hostname {
        device.set("hostname", h.as_str()).unwrap();
    }
    if let Some(dhcp) = d.dhcp {
        device.set("dhcp-client", dhcp).unwrap();
    }
    for (id, name, ports) in &d.vlans {
        let mut entry = device.list_entry("vlan", *id).unwrap();
        if let Some(name) = name {
            entry.set("name", name.as_str()).unwrap();
        }
        for port in ports {
            entry.push("tagged-ports", port.as_str()).unwrap();
        }
    }
    let mut iface = device.container("interface").unwrap();
    iface.set("name", d.iface.as_str()).unwrap();
    if let Some(mtu) = d.mtu {
        iface.set("mtu", mtu).unwrap();
    }
    if let Some(status) = &d.status {
        iface.set("status", status.as_str()).unwrap();
    }
    if let Some(bw) = d.bandwidth {
        iface.set("bandwidth", bw).unwrap();
    }
    data
}

fn counters() -> SchemaTree {
    let union = |members: &[&str]| TypeStmt::union(members.iter().map(|m| TypeStmt::named(m)).collect());
    SchemaBuilder::new()
        .module(
            ModuleFragment::new("counters", "ctr", "urn:example:counters").node(
                ContainerStmt::new("counters")
                    .child(LeafStmt::new("total", union(&["int64", "string"])))
                    .child(LeafStmt::new("digest", union(&["binary", "string"])))
                    .child(LeafStmt::new("limit", union(&["string", "uint64"]))),
            ),
        )
        .build()
        .unwrap()
}

/// Strings that collide with another alternative's JSON form, plus noise.
fn text() -> impl Strategy<Value = Value> {
    prop_oneof![
        "-?[0-9]{1,20}".prop_map(Value::from),
        "([A-Za-z0-9+/]{4}){1,3}".prop_map(Value::from),
        "[A-Za-z0-9+/]{2}==".prop_map(Value::from),
        any::<String>().prop_map(Value::from),
    ]
}

fn populate_counters(schema: &SchemaTree, total: Value, digest: Value, limit: Value) -> DataTree {
    let mut data = DataTree::new();
    data.edit(schema)
        .container("counters")
        .unwrap()
        .set("total", total)
        .unwrap()
        .set("digest", digest)
        .unwrap()
        .set("limit", limit)
        .unwrap();
    data
}

proptest! {
    /// decode(encode(tree)) reproduces the tree, values and union
    /// alternatives included.
    #[test]
    fn encode_decode_roundtrip(d in device(), qualified in any::<bool>()) {
        let schema = network_device();
        let tree = populate(&schema, &d);
        let text = encode(&tree, &schema, &EncodeOptions::new().module_names(qualified)).unwrap();
        let back = decode(&text, &schema, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(back, tree);
    }

    /// Encoding is deterministic.
    #[test]
    fn encode_is_deterministic(d in device()) {
        let schema = network_device();
        let tree = populate(&schema, &d);
        let a = encode(&tree, &schema, &EncodeOptions::default()).unwrap();
        let b = encode(&tree.clone(), &schema, &EncodeOptions::default()).unwrap();
        prop_assert_eq!(a, b);
    }

    /// The mtu leaf is valid exactly when it lies in 68..9216.
    #[test]
    fn mtu_range_matches_interval(mtu in any::<u16>()) {
        let schema = network_device();
        let d = Device {
            hostname: None,
            iface: "eth0".to_string(),
            mtu: Some(mtu),
            status: None,
            bandwidth: None,
            vlans: Vec::new(),
            dhcp: None,
        };
        let violations = validate(&populate(&schema, &d), &schema);
        let in_range = (68..=9216).contains(&mtu);
        prop_assert_eq!(violations.is_empty(), in_range);
        if !in_range {
            prop_assert_eq!(violations.of_kind(ViolationKind::RangeViolation).count(), 1);
        }
    }

    /// Union leaves whose earlier alternatives are string-encoded come back
    /// on the alternative the editor stored.
    #[test]
    fn string_encoded_union_alternatives_roundtrip(
        total in prop_oneof![any::<i64>().prop_map(Value::from), text()],
        digest in prop_oneof![
            proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::from),
            text(),
        ],
        limit in prop_oneof![any::<u64>().prop_map(Value::from), text()],
        qualified in any::<bool>(),
    ) {
        let schema = counters();
        let tree = populate_counters(&schema, total, digest, limit);
        let json = encode(&tree, &schema, &EncodeOptions::new().module_names(qualified)).unwrap();
        let back = decode(&json, &schema, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(back, tree);
    }
}
