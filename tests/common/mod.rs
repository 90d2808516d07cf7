// Shared fixtures for splitmap integration tests
#![allow(dead_code)]

use indoc::indoc;
use splitmap::facts::read_fact_batch;
use splitmap::{FactBatch, RawFact};
use std::path::{Path, PathBuf};

/// A small shop: two dense service candidates sharing one table, plus a web
/// front end owned by its own team.
pub const SHOP_FACTS: &str = indoc! {r#"
    {"kind": "declaration", "source_unit": "Orders.Api", "metadata": {"unit_kind": "namespace", "team": "checkout"}}
    {"kind": "declaration", "source_unit": "Orders.Domain", "metadata": {"unit_kind": "namespace", "team": "checkout", "abstract": true}}
    {"kind": "declaration", "source_unit": "Orders.Data", "metadata": {"unit_kind": "namespace", "team": "checkout"}}
    {"kind": "reference", "source_unit": "Orders.Api", "target_unit": "Orders.Domain"}
    {"kind": "reference", "source_unit": "Orders.Domain", "target_unit": "Orders.Data"}
    {"kind": "call", "source_unit": "Orders.Api", "target_unit": "Orders.Data"}
    {"kind": "table_access", "source_unit": "Orders.Data", "metadata": {"table": "orders"}}
    {"kind": "table_access", "source_unit": "Orders.Data", "metadata": {"table": "customers"}}
    {"kind": "declaration", "source_unit": "Billing.Api", "metadata": {"unit_kind": "namespace", "team": "payments"}}
    {"kind": "declaration", "source_unit": "Billing.Ledger", "metadata": {"unit_kind": "namespace", "team": "payments"}}
    {"kind": "reference", "source_unit": "Billing.Api", "target_unit": "Billing.Ledger"}
    {"kind": "call", "source_unit": "Billing.Api", "target_unit": "Billing.Ledger"}
    {"kind": "table_access", "source_unit": "Billing.Ledger", "metadata": {"table": "customers"}}
    {"kind": "call", "source_unit": "Billing.Api", "metadata": {"integration": "stripe"}}
    {"kind": "call", "source_unit": "Orders.Domain", "target_unit": "Billing.Api"}
    {"kind": "declaration", "source_unit": "Web", "metadata": {"unit_kind": "project", "team": "storefront"}}
    {"kind": "reference", "source_unit": "Web", "target_unit": "Orders.Api"}
"#};

pub fn parse_batch(name: &str, jsonl: &str) -> FactBatch {
    read_fact_batch(name, jsonl.as_bytes()).unwrap()
}

pub fn shop_batches() -> Vec<FactBatch> {
    vec![parse_batch("shop.jsonl", SHOP_FACTS)]
}

/// Three groups whose hubs `A`, `B` and `C` form the cycle A -> B -> C -> A.
/// Each group is a triangle with doubled edges, so it stays one cluster.
pub fn cycle_of_groups() -> Vec<FactBatch> {
    let mut facts = Vec::new();
    for hub in ["A", "B", "C"] {
        let ring = [hub.to_string(), format!("{hub}1"), format!("{hub}2")];
        for i in 0..3 {
            let (from, to) = (&ring[i], &ring[(i + 1) % 3]);
            facts.push(RawFact::reference(from.as_str(), to.as_str()));
            facts.push(RawFact::call(from.as_str(), to.as_str()));
        }
    }
    facts.push(RawFact::reference("A", "B"));
    facts.push(RawFact::reference("B", "C"));
    facts.push(RawFact::reference("C", "A"));
    vec![FactBatch::new("cycle.jsonl", facts)]
}

/// Disconnected cliques; each clique of `n` units scores `n` with default
/// weights since nothing crosses its boundary.
pub fn cliques(groups: &[(&str, usize)]) -> Vec<FactBatch> {
    let mut facts = Vec::new();
    for (prefix, size) in groups {
        let names: Vec<String> = (0..*size).map(|i| format!("{prefix}.{i:02}")).collect();
        for (i, from) in names.iter().enumerate() {
            for to in &names[i + 1..] {
                facts.push(RawFact::reference(from.as_str(), to.as_str()));
            }
        }
    }
    vec![FactBatch::new("cliques.jsonl", facts)]
}

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
