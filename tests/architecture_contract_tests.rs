//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_containing_except_files,
    find_non_export_lines_in_mod_files, path_exists, read_relative,
};

#[test]
fn cli_has_no_direct_infrastructure_imports() {
    let hits = find_lines_containing(
        "src/adapter/inbound/cli",
        &["use crate::infrastructure", "crate::infrastructure::"],
    );

    assert!(
        hits.is_empty(),
        "found direct infrastructure imports in inbound CLI adapters: {hits:#?}"
    );
}

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::contract",
            "tokio::",
            "reqwest::",
            "alloy_provider",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn cli_reaches_services_through_operator_port() {
    let source = read_relative("src/adapter/inbound/cli/operator.rs");
    assert!(
        source.contains("OperatorPort"),
        "CLI operator bridge should hold the inbound operator port"
    );
    assert!(
        !source.contains(".expect(") && !source.contains(".unwrap()"),
        "CLI operator accessor should report a missing operator as an error"
    );
}

#[test]
fn operator_ports_are_transport_agnostic() {
    let hits = find_lines_containing("src/port/inbound/operator", &["std::path::Path", "PathBuf"]);
    assert!(
        hits.is_empty(),
        "operator inbound ports should not expose filesystem path types: {hits:#?}"
    );
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter::", "crate::infrastructure::", "alloy_provider"],
    );
    assert!(
        hits.is_empty(),
        "application layer should not import adapters directly: {hits:#?}"
    );
}

#[test]
fn only_the_evm_adapter_talks_json_rpc() {
    let hits = find_lines_containing_except_files(
        "src",
        &["alloy_provider", "alloy_rpc_types_eth", "alloy_transport"],
        &["src/adapter/outbound/evm/ledger.rs"],
    );
    assert!(
        hits.is_empty(),
        "JSON-RPC types should stay inside the EVM ledger adapter: {hits:#?}"
    );
}

#[test]
fn contract_bindings_live_in_contract_module() {
    let hits = find_lines_containing_except_files(
        "src",
        &["sol! {", "sol!{"],
        &[
            "src/contract/marketplace.rs",
            "src/contract/activity.rs",
            "src/contract/schema.rs",
        ],
    );
    assert!(
        hits.is_empty(),
        "sol! bindings should be declared in src/contract: {hits:#?}"
    );
}

#[test]
fn ledger_port_is_the_only_outbound_chain_seam() {
    assert!(path_exists("src/port/outbound/ledger.rs"));
    assert!(path_exists("src/port/outbound/identity.rs"));

    let source = read_relative("src/port/outbound/ledger.rs");
    assert!(
        source.contains("pub trait Ledger"),
        "outbound ledger port should define the Ledger trait"
    );
}
