use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "bang-howdy"])
        .status()
        .expect("failed to invoke cargo check for bang-howdy CLI binary");

    assert!(status.success(), "cargo check --bin bang-howdy should succeed");
}

#[test]
fn short_game_runs_to_completion() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run", "--quiet", "--bin", "bang-howdy", "--", "--scenario", "shootout", "--rounds",
            "1", "--duration", "40", "--json",
        ])
        .output()
        .expect("failed to invoke cargo run for bang-howdy CLI binary");

    assert!(output.status.success(), "bang-howdy should exit cleanly");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report is valid JSON");
    assert_eq!(report["scenario"], "sa");
    assert_eq!(report["players"].as_array().map(Vec::len), Some(2));
}
