use std::process::Command;

fn run_sim(args: &[&str]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_sim"))
        .args(args)
        .output()
        .expect("failed to run sim");
    assert!(output.status.success(), "sim failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("sim prints one JSON object")
}

#[test]
fn test_sim_battleship() {
    let result = run_sim(&["1", "2"]);
    assert_eq!(result["game"], "Battleship");
    let host = result["host"]["outcome"].as_str().unwrap();
    let client = result["client"]["outcome"].as_str().unwrap();
    assert!(
        (host == "Won" && client == "Lost") || (host == "Lost" && client == "Won"),
        "{} vs {}",
        host,
        client
    );
    assert!(result["host"]["shots"].as_u64().unwrap() > 0);
}

#[test]
fn test_sim_snake() {
    let result = run_sim(&["3", "4", "snake"]);
    assert_eq!(result["game"], "Snake");
    assert!(result["host"]["score"].is_u64());
    assert!(result["client"]["score"].is_u64());
}

#[test]
fn test_sim_rejects_bad_arguments() {
    let status = Command::new(env!("CARGO_BIN_EXE_sim"))
        .arg("1")
        .status()
        .expect("failed to run sim");
    assert!(!status.success());
}
