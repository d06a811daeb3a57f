// Runs in its own test binary: initialization installs the process-wide
// subscriber and registration exactly once.

use generic_shellex::MenuType;

#[test]
fn test_skipped_config_entries_are_written_to_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("shellex.log");
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "logFile": log_file.to_str().unwrap(),
            "types": {
                "*": "not an object",
                "Directory": { "title": 7 },
                "Directory\\Background": { "title": "Terminal here", "command": "wt -d %1" }
            }
        })
        .to_string(),
    )
    .unwrap();

    let registration = generic_shellex::initialize_from(&config_path);
    assert_eq!(registration.len(), 1);
    assert!(
        registration
            .resolve(&MenuType::DirectoryBackground.clsid())
            .is_ok()
    );

    let content = std::fs::read_to_string(&log_file).unwrap();
    let banner = content.find("Logging system initialized").unwrap();
    let not_object = content.find("Ignoring non-object type entry *").unwrap();
    let malformed = content
        .find("Ignoring malformed type entry Directory")
        .unwrap();
    assert!(banner < not_object);
    assert!(banner < malformed);
}
