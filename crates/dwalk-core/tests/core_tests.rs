#[test]
fn load_walk_and_write_json_file() {
    use dwalk_core::{VisitKind, WalkOpts, parse_file_to_value, walk, write_value_to_file};
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let src = dir.path().join("data.json");
    let out = dir.path().join("out.json");
    let content = r#"{"root":{"title":"hello world","tags":["a b","c"],"n":[1,2]}}"#;
    std::fs::write(&src, content).unwrap();

    let v = parse_file_to_value(&src).expect("load json");
    let opts = WalkOpts::default().split_on(" ");
    walk(&v, &opts, |visit| {
        match visit.kind() {
            VisitKind::MappingValueSubstring | VisitKind::SequenceItemSubstring => {
                if let Some(t) = visit.text().map(str::to_uppercase) {
                    visit.commit(t)?;
                }
            }
            VisitKind::SequenceItemNumber => {
                let n = visit.number().and_then(|n| n.as_i64()).unwrap_or(0);
                visit.commit(n * 10)?;
            }
            _ => {}
        }
        Ok(())
    })
    .unwrap();

    write_value_to_file(&out, &v).unwrap();
    let s = std::fs::read_to_string(&out).unwrap();
    let written: serde_json::Value = serde_json::from_str(&s).unwrap();
    assert_eq!(
        written,
        serde_json::json!({"root": {"title": "HELLO WORLD", "tags": ["A B", "C"], "n": [10, 20]}})
    );
    // key order is kept on disk
    assert!(s.find("\"title\"").unwrap() < s.find("\"tags\"").unwrap());
}

#[test]
fn empty_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("empty.json");
    std::fs::write(&p, "   ").unwrap();
    let err = dwalk_core::parse_file_to_value(&p).unwrap_err();
    assert!(matches!(err, dwalk_core::DocError::Empty));
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        dwalk_core::parse_file_to_value(&missing),
        Err(dwalk_core::DocError::Io(_))
    ));
}

#[test]
fn walk_opts_load_from_config_json() {
    use dwalk_core::{VisitKind, WalkOpts};
    let opts: WalkOpts = serde_json::from_str(
        r#"{"split-on": "-", "split-keys": false, "max-path-length": 3, "kinds": ["sequence-item-substring"], "debug": true}"#,
    )
    .unwrap();
    assert_eq!(
        opts,
        WalkOpts::default()
            .split_on("-")
            .split_keys(false)
            .max_path_length(3)
            .kinds([VisitKind::SequenceItemSubstring])
            .debug(true)
    );
}
