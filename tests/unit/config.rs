use super::*;
use crate::encode::RecordingSink;

const EXAMPLE: &str = r#"{
  "tubes": 16,
  "render_period_ms": 50,
  "sink": { "kind": "terminal", "clear_screen": true },
  "programs": {
    "spin":  { "kind": "animation", "path": "anim/spin.ani", "loop": true },
    "hello": { "kind": "marquee", "text": "HELLO WORLD", "delay_ms": 400 }
  },
  "schedule": {
    "period_ms": 100, "tolerance_ms": 1000, "default": "hello",
    "entries": [ { "cron": "*/5 * * * *", "priority": 1, "program": "spin" } ]
  }
}"#;

fn parse(json: &str) -> SegResult<RunConfig> {
    RunConfig::from_reader(json.as_bytes())
}

fn config_error(json: &str) -> String {
    let err = parse(json).unwrap_err().to_string();
    assert!(err.starts_with("config error:"), "{err}");
    err
}

#[test]
fn parses_the_documented_example() {
    let config = parse(EXAMPLE).unwrap();
    assert_eq!(config.tubes, 16);
    assert_eq!(config.render_period(), Duration::from_millis(50));
    assert_eq!(
        config.sink,
        SinkConfig::Terminal {
            clear_screen: true,
            print_code: false
        }
    );
    assert_eq!(
        config.programs["spin"],
        ProgramConfig::Animation {
            path: PathBuf::from("anim/spin.ani"),
            looped: true,
            once: false
        }
    );
    assert_eq!(config.schedule.default.as_deref(), Some("hello"));
    assert_eq!(config.schedule.entries[0].priority, 1);
}

#[test]
fn fills_in_defaults() {
    let config = parse(
        r#"{ "programs": { "t": { "kind": "text", "text": "HI" } },
             "schedule": { "default": "t" } }"#,
    )
    .unwrap();
    assert_eq!(config.tubes, DEFAULT_TUBES);
    assert_eq!(config.render_period(), DEFAULT_RENDER_PERIOD);
    assert_eq!(config.sink, SinkConfig::default());
    assert_eq!(config.schedule.period_ms, 100);
    assert_eq!(config.schedule.tolerance_ms, 1000);
    assert!(config.schedule.entries.is_empty());
}

#[test]
fn rejects_invalid_configurations() {
    let err = config_error(
        r#"{ "programs": { "t": { "kind": "text", "text": "HI" } },
             "schedule": { "default": "missing" } }"#,
    );
    assert!(err.contains("unknown program 'missing'"));

    let err = config_error(
        r#"{ "programs": { "t": { "kind": "text", "text": "HI" } },
             "schedule": { "entries": [ { "cron": "61 * * * *", "program": "t" } ] } }"#,
    );
    assert!(err.contains("schedule error:"));

    config_error(
        r#"{ "tubes": 0, "programs": { "t": { "kind": "text", "text": "HI" } },
             "schedule": { "default": "t" } }"#,
    );
    config_error(
        r#"{ "programs": { "t": { "kind": "text", "text": "HI" } }, "schedule": {} }"#,
    );
    config_error(
        r#"{ "programs": { "s": { "kind": "spin", "rate": 0 } }, "schedule": { "default": "s" } }"#,
    );
    config_error(r#"{ "programs": {}, "schedule": { "period_ms": 0 } }"#);
    config_error(
        r#"{ "colour": "red", "programs": { "t": { "kind": "text", "text": "HI" } },
             "schedule": { "default": "t" } }"#,
    );
}

#[test]
fn builds_programs_in_name_order() {
    let config = parse(
        r#"{ "tubes": 4,
             "programs": {
               "words": { "kind": "marquee", "text": "scrolling text", "loop": false },
               "hi": { "kind": "text", "text": "hi" },
               "spin": { "kind": "spin", "rate": 10 }
             },
             "schedule": { "default": "hi",
               "entries": [ { "cron": "0 * * * *", "priority": 2, "program": "spin" } ] } }"#,
    )
    .unwrap();

    let (mut programs, ids) = config.build_programs().unwrap();
    assert_eq!(ids["hi"], ProgramId(0));
    assert_eq!(ids["spin"], ProgramId(1));
    assert_eq!(ids["words"], ProgramId(2));
    assert_eq!(programs[0].name(), "hi");

    let hi = programs[0].make_animation().unwrap().unwrap();
    assert_eq!(hi, text_animation("HI").unwrap());
    let spin = programs[1].make_animation().unwrap().unwrap();
    assert_eq!(spin.tube_count(), 4);
    let words = programs[2].make_animation().unwrap().unwrap();
    assert!(matches!(words, Animation::Marquee(_)));

    let schedule = config.build_schedule(&ids).unwrap();
    assert_eq!(schedule.entries().len(), 1);
    assert_eq!(schedule.entries()[0].program, ProgramId(1));
}

#[test]
fn resolves_animation_files_next_to_the_config() {
    let dir = std::env::temp_dir().join(format!("segtube-config-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("anim")).unwrap();
    std::fs::write(dir.join("anim/blink.ani"), "frame|1|ON\nframe|1|NO\n").unwrap();
    let path = dir.join("run.json");
    std::fs::write(
        &path,
        r#"{ "tubes": 2,
             "programs": { "blink": { "kind": "animation", "path": "anim/blink.ani", "once": true } },
             "schedule": { "default": "blink" } }"#,
    )
    .unwrap();

    let config = RunConfig::from_path(&path).unwrap();
    let asm = Arc::new(Assembler::new(RecordingSink::new()));
    let sched = config.build_scheduler(asm.clone()).unwrap();
    assert_eq!(sched.period(), Duration::from_millis(100));
    sched.tick(chrono::Local::now());
    assert_eq!(sched.active_program().as_deref(), Some("blink"));
    assert_eq!(asm.current().map(|a| a.tube_count()), Some(2));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_animation_file_names_the_program() {
    let config = parse(
        r#"{ "programs": { "gone": { "kind": "animation", "path": "/nonexistent/x.ani" } },
             "schedule": { "default": "gone" } }"#,
    )
    .unwrap();
    let err = config.build_programs().err().unwrap().to_string();
    assert!(err.starts_with("config error: program 'gone':"), "{err}");
}

#[test]
fn serial_sink_options() {
    let config = parse(
        r#"{ "sink": { "kind": "serial", "device": "/dev/ttyUSB0", "attempts": 5, "timeout_ms": 250 },
             "programs": { "t": { "kind": "text", "text": "HI" } },
             "schedule": { "default": "t" } }"#,
    )
    .unwrap();
    assert_eq!(
        config.sink,
        SinkConfig::Serial {
            device: PathBuf::from("/dev/ttyUSB0"),
            prompt: None,
            attempts: Some(5),
            timeout_ms: Some(250)
        }
    );
}
