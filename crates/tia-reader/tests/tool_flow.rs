use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use expect_test::expect;
use tia_portal::{
    Automation, CancelToken, ExportAutomation, ExportSettings, Portal, PortalError, PortalResult,
    Project, ProjectLocation,
};
use tia_reader::{Session, ToolReply, Toolbox, Timeouts};

const PLANT: &str = r#"{
    "name": "Plant",
    "devices": [
        {"name": "HMI_1", "type_name": "KTP700 Basic"},
        {"name": "S71500", "type_name": "CPU 1516-3 PN/DP", "plc": {
            "name": "PLC_1",
            "folders": {
                "Program blocks": [
                    {"name": "Main", "type": "OB", "language": "SCL", "code": "\"Motor_DB\"(Start := \"Start\");"},
                    {"name": "Motor", "type": "FB", "language": "LAD", "networks": [
                        {"title": "Latch", "comment": "Start/stop latch", "elements": ["Start", "Stop", "Run"]},
                        {"title": "Alarm", "comment": "Overload"}
                    ]},
                    {"name": "Sequence", "type": "FB", "language": "GRAPH"},
                    {"name": "Legacy", "type": "FC"}
                ],
                "System blocks": [
                    {"name": "Sys1", "type": "FC", "language": "SCL"},
                    {"name": "Sys2", "type": "FC", "language": "SCL"},
                    {"name": "Sys3", "type": "FC", "language": "SCL"},
                    {"name": "Sys4", "type": "FC", "language": "SCL"}
                ]
            }
        }}
    ]
}"#;

/// Temp directory holding `Plant.json`, removed on drop.
struct PlantDir(PathBuf);

impl PlantDir {
    fn new(prefix: &str) -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("tia-reader-{prefix}-{stamp}"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Plant.json"), PLANT).unwrap();
        Self(dir)
    }

    fn join(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for PlantDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

fn slow_session(latency_ms: u64) -> Session {
    Session::new(ExportAutomation::new(ExportSettings {
        latency: Duration::from_millis(latency_ms),
    }))
}

fn hasty(timeouts: Timeouts) -> Toolbox {
    Toolbox::new(timeouts, 50)
}

fn reply(result: tia_reader::ToolResult) -> ToolReply {
    ToolReply::from(result)
}

fn toolbox() -> Toolbox {
    Toolbox::new(Timeouts::default(), 50)
}

fn open_plant(toolbox: &Toolbox, session: &mut Session, prefix: &str) -> PlantDir {
    let dir = PlantDir::new(prefix);
    let path = dir.join("Plant.json");
    let opened = reply(toolbox.open_project(session, path.to_str().unwrap()));
    assert_eq!(opened.text, "Successfully opened project: Plant.json");
    dir
}

#[test]
fn queries_without_project_do_not_touch_the_engineering_layer() {
    let toolbox = toolbox();
    let session = Session::new(ExportAutomation::default());
    for result in [
        toolbox.plc_list(&session),
        toolbox.list_blocks(&session, "PLC_1"),
        toolbox.read_block_code(&session, "PLC_1", "Main"),
        toolbox.project_structure(&session),
    ] {
        let reply = reply(result);
        assert_eq!(reply.text, "No project is currently open");
        assert!(reply.is_error);
    }
    assert!(!session.is_connected());
}

#[test]
fn connect_open_and_list() {
    let toolbox = toolbox();
    let mut session = Session::new(ExportAutomation::default());
    assert_eq!(
        reply(toolbox.connect(&mut session)).text,
        "Successfully connected to TIA Portal instance"
    );
    let _plant = open_plant(&toolbox, &mut session, "list");

    expect![[r#"
        PLCs in the project:
        - PLC_1"#]]
    .assert_eq(&reply(toolbox.plc_list(&session)).text);

    expect![[r#"
        Blocks in PLC 'PLC_1':

        Main (OB): SCL
        Motor (FB): LAD
        Sequence (FB): GRAPH
        Legacy: Unknown language
        Sys1 (FC): SCL
        Sys2 (FC): SCL
        Sys3 (FC): SCL
        Sys4 (FC): SCL"#]]
    .assert_eq(&reply(toolbox.list_blocks(&session, "PLC_1")).text);

    let missing = reply(toolbox.list_blocks(&session, "PLC_9"));
    assert_eq!(missing.text, "PLC with name 'PLC_9' not found");
    assert!(missing.is_error);
}

#[test]
fn open_project_connects_and_falls_back_to_project_name() {
    let toolbox = toolbox();
    let mut session = Session::new(ExportAutomation::default());
    let dir = PlantDir::new("fallback");
    let project_file = dir.join("Plant.ap17");
    let opened = reply(toolbox.open_project(&mut session, project_file.to_str().unwrap()));
    assert_eq!(opened.text, "Successfully opened project: Plant");
    assert!(session.is_connected());
    assert!(session.has_project());
}

#[test]
fn open_project_reports_failure_and_keeps_connection() {
    let toolbox = toolbox();
    let mut session = Session::new(ExportAutomation::default());
    let dir = PlantDir::new("missing");
    let opened = reply(toolbox.open_project(&mut session, dir.join("Nope.ap17").to_str().unwrap()));
    assert!(opened.is_error);
    assert!(opened.text.starts_with("Failed to open project: "));
    assert!(session.is_connected());
    assert!(!session.has_project());
}

#[test]
fn read_block_code_by_language() {
    let toolbox = toolbox();
    let mut session = Session::new(ExportAutomation::default());
    let _plant = open_plant(&toolbox, &mut session, "code");

    expect![[r#"
        SCL Block Main:

        "Motor_DB"(Start := "Start");"#]]
    .assert_eq(&reply(toolbox.read_block_code(&session, "PLC_1", "Main")).text);

    expect![[r#"
        LAD Block Motor:

        Network 1: Latch
        Description: Start/stop latch
        Elements: Start, Stop, Run

        Network 2: Alarm
        Description: Overload
        Elements: [Unable to retrieve element names]

    "#]]
    .assert_eq(&reply(toolbox.read_block_code(&session, "PLC_1", "Motor")).text);

    let graph = reply(toolbox.read_block_code(&session, "PLC_1", "Sequence"));
    assert!(!graph.is_error);
    expect![[r#"Block 'Sequence' has language 'GRAPH' - detailed viewing not supported, but may still be readable"#]]
        .assert_eq(&graph.text);

    let sys = reply(toolbox.read_block_code(&session, "PLC_1", "Sys3"));
    assert!(sys.text.starts_with("Unable to get code for SCL block 'Sys3': "));

    assert_eq!(
        reply(toolbox.read_block_code(&session, "PLC_1", "Ghost")).text,
        "Block 'Ghost' not found in PLC 'PLC_1'"
    );
    assert_eq!(
        reply(toolbox.read_block_code(&session, "PLC_2", "Main")).text,
        "PLC with name 'PLC_2' not found"
    );
}

#[test]
fn structure_caps_folder_listing() {
    let toolbox = Toolbox::new(Timeouts::default(), 3);
    let mut session = Session::new(ExportAutomation::default());
    let _plant = open_plant(&toolbox, &mut session, "structure");

    expect![[r#"
        Project: Plant
        Device: HMI_1 (KTP700 Basic)
        Device: S71500 (CPU 1516-3 PN/DP)
          PLC: PLC_1
            Program blocks:
              Main (OB): SCL
              Motor (FB): LAD
              Sequence (FB): GRAPH
              ... and 1 more blocks
            System blocks:
              Sys1 (FC): SCL
              Sys2 (FC): SCL
              Sys3 (FC): SCL
              ... and 1 more blocks"#]]
    .assert_eq(&reply(toolbox.project_structure(&session)).text);
}

#[test]
fn expired_call_does_not_disturb_the_next_one() {
    let mut session = Session::new(ExportAutomation::new(ExportSettings {
        latency: Duration::from_millis(200),
    }));
    let patient = toolbox();
    let _plant = open_plant(&patient, &mut session, "timeout");

    let hasty = Toolbox::new(
        Timeouts {
            list_devices: Duration::from_millis(50),
            ..Timeouts::default()
        },
        50,
    );
    let timed_out = reply(hasty.plc_list(&session));
    assert_eq!(timed_out.text, "Getting devices timed out after 0.05 seconds");
    assert!(timed_out.is_error);
    assert!(session.has_project());

    let listed = reply(patient.plc_list(&session));
    assert_eq!(listed.text, "PLCs in the project:\n- PLC_1");
}

#[test]
fn structure_timeout_keeps_partial_text() {
    let mut session = Session::new(ExportAutomation::new(ExportSettings {
        latency: Duration::from_millis(200),
    }));
    let _plant = open_plant(&toolbox(), &mut session, "partial");

    let hasty = Toolbox::new(
        Timeouts {
            structure: Duration::from_millis(500),
            ..Timeouts::default()
        },
        50,
    );
    let partial = reply(hasty.project_structure(&session));
    assert!(partial.is_error);
    assert_eq!(
        partial.text,
        "Getting devices timed out after 0.5 seconds, partial structure:\nProject: Plant\nDevice: HMI_1 (KTP700 Basic)"
    );
}

#[test]
fn zero_config_deadline_aborts_connect() {
    let toolbox = Toolbox::new(
        Timeouts {
            config_load: Duration::ZERO,
            ..Timeouts::default()
        },
        50,
    );
    let mut session = Session::new(ExportAutomation::default());
    let connected = reply(toolbox.connect(&mut session));
    assert_eq!(connected.text, "TIA config loading timed out after 0 seconds");
    assert!(!session.is_connected());

    let opened = reply(toolbox.open_project(&mut session, "/plant/Plant.ap17"));
    assert_eq!(
        opened.text,
        "Not connected to TIA Portal. Use connect_to_tia tool first."
    );
}

#[test]
fn reconnect_drops_project_and_connects_again() {
    let toolbox = toolbox();
    let mut session = Session::new(ExportAutomation::default());
    let _plant = open_plant(&toolbox, &mut session, "reconnect");

    let reconnected = reply(toolbox.reconnect(&mut session));
    assert_eq!(reconnected.text, "Successfully connected to TIA Portal instance");
    assert!(session.is_connected());
    assert!(!session.has_project());
    assert_eq!(
        reply(toolbox.plc_list(&session)).text,
        "No project is currently open"
    );
}

#[cfg(unix)]
#[test]
fn project_opening_timeout_does_not_try_the_fallback() {
    let dir = PlantDir::new("fifo");
    // The primary path blocks forever; the fallback form would find Plant.json.
    let primary = dir.join("Plant.ap17");
    let status = std::process::Command::new("mkfifo")
        .arg(&primary)
        .status()
        .unwrap();
    assert!(status.success());

    let toolbox = hasty(Timeouts {
        open_project: Duration::from_millis(200),
        ..Timeouts::default()
    });
    let mut session = Session::new(ExportAutomation::default());
    let started = Instant::now();
    let opened = reply(toolbox.open_project(&mut session, primary.to_str().unwrap()));
    assert_eq!(opened.text, "Project opening timed out after 0.2 seconds");
    assert!(opened.is_error);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(session.is_connected());
    assert!(!session.has_project());
}

#[test]
fn block_listing_timeout_names_the_plc() {
    let mut session = slow_session(200);
    let _plant = open_plant(&toolbox(), &mut session, "list-timeout");
    let toolbox = hasty(Timeouts {
        list_blocks: Duration::from_millis(50),
        ..Timeouts::default()
    });
    let listed = reply(toolbox.list_blocks(&session, "PLC_1"));
    assert_eq!(
        listed.text,
        "Getting blocks for PLC 'PLC_1' timed out after 0.05 seconds"
    );
    assert!(listed.is_error);
}

#[test]
fn block_code_timeouts_name_the_stage() {
    let mut session = slow_session(200);
    let _plant = open_plant(&toolbox(), &mut session, "code-timeout");

    let finding = hasty(Timeouts {
        find_block: Duration::from_millis(50),
        ..Timeouts::default()
    });
    assert_eq!(
        reply(finding.read_block_code(&session, "PLC_1", "Main")).text,
        "Finding block 'Main' timed out after 0.05 seconds"
    );

    let reading = hasty(Timeouts {
        read_code: Duration::from_millis(50),
        ..Timeouts::default()
    });
    let scl = reply(reading.read_block_code(&session, "PLC_1", "Main"));
    assert_eq!(
        scl.text,
        "SCL code retrieval for block 'Main' timed out after 0.05 seconds"
    );
    assert!(scl.is_error);
    assert_eq!(
        reply(reading.read_block_code(&session, "PLC_1", "Motor")).text,
        "LAD network retrieval for block 'Motor' timed out after 0.05 seconds"
    );
    assert!(session.has_project());
}

#[test]
fn reconnect_survives_dispose_timeout() {
    let mut session = slow_session(200);
    let _plant = open_plant(&toolbox(), &mut session, "dispose-timeout");
    let toolbox = hasty(Timeouts {
        dispose: Duration::from_millis(50),
        ..Timeouts::default()
    });
    let reconnected = reply(toolbox.reconnect(&mut session));
    assert_eq!(reconnected.text, "Successfully connected to TIA Portal instance");
    assert!(!reconnected.is_error);
    assert!(session.is_connected());
    assert!(!session.has_project());
}

/// Connects fine, but its portals refuse to be disposed.
#[derive(Debug)]
struct StickyAutomation;

#[derive(Debug)]
struct StickyPortal;

impl Automation for StickyAutomation {
    fn load_config(&mut self, _: &CancelToken) -> PortalResult<()> {
        Ok(())
    }

    fn connect(&mut self, _: &CancelToken) -> PortalResult<Box<dyn Portal>> {
        Ok(Box::new(StickyPortal))
    }
}

impl Portal for StickyPortal {
    fn open_project(
        &mut self,
        location: &ProjectLocation,
        _: &CancelToken,
    ) -> PortalResult<Box<dyn Project>> {
        Err(PortalError::not_found("project", location.to_string()))
    }

    fn dispose(&mut self, _: &CancelToken) -> PortalResult<()> {
        Err(PortalError::Rejected("instance is busy".into()))
    }
}

#[test]
fn reconnect_survives_dispose_failure() {
    let toolbox = toolbox();
    let mut session = Session::new(StickyAutomation);
    assert!(!reply(toolbox.connect(&mut session)).is_error);

    let reconnected = reply(toolbox.reconnect(&mut session));
    assert_eq!(reconnected.text, "Successfully connected to TIA Portal instance");
    assert!(session.is_connected());
}
