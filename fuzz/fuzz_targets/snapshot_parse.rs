#![no_main]

use libfuzzer_sys::fuzz_target;
use tia_portal::ProjectSnapshot;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = ProjectSnapshot::parse(text) else {
        return;
    };
    let encoded = serde_json::to_string(&snapshot).expect("snapshot serializes");
    let reparsed = ProjectSnapshot::parse(&encoded).expect("serialized snapshot parses");
    assert_eq!(snapshot, reparsed);
});
