#![no_main]

use libfuzzer_sys::fuzz_target;
use tia_portal::ExportAutomation;
use tia_reader::{McpAdapter, ReaderConfig, Session, Toolbox};

const MAX_INPUT_BYTES: usize = 8192;

fuzz_target!(|data: &[u8]| {
    let capped = &data[..data.len().min(MAX_INPUT_BYTES)];
    let input = String::from_utf8_lossy(capped);

    let config = ReaderConfig::default();
    let mut adapter = McpAdapter::new(
        Session::new(ExportAutomation::default()),
        Toolbox::from_config(&config),
    );
    let mut output = Vec::new();
    let _ = adapter.run(input.as_bytes(), &mut output);

    for line in String::from_utf8_lossy(&output).lines() {
        assert!(!line.is_empty());
    }
});
