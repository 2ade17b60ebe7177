#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/payload_basic.rs");
    t.pass("tests/ui/payload_event_type.rs");
}
