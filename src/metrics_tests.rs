use super::*;

#[test]
fn test_operation_timer_creation() {
    let timer = OperationTimer::new("fs.save");
    assert_eq!(timer.name(), "fs.save");
}

#[test]
fn test_operation_timer_drop_logs() {
    // Just verify it doesn't panic when dropped
    let _timer = OperationTimer::new("kv.load");
}
