use super::*;

#[test]
fn read_write_is_both() {
    assert!(MemoryEffects::READ_WRITE.may_read());
    assert!(MemoryEffects::READ_WRITE.may_write());
    assert!(MemoryEffects::READ.may_read());
    assert!(!MemoryEffects::READ.may_write());
    assert!(!MemoryEffects::WRITE.may_read());
}

#[test]
fn default_is_empty() {
    let effects = MemoryEffects::default();
    assert!(effects.is_empty());
    assert!(!effects.may_read());
    assert!(!effects.may_write());
}
