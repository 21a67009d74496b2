use ai_core::{BbKey, Blackboard, TypeMismatch};

#[test]
fn blackboard_set_get_remove_roundtrip() {
    let k_u32 = BbKey::<u32>::new(1);
    let k_str = BbKey::<String>::new(2);

    let mut bb = Blackboard::new();
    assert!(!bb.contains(k_u32));
    assert!(bb.is_empty());

    bb.set(k_u32, 123);
    bb.set(k_str, "hello".to_string());
    assert_eq!(bb.len(), 2);

    assert_eq!(bb.get(k_u32).copied(), Some(123));
    assert_eq!(bb.get(k_str).map(|s| s.as_str()), Some("hello"));

    assert_eq!(bb.remove(k_u32), Ok(Some(123)));
    assert_eq!(bb.get(k_u32), None);
}

#[test]
fn mismatched_type_reads_as_absent_and_try_get_reports_it() {
    let mut bb = Blackboard::new();
    bb.set(BbKey::<u32>::new(1), 1u32);

    let wrong = BbKey::<i32>::new(1);
    assert_eq!(bb.get(wrong), None);

    let err = bb.try_get(wrong).unwrap_err();
    assert_eq!(
        err,
        TypeMismatch {
            key: 1,
            requested: "i32"
        }
    );
    assert!(err.to_string().contains("i32"));
}

#[test]
fn remove_with_wrong_type_keeps_value() {
    let mut bb = Blackboard::new();
    let key = BbKey::<u32>::new(9);
    bb.set(key, 5);

    assert!(bb.remove(BbKey::<f32>::new(9)).is_err());
    assert_eq!(bb.get(key).copied(), Some(5));
}

#[test]
fn get_or_insert_with_inserts_once() {
    let key = BbKey::<Vec<u8>>::new(3);
    let mut bb = Blackboard::new();

    bb.get_or_insert_with(key, Vec::new).push(1);
    bb.get_or_insert_with(key, || vec![99]).push(2);

    assert_eq!(bb.get(key), Some(&vec![1, 2]));
}

#[test]
fn get_or_insert_with_replaces_foreign_type() {
    let mut bb = Blackboard::new();
    bb.set(BbKey::<u8>::new(4), 1u8);

    let value = bb.get_or_insert_with(BbKey::<String>::new(4), || "fresh".to_string());
    assert_eq!(value, "fresh");
}
