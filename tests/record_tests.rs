//! Tests for record layouts
//!
//! These tests verify:
//! - Slot sizes match the documented layout
//! - Null offsets and validity flags on disk
//! - Text field bounds
//! - Field selection and single-field updates

use linkdb::record::{
    MasterField, MasterRecord, MasterUpdate, Record, SlaveField, SlaveRecord, SlaveUpdate,
    MAX_TEXT_LEN,
};
use linkdb::LinkError;

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_master_slot_size() {
    let master = MasterRecord::new(555, "Alice", "Main St").unwrap();
    let bytes = master.encode().unwrap();

    assert_eq!(MasterRecord::SIZE, 78);
    assert_eq!(bytes.len() as u64, MasterRecord::SIZE);
}

#[test]
fn test_slave_slot_size() {
    let slave = SlaveRecord::new(555, 10, "Dune", "Herbert", 9.5).unwrap();
    let bytes = slave.encode().unwrap();

    assert_eq!(SlaveRecord::SIZE, 86);
    assert_eq!(bytes.len() as u64, SlaveRecord::SIZE);
}

#[test]
fn test_master_null_head_stored_as_minus_one() {
    let master = MasterRecord::new(7, "Bob", "Elm St").unwrap();
    let bytes = master.encode().unwrap();

    // key (4) + name (31) + address (31) = 66, then head_slave
    assert_eq!(&bytes[0..4], &7i32.to_le_bytes());
    assert_eq!(&bytes[66..70], &(-1i32).to_le_bytes());
    assert_eq!(&bytes[70..74], &0i32.to_le_bytes());
    assert_eq!(&bytes[74..78], &1i32.to_le_bytes());
}

#[test]
fn test_slave_link_and_flags_on_disk() {
    let mut slave = SlaveRecord::new(1, 2, "t", "a", 1.0).unwrap();
    slave.next = Some(12);
    slave.valid = false;
    let bytes = slave.encode().unwrap();

    // owner (4) + isbn (4) + title (31) + author (31) + price (8) = 78
    assert_eq!(&bytes[78..82], &12i32.to_le_bytes());
    assert_eq!(&bytes[82..86], &0i32.to_le_bytes());
}

#[test]
fn test_decode_restores_fields() {
    let mut master = MasterRecord::new(42, "Carol", "Oak Ave 5").unwrap();
    master.head_slave = Some(3);
    master.slave_count = 2;

    let decoded = MasterRecord::decode(&master.encode().unwrap()).unwrap();

    assert_eq!(decoded, master);
}

#[test]
fn test_decode_wrong_length_fails() {
    let result = MasterRecord::decode(&[0u8; 10]);

    assert!(matches!(result, Err(LinkError::Serialization(_))));
}

#[test]
fn test_decode_rejects_negative_link() {
    let master = MasterRecord::new(1, "a", "b").unwrap();
    let mut bytes = master.encode().unwrap();
    bytes[66..70].copy_from_slice(&(-5i32).to_le_bytes());

    let result = MasterRecord::decode(&bytes);

    assert!(matches!(result, Err(LinkError::Corruption(_))));
}

// =============================================================================
// Text Bound Tests
// =============================================================================

#[test]
fn test_text_at_limit_accepted() {
    let name = "x".repeat(MAX_TEXT_LEN);
    let master = MasterRecord::new(1, name.clone(), "addr").unwrap();

    let decoded = MasterRecord::decode(&master.encode().unwrap()).unwrap();
    assert_eq!(decoded.name, name);
}

#[test]
fn test_text_over_limit_rejected() {
    let result = MasterRecord::new(1, "x".repeat(MAX_TEXT_LEN + 1), "addr");

    assert!(matches!(
        result,
        Err(LinkError::FieldTooLong { field: "name", max: 30, len: 31 })
    ));
}

#[test]
fn test_text_with_nul_rejected() {
    let result = SlaveRecord::new(1, 1, "bad\0title", "a", 1.0);

    assert!(matches!(result, Err(LinkError::InvalidValue(_))));
}

#[test]
fn test_non_finite_price_rejected() {
    let result = SlaveRecord::new(1, 1, "t", "a", f64::NAN);

    assert!(matches!(result, Err(LinkError::InvalidValue(_))));
}

// =============================================================================
// Field Selection Tests
// =============================================================================

#[test]
fn test_master_field_choices() {
    assert_eq!(MasterField::from_choice(1).unwrap(), MasterField::Name);
    assert_eq!(MasterField::from_choice(2).unwrap(), MasterField::Address);
    assert!(matches!(
        MasterField::from_choice(3),
        Err(LinkError::InvalidSelection(3))
    ));
}

#[test]
fn test_slave_field_choices() {
    assert_eq!(SlaveField::from_choice(3).unwrap(), SlaveField::Price);
    assert!(matches!(
        SlaveField::from_choice(0),
        Err(LinkError::InvalidSelection(0))
    ));
}

#[test]
fn test_slave_price_value_parsed() {
    let update = SlaveField::Price.with_value(" 12.25 ").unwrap();
    assert_eq!(update, SlaveUpdate::Price(12.25));

    let bad = SlaveField::Price.with_value("cheap");
    assert!(matches!(bad, Err(LinkError::InvalidValue(_))));
}

#[test]
fn test_apply_keeps_key() {
    let mut master = MasterRecord::new(9, "Old", "Street").unwrap();
    master.apply(MasterUpdate::Name("New".into())).unwrap();

    assert_eq!(master.key, 9);
    assert_eq!(master.name, "New");
    assert_eq!(master.address, "Street");
}

#[test]
fn test_apply_too_long_leaves_record_unchanged() {
    let mut slave = SlaveRecord::new(1, 2, "Title", "Author", 3.0).unwrap();
    let result = slave.apply(SlaveUpdate::Author("y".repeat(40)));

    assert!(matches!(result, Err(LinkError::FieldTooLong { .. })));
    assert_eq!(slave.author, "Author");
}
