//! Tests for the console Session
//!
//! These tests verify:
//! - Command names and prompting for fields
//! - Error reporting without ending the session
//! - Field choice validation before any write
//! - `exit` and end of input

use linkdb::console::Session;
use linkdb::engine::Engine;
use linkdb::protocol::CommandType;
use linkdb::record::MasterRecord;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open_path(temp_dir.path()).unwrap();
    (temp_dir, engine)
}

/// Run a whole session over `script` and return everything it printed
fn run_script(engine: &mut Engine, script: &str) -> String {
    let mut output = Vec::new();
    {
        let mut session = Session::new(engine, script.as_bytes(), &mut output);
        session.run().unwrap();
    }
    String::from_utf8(output).unwrap()
}

// =============================================================================
// Command Name Tests
// =============================================================================

#[test]
fn test_command_names_parse() {
    for command_type in CommandType::ALL {
        let parsed: CommandType = command_type.name().parse().unwrap();
        assert_eq!(parsed, command_type);
    }
    assert!("get".parse::<CommandType>().is_err());
}

#[test]
fn test_unknown_command_is_reported() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "frobnicate\nexit\n");

    assert!(output.contains("Unknown command."));
}

#[test]
fn test_prompt_lists_commands() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "exit\n");

    assert!(output.contains("Enter command (get-m, get-s, del-m"));
    assert!(output.contains("check, exit): "));
}

// =============================================================================
// Session Flow Tests
// =============================================================================

#[test]
fn test_insert_then_get_master() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(
        &mut engine,
        "insert-m\n555\nAlice\nMain St\nget-m\n555\nexit\n",
    );

    assert!(output.contains("Buyer 555 inserted at record 0."));
    assert!(output.contains("Buyer Record:\nPhone: 555\nName: Alice\nAddress: Main St"));
    assert!(output.contains("First Book Index: -1"));
}

#[test]
fn test_insert_slave_and_count() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(
        &mut engine,
        "insert-m\n1\nBob\nElm\n\
         insert-s\n1\n10\nDune\nHerbert\n9.5\n\
         insert-s\n1\n20\nEmma\nAusten\n4.25\n\
         calc-s\nexit\n",
    );

    assert!(output.contains("Book 20 of buyer 1 inserted at record 1."));
    assert!(output.contains("Total valid book records: 2\nPhone 1: 2 books."));
    assert_eq!(engine.get_slave(1, 10).unwrap().author, "Herbert");
}

#[test]
fn test_insert_slave_unknown_master_stops_prompting() {
    let (_temp, mut engine) = setup_temp_engine();

    // Nothing after the phone number is consumed as a field
    let output = run_script(&mut engine, "insert-s\n9\ncalc-m\nexit\n");

    assert!(output.contains("Error: master 9 not found"));
    assert!(!output.contains("Enter ISBN"));
    assert!(output.contains("Error: Data file unavailable"));
}

#[test]
fn test_error_does_not_end_session() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "get-m\n42\ninsert-m\n42\nA\nB\nget-m\n42\nexit\n");

    assert!(output.contains("Error: master 42 not found"));
    assert!(output.contains("Name: A"));
}

#[test]
fn test_bad_number_is_reported() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "get-m\nabc\nexit\n");

    assert!(output.contains("Error: Invalid value: `abc` is not an integer"));
}

#[test]
fn test_duplicate_insert_is_reported() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "insert-m\n3\nA\nB\ninsert-m\n3\nC\nD\nexit\n");

    assert!(output.contains("Error: Key 3 already exists"));
    assert_eq!(engine.get_master(3).unwrap().name, "A");
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_master_address() {
    let (_temp, mut engine) = setup_temp_engine();
    engine
        .insert_master(MasterRecord::new(7, "Carol", "Old Rd").unwrap())
        .unwrap();

    let output = run_script(&mut engine, "update-m\n7\n2\nNew Rd\nexit\n");

    assert!(output.contains("Buyer 7 updated."));
    assert_eq!(engine.get_master(7).unwrap().address, "New Rd");
}

#[test]
fn test_update_invalid_choice_writes_nothing() {
    let (_temp, mut engine) = setup_temp_engine();
    engine
        .insert_master(MasterRecord::new(7, "Carol", "Old Rd").unwrap())
        .unwrap();

    let output = run_script(&mut engine, "update-m\n7\n5\nget-m\n7\nexit\n");

    assert!(output.contains("Error: Invalid field selection: 5"));
    assert!(!output.contains("Enter new"));
    assert_eq!(engine.get_master(7).unwrap().name, "Carol");
    assert_eq!(engine.get_master(7).unwrap().address, "Old Rd");
}

#[test]
fn test_update_non_numeric_choice_reports_input() {
    let (_temp, mut engine) = setup_temp_engine();
    engine
        .insert_master(MasterRecord::new(7, "Carol", "Old Rd").unwrap())
        .unwrap();

    let output = run_script(&mut engine, "update-m\n7\nname\nupdate-m\n7\n256\nexit\n");

    assert!(output.contains("Error: Invalid value: `name` is not a field number"));
    assert!(output.contains("Error: Invalid value: `256` is not a field number"));
    assert!(!output.contains("Invalid field selection: 0"));
    assert_eq!(engine.get_master(7).unwrap().name, "Carol");
}

#[test]
fn test_update_slave_price() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(
        &mut engine,
        "insert-m\n1\nA\nB\ninsert-s\n1\n10\nT\nAu\n2.0\nupdate-s\n1\n10\n3\n7.75\nexit\n",
    );

    assert!(output.contains("Enter new Price: "));
    assert!(output.contains("Book 10 of buyer 1 updated."));
    assert_eq!(engine.get_slave(1, 10).unwrap().price, 7.75);
}

#[test]
fn test_update_missing_slave_skips_choice() {
    let (_temp, mut engine) = setup_temp_engine();
    engine
        .insert_master(MasterRecord::new(1, "A", "B").unwrap())
        .unwrap();

    let output = run_script(&mut engine, "update-s\n1\n99\nexit\n");

    assert!(output.contains("Error: slave 99 of master 1 not found"));
    assert!(!output.contains("Select field"));
}

// =============================================================================
// Termination Tests
// =============================================================================

#[test]
fn test_end_of_input_ends_session() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "insert-m\n1\nA\nB\n");

    assert!(output.contains("Buyer 1 inserted"));
    assert_eq!(engine.get_master(1).unwrap().name, "A");
}

#[test]
fn test_end_of_input_mid_command_ends_session() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "insert-m\n1\nA\n");

    assert!(output.ends_with("Enter Address: "));
    assert!(engine.index().is_empty());
}

#[test]
fn test_check_command() {
    let (_temp, mut engine) = setup_temp_engine();

    let output = run_script(&mut engine, "insert-m\n1\nA\nB\ncheck\nexit\n");

    assert!(output.contains("1 of 1 buyer records valid, 0 of 0 book records valid."));
    assert!(output.contains("All invariants hold."));
}
