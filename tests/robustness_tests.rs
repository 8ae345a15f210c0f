use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_rows_are_skipped() {
    let file = common::commands_file(&[
        "open, 1, , money, 10, 20, 100,",
        // Unknown operation
        "settle, 1, 10",
        // Missing caller
        "confirm-sent, 1, ",
        // Non-integer transaction id
        "confirm, abc, 10",
        // Unknown payment mode
        "open, 2, , credit, 10, 20, 200,",
        "confirm-sent, 1, 10",
    ]);

    let mut cmd = Command::new(cargo_bin!("settlement-engine"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains(
            "1,100,money,10,20,partially_confirmed,true,false,",
        ))
        .stdout(predicate::str::contains("\n2,").not());
}

#[test]
fn test_invalid_commands_do_not_stop_processing() {
    let file = common::commands_file(&[
        // Unknown transaction
        "confirm, 7, 10",
        // Employer cannot be the worker
        "open, 1, , barter, 10, 10, 100,",
        "open, 2, , barter, 10, 20, 200,",
        // Duplicate id
        "open, 2, , money, 30, 40, 201,",
        // Money operation on a barter transaction
        "confirm-sent, 2, 10",
        "confirm-exchange, 2, 10",
    ]);

    let mut cmd = Command::new(cargo_bin!("settlement-engine"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Transaction 7 not found"))
        .stderr(predicate::str::contains("Employer and worker must be different parties"))
        .stderr(predicate::str::contains("Transaction 2 already exists"))
        .stderr(predicate::str::contains("WrongPaymentMode"))
        .stdout(predicate::str::contains(
            "2,200,barter,10,20,partially_confirmed,true,false,",
        ));
}

#[test]
fn test_boundary_identifiers() {
    let file = common::commands_file(&[
        "open, 4294967295, , money, 0, 4294967295, 4294967295,",
        "confirm, 4294967295, 0",
        "confirm, 4294967295, 4294967295",
    ]);

    let mut cmd = Command::new(cargo_bin!("settlement-engine"));
    cmd.arg(file.path());

    cmd.assert().success().stdout(predicate::str::contains(
        "4294967295,4294967295,money,0,4294967295,completed,true,true,",
    ));
}
