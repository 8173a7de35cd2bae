//! Generated projects must pass `cargo check`.
//!
//! These run the real toolchain and fetch the generated crate's
//! dependencies, so they are ignored by default:
//! `cargo test -p kiln-codegen-rust --test generated_compiles -- --ignored`

use std::{path::Path, time::Duration};

use kiln_codegen_rust::{CargoToolchain, GenerateOptions, run_request};
use kiln_spec::{CompileMode, parse_specification};
use tempfile::TempDir;

fn assert_generated_code_compiles(spec_toml: &str) {
    let spec = parse_specification(spec_toml, "kiln.toml").expect("failed to parse specification");
    let temp = TempDir::new().expect("failed to create temp dir");
    let mut options = GenerateOptions::from_spec(&spec, temp.path());
    options.root = temp.path().to_path_buf();
    options.mode = CompileMode::Check;
    options.timeout = Duration::from_secs(600);

    let report = run_request(&spec, &options, &CargoToolchain::new()).expect("generation failed");

    if !report.success() {
        print_generated_files(temp.path());
        let build = report.build_result.unwrap_or_else(|| panic!("no build result"));
        panic!(
            "generated code failed to compile!\n\nissues: {:#?}\n\nstdout:\n{}\n\nstderr:\n{}",
            report.validation_issues, build.stdout, build.stderr
        );
    }
}

fn print_generated_files(dir: &Path) {
    fn print_dir(dir: &Path, indent: usize) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "target" {
                continue;
            }
            if path.is_dir() {
                eprintln!("{:indent$}{name}/", "");
                print_dir(&path, indent + 2);
            } else if path.extension().is_some_and(|e| e == "rs" || e == "toml") {
                eprintln!("{:indent$}{name}", "");
                if let Ok(content) = std::fs::read_to_string(&path) {
                    for line in content.lines() {
                        eprintln!("{:indent$}  | {line}", "");
                    }
                }
            }
        }
    }
    print_dir(dir, 0);
}

#[test]
#[ignore = "runs cargo and needs the crates registry"]
fn test_library_compiles() {
    assert_generated_code_compiles(
        r#"
        [project]
        name = "notes"
        archetype = "library"

        [[entities]]
        name = "Note"

        [[entities.fields]]
        name = "body"
        type = "text"
        required = true
        max_length = 500

        [[entities.fields]]
        name = "tags"
        type = "tags"
        "#,
    );
}

#[test]
#[ignore = "runs cargo and needs the crates registry"]
fn test_microservice_compiles() {
    assert_generated_code_compiles(
        r#"
        [project]
        name = "shop"
        archetype = "microservice"

        [[entities]]
        name = "Customer"

        [[entities.fields]]
        name = "id"
        type = "bigint"
        required = true

        [[entities.fields]]
        name = "email"
        type = "email"
        required = true
        unique = true

        [[entities.fields]]
        name = "tier"
        type = "enum"
        values = ["basic", "gold"]
        default = "basic"

        [[entities]]
        name = "Order"

        [[entities.fields]]
        name = "id"
        type = "uuid"
        required = true

        [[entities.fields]]
        name = "customer_id"
        type = "bigint"
        required = true

        [[entities.fields]]
        name = "total"
        type = "decimal"
        required = true
        validation = ["min:0"]

        [[entities.fields]]
        name = "placed_at"
        type = "timestamp"

        [[entities.fields]]
        name = "code"
        type = "text"
        validation = ["pattern:^[A-Z]{3}-[0-9]+$"]

        [[entities.relationships]]
        name = "customer"
        kind = "many-to-one"
        target = "Customer"
        foreign_key = "customer_id"
        "#,
    );
}

#[test]
#[ignore = "runs cargo and needs the crates registry"]
fn test_build_with_separate_target_dir() {
    let spec = parse_specification(
        r#"
        [project]
        name = "tally"
        archetype = "cli"

        [[entities]]
        name = "Count"

        [[entities.fields]]
        name = "value"
        type = "unsigned"
        required = true
        "#,
        "kiln.toml",
    )
    .expect("failed to parse specification");
    let root = TempDir::new().expect("failed to create temp dir");
    let target = TempDir::new().expect("failed to create target dir");
    let mut options = GenerateOptions::from_spec(&spec, root.path());
    options.mode = CompileMode::Build;
    options.timeout = Duration::from_secs(600);
    let toolchain = CargoToolchain::new().with_env("CARGO_TARGET_DIR", target.path());

    let report = run_request(&spec, &options, &toolchain).expect("generation failed");

    let build = report.build_result.expect("build ran");
    assert!(build.success(), "stderr:\n{}", build.stderr);
    let artifact = build.artifact.expect("binary copied");
    assert!(artifact.is_file());
    assert!(!root.path().join("target").exists());
}
