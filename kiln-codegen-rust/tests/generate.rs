//! End-to-end generation against a fake toolchain.

use std::{
    fs,
    path::{Path, PathBuf},
};

use kiln_codegen::{
    FileKind, GeneratedFile, SpecificationError,
    pipeline::{BuildPipeline, BuildStatus, CancellationToken, SyntaxChecker},
    testing::{FakeToolchain, ToolchainCall},
};
use kiln_codegen_rust::{
    GenerateOptions, Generator, RequestError, RustSyntaxChecker, TomlSyntaxChecker, run_request,
};
use kiln_spec::{CompileMode, Specification, parse_specification};
use quote::ToTokens;
use tempfile::TempDir;

const SHOP: &str = r#"
[project]
name = "shop"
archetype = "microservice"

[[entities]]
name = "Order"
description = "A customer order"

[[entities.fields]]
name = "id"
type = "uuid"
required = true

[[entities.fields]]
name = "TotalAmount"
type = "decimal"
required = true
validation = ["min:0"]

[[entities.fields]]
name = "status"
type = "enum"
values = ["pending", "shipped"]
default = "pending"

[[entities.fields]]
name = "reference"
type = "text"
unique = true
validation = ["pattern:^[A-Z]{3}-[0-9]+$"]

[[entities.relationships]]
name = "items"
kind = "one-to-many"
target = "OrderItem"
foreign_key = "order_id"

[[entities]]
name = "OrderItem"

[[entities.fields]]
name = "order_id"
type = "uuid"
required = true

[[entities.fields]]
name = "quantity"
type = "integer"
required = true
min = 1

[[entities.fields]]
name = "type"
type = "text"
"#;

fn spec(content: &str) -> Specification {
    parse_specification(content, "kiln.toml").unwrap()
}

fn options(root: &Path) -> GenerateOptions {
    GenerateOptions {
        root: root.to_path_buf(),
        mode: CompileMode::Check,
        timeout: std::time::Duration::from_secs(5),
        binary_output: None,
        templates: None,
        cancel: CancellationToken::new(),
    }
}

#[test]
fn order_scenario_degrades_decimal_rule_to_warning() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let toolchain = FakeToolchain::succeeding();

    let report = run_request(&spec(SHOP), &options(&root), &toolchain).unwrap();

    assert!(
        report.validation_issues.is_empty(),
        "{:#?}",
        report.validation_issues
    );
    assert!(report.success());
    assert!(root.join("src/models/order.rs").is_file());
    assert!(root.join("src/models/order_new.rs").is_file());

    let warning = report
        .warnings
        .iter()
        .find(|w| w.location.as_deref() == Some("Order.TotalAmount"))
        .expect("decimal min rule is reported");
    assert!(warning.severity.is_warning());
    assert!(warning.message.contains("min:0"));

    let model = fs::read_to_string(root.join("src/models/order.rs")).unwrap();
    assert!(model.contains("pub total_amount: rust_decimal::Decimal,"));
    assert!(!model.contains("range("));

    assert_eq!(
        toolchain.calls(),
        vec![ToolchainCall::Check { root: root.clone() }]
    );
}

#[test]
fn unknown_archetype_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let toolchain = FakeToolchain::succeeding();
    let content = SHOP.replace("microservice", "unknown-type");

    let err = run_request(&spec(&content), &options(&root), &toolchain).unwrap_err();

    assert!(matches!(
        err,
        RequestError::Specification(SpecificationError::UnknownArchetype { .. })
    ));
    assert!(!root.exists());
    assert!(toolchain.calls().is_empty());
}

#[test]
fn build_mode_needs_a_binary_archetype() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let toolchain = FakeToolchain::succeeding();
    let content = SHOP.replace("microservice", "library");
    let options = GenerateOptions {
        mode: CompileMode::Build,
        ..options(&root)
    };

    let err = run_request(&spec(&content), &options, &toolchain).unwrap_err();

    assert!(matches!(
        err,
        RequestError::Specification(SpecificationError::BuildWithoutBinary { ref archetype })
            if archetype == "library"
    ));
    assert!(!root.exists());
    assert!(toolchain.calls().is_empty());
}

#[test]
fn unresolved_relationship_fails_before_rendering() {
    let spec = Specification {
        entities: spec(SHOP)
            .entities
            .into_iter()
            .filter(|e| e.name == "Order")
            .collect(),
        ..spec(SHOP)
    };

    let err = Generator::new(&spec).render(Path::new("/tmp/shop")).unwrap_err();
    assert!(matches!(
        err,
        SpecificationError::UnresolvedRelationship { ref target, .. } if target == "OrderItem"
    ));
}

#[test]
fn malformed_pattern_becomes_a_warning() {
    let content = SHOP.replace("^[A-Z]{3}-[0-9]+$", "[A-Z");
    let spec = spec(&content);
    let generated = Generator::new(&spec).render(Path::new("/tmp/shop")).unwrap();

    let warning = generated
        .warnings
        .iter()
        .find(|w| w.location.as_deref() == Some("Order.reference"))
        .expect("malformed pattern is reported");
    assert!(warning.severity.is_warning());
    assert!(warning.message.contains("[A-Z"));

    let model = generated
        .accumulator
        .files()
        .iter()
        .find(|f| f.path == Path::new("src/models/order.rs"))
        .unwrap();
    assert!(!model.content.contains("Regex::new"));
    assert!(!model.content.contains("regex(path"));
}

#[test]
fn broken_file_is_reported_and_siblings_still_compile() {
    let temp = TempDir::new().unwrap();
    let spec = spec(SHOP);
    let mut generated = Generator::new(&spec).render(temp.path()).unwrap();
    generated.accumulator.append(GeneratedFile::new(
        "src/models/broken.rs",
        "crate::models::broken",
        "pub struct Broken {\n    id: u64\n    name: String,\n}\n",
        FileKind::Model,
    ));

    let toolchain = FakeToolchain::succeeding();
    let report = BuildPipeline::new(&toolchain)
        .with_checker(RustSyntaxChecker)
        .with_checker(TomlSyntaxChecker)
        .run(&generated.skeleton, generated.accumulator, generated.warnings)
        .unwrap();

    assert_eq!(report.validation_issues.len(), 1);
    let issue = &report.validation_issues[0];
    assert_eq!(issue.file, PathBuf::from("src/models/broken.rs"));
    assert_eq!(issue.line, Some(3));
    assert!(issue.severity.is_error());

    assert!(report.file_paths.contains(&PathBuf::from("src/models/order.rs")));
    assert!(report.file_paths.contains(&PathBuf::from("src/models/broken.rs")));
    assert!(report.build_result.is_some());
    assert!(!report.success());
}

#[test]
fn generated_struct_round_trips_through_syn() {
    let spec = spec(SHOP);
    let generated = Generator::new(&spec).render(Path::new("/tmp/shop")).unwrap();
    let model = generated
        .accumulator
        .files()
        .iter()
        .find(|f| f.path == Path::new("src/models/order_item.rs"))
        .unwrap();

    assert!(RustSyntaxChecker.check(&model.path, &model.content).is_none());
    let file = syn::parse_file(&model.content).unwrap();
    let fields: Vec<(String, String)> = file
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Struct(s) if s.ident == "OrderItem" => Some(&s.fields),
            _ => None,
        })
        .unwrap()
        .iter()
        .map(|f| {
            (
                f.ident.as_ref().unwrap().to_string(),
                f.ty.to_token_stream().to_string().replace(' ', ""),
            )
        })
        .collect();

    assert_eq!(
        fields,
        vec![
            ("order_id".to_string(), "uuid::Uuid".to_string()),
            ("quantity".to_string(), "i32".to_string()),
            ("r#type".to_string(), "Option<String>".to_string()),
        ]
    );
}

#[test]
fn regenerating_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let toolchain = FakeToolchain::succeeding();
    let spec = spec(SHOP);
    let options = GenerateOptions {
        mode: CompileMode::None,
        ..options(&root)
    };

    let first = run_request(&spec, &options, &toolchain).unwrap();
    fs::write(root.join("README.md"), "# my notes\n").unwrap();
    let second = run_request(&spec, &options, &toolchain).unwrap();

    assert_eq!(first.file_paths, second.file_paths);
    assert!(first.skipped_paths.is_empty());
    assert!(second.skipped_paths.contains(&PathBuf::from("README.md")));
    assert_eq!(
        fs::read_to_string(root.join("README.md")).unwrap(),
        "# my notes\n"
    );
    assert!(second.build_result.is_none());
    assert!(toolchain.calls().is_empty());
}

#[test]
fn entity_without_key_uses_positions() {
    let content = r#"
[project]
name = "notes"
archetype = "library"

[[entities]]
name = "Note"

[[entities.fields]]
name = "body"
type = "text"
required = true
"#;
    let spec = spec(content);
    let generated = Generator::new(&spec).render(Path::new("/tmp/notes")).unwrap();
    let files = generated.accumulator.files();

    let interface = files
        .iter()
        .find(|f| f.kind == FileKind::Interface)
        .unwrap();
    assert!(interface.content.contains("fn insert(&mut self, entity: Note) -> Result<usize>;"));

    let repository = files
        .iter()
        .find(|f| f.kind == FileKind::Repository)
        .unwrap();
    assert!(repository.content.contains("rows: Vec<Option<Note>>,"));
    assert!(
        RustSyntaxChecker
            .check(&repository.path, &repository.content)
            .is_none()
    );
}

#[test]
fn build_mode_places_binary_under_bin() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let toolchain = FakeToolchain::succeeding();
    let options = GenerateOptions {
        mode: CompileMode::Build,
        ..options(&root)
    };

    let report = run_request(&spec(SHOP), &options, &toolchain).unwrap();

    assert_eq!(
        toolchain.calls(),
        vec![ToolchainCall::Build {
            root: root.clone(),
            output: PathBuf::from("bin/shop"),
        }]
    );
    let build = report.build_result.unwrap();
    assert_eq!(build.artifact, Some(root.join("bin/shop")));
}

#[test]
fn cancelled_request_skips_the_toolchain() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let toolchain = FakeToolchain::succeeding();
    let options = options(&root);
    options.cancel.cancel();

    let report = run_request(&spec(SHOP), &options, &toolchain).unwrap();

    assert!(toolchain.calls().is_empty());
    assert_eq!(
        report.build_result.map(|r| r.status),
        Some(BuildStatus::Cancelled)
    );
    assert!(root.join("src/models/order.rs").is_file());
}

#[test]
fn handlers_layer_snapshot() {
    let spec = spec(SHOP);
    let generated = Generator::new(&spec).render(Path::new("/tmp/shop")).unwrap();
    let index = generated
        .accumulator
        .files()
        .iter()
        .find(|f| f.path == Path::new("src/handlers/mod.rs"))
        .unwrap();

    insta::assert_snapshot!(index.content, @r"
    // @generated by kiln. Manual edits are overwritten.

    //! JSON handlers.

    mod order;
    mod order_item;

    pub use order::*;
    pub use order_item::*;
    ");
}
