//! Test doubles for pipelines and mappers.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::path::{Path, PathBuf};

use kiln_core::{RUST_KEYWORDS, to_pascal_case, to_snake_case};
use kiln_spec::Literal;
use parking_lot::Mutex;

use crate::{
    NamingConvention,
    mapping::{
        DroppedRule, MemberContext, RuleTranslation, TypeClass, TypeMapper, TypeMapping,
        ValidationRule,
    },
    pipeline::{BuildResult, Invocation, Toolchain},
};

/// One recorded toolchain invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainCall {
    Check { root: PathBuf },
    Build { root: PathBuf, output: PathBuf },
}

/// Toolchain that records calls and returns a canned result.
#[derive(Debug)]
pub struct FakeToolchain {
    result: BuildResult,
    calls: Mutex<Vec<ToolchainCall>>,
}

impl FakeToolchain {
    pub fn new(result: BuildResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(BuildResult::succeeded(std::time::Duration::from_millis(10)))
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self::new(
            BuildResult::failed(Some(exit_code), std::time::Duration::from_millis(10))
                .with_output("", stderr),
        )
    }

    pub fn calls(&self) -> Vec<ToolchainCall> {
        self.calls.lock().clone()
    }
}

impl Toolchain for FakeToolchain {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn check(&self, root: &Path, _invocation: &Invocation) -> BuildResult {
        self.calls.lock().push(ToolchainCall::Check {
            root: root.to_path_buf(),
        });
        self.result.clone()
    }

    fn build(&self, root: &Path, output: &Path, _invocation: &Invocation) -> BuildResult {
        self.calls.lock().push(ToolchainCall::Build {
            root: root.to_path_buf(),
            output: output.to_path_buf(),
        });
        self.result.clone().with_artifact(root.join(output))
    }
}

const STUB_NAMING: NamingConvention = NamingConvention {
    to_type: to_pascal_case,
    to_module: to_snake_case,
    to_member: to_snake_case,
    to_constant: |s| to_snake_case(s).to_uppercase(),
    reserved_words: RUST_KEYWORDS,
    escape_reserved: |s| format!("r#{s}"),
};

const fn row(
    names: &'static [&'static str],
    target: &'static str,
    storage: &'static str,
    class: TypeClass,
    key_capable: bool,
) -> TypeMapping {
    TypeMapping {
        names,
        target,
        serde: None,
        serde_optional: None,
        validation: None,
        storage,
        class,
        key_capable,
    }
}

static STUB_TABLE: &[TypeMapping] = &[
    row(&["text", "string"], "String", "TEXT", TypeClass::Text, true),
    row(&["integer", "int"], "i64", "BIGINT", TypeClass::Integer, true),
    row(&["decimal"], "Decimal", "NUMERIC", TypeClass::Decimal, false),
    row(&["uuid", "identifier"], "Uuid", "UUID", TypeClass::Text, true),
    row(&["enum"], "String", "TEXT", TypeClass::Enumerated, true),
];

static STUB_OPAQUE: TypeMapping = row(&["opaque"], "Value", "JSONB", TypeClass::Opaque, false);

/// Minimal Rust-flavored mapper for exercising dispatch without a real target.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubMapper;

impl TypeMapper for StubMapper {
    fn language(&self) -> &'static str {
        "stub"
    }

    fn table(&self) -> &'static [TypeMapping] {
        STUB_TABLE
    }

    fn opaque(&self) -> &'static TypeMapping {
        &STUB_OPAQUE
    }

    fn naming(&self) -> &NamingConvention {
        &STUB_NAMING
    }

    fn optional_of(&self, ty: &str) -> String {
        format!("Option<{ty}>")
    }

    fn list_of(&self, ty: &str) -> String {
        format!("Vec<{ty}>")
    }

    fn boxed(&self, ty: &str) -> String {
        format!("Box<{ty}>")
    }

    fn none_expr(&self) -> &'static str {
        "None"
    }

    fn some_expr(&self, expr: &str) -> String {
        format!("Some({expr})")
    }

    fn empty_list_expr(&self) -> &'static str {
        "Vec::new()"
    }

    fn position_key(&self) -> &'static str {
        "usize"
    }

    fn translate_rules(
        &self,
        member: &MemberContext<'_>,
        rules: &[ValidationRule],
    ) -> RuleTranslation {
        let mut translation = RuleTranslation::default();
        for rule in rules {
            match rule {
                ValidationRule::Min(_) | ValidationRule::Max(_)
                    if member.mapping.class == TypeClass::Decimal =>
                {
                    translation.dropped.push(DroppedRule {
                        rule: rule.clone(),
                        reason: "no numeric bound for decimal members".into(),
                    })
                }
                ValidationRule::MaxLength(n) => {
                    translation.annotations.push(format!("length(max = {n})"))
                }
                ValidationRule::Email => translation.annotations.push("email".into()),
                ValidationRule::Unsupported(_) => translation.dropped.push(DroppedRule {
                    rule: rule.clone(),
                    reason: "unrecognized rule".into(),
                }),
                _ => {}
            }
        }
        translation
    }

    fn default_expr(
        &self,
        mapping: &TypeMapping,
        literal: &Literal,
        enum_type: Option<&str>,
    ) -> Option<String> {
        match (literal, enum_type) {
            (Literal::String(value), Some(ty)) => Some(format!("{ty}::{}", to_pascal_case(value))),
            (Literal::String(value), None) if mapping.class == TypeClass::Text => {
                Some(format!("{value:?}.to_string()"))
            }
            (Literal::Integer(i), None) if mapping.class == TypeClass::Integer => {
                Some(i.to_string())
            }
            (Literal::Bool(b), None) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Run `f` against a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn in_temp_dir<F, T>(f: F) -> std::io::Result<(tempfile::TempDir, T)>
where
    F: FnOnce(&Path) -> T,
{
    let temp_dir = tempfile::TempDir::new()?;
    let value = f(temp_dir.path());
    Ok((temp_dir, value))
}
