//! Turns code elements into Rust source files.
//!
//! Models, constructors and interfaces are built with the AST builders;
//! repositories, services and handlers go through the template store so
//! a project can override them.

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use kiln_codegen::{
    CodeAccumulator, CodeElement, FileKind, GeneratedFile, Layer, TemplateError,
    element::{EnumDecl, FieldDecl, FunctionDecl, InterfaceDecl, RepositoryOp, StructDecl},
    template::{InMemoryTemplateStore, TemplateCache, TemplateRenderer, TemplateStore},
};
use kiln_core::RUST_KEYWORDS;

use crate::{
    RawCode, RustFile, Use,
    ast::{Enum, Field, Fn, Impl, Param, Struct, Trait, Variant},
    files::{GENERATED_HEADER, layer_title},
    templates::builtin_store,
};

const MODEL_DERIVES: [&str; 6] = [
    "Debug",
    "Clone",
    "PartialEq",
    "Serialize",
    "Deserialize",
    "Validate",
];

const ENUM_DERIVES: [&str; 8] = [
    "Debug",
    "Clone",
    "Copy",
    "PartialEq",
    "Eq",
    "Hash",
    "Serialize",
    "Deserialize",
];

/// Past this many parameters clippy flags a generated constructor.
const MAX_PARAMS: usize = 7;

/// Renders [`CodeElement`]s into [`GeneratedFile`]s.
pub struct RustRenderer<S = InMemoryTemplateStore> {
    templates: TemplateRenderer<S>,
}

impl RustRenderer<InMemoryTemplateStore> {
    /// Renderer backed by the built-in templates.
    pub fn new() -> Self {
        Self::with_templates(TemplateRenderer::new(
            Arc::new(builtin_store()),
            Arc::new(TemplateCache::new()),
        ))
    }
}

impl Default for RustRenderer<InMemoryTemplateStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TemplateStore> RustRenderer<S> {
    pub fn with_templates(templates: TemplateRenderer<S>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TemplateRenderer<S> {
        &self.templates
    }

    /// Render one element to `src/<layer>/<module>.rs`.
    pub fn render(&self, element: &CodeElement) -> Result<GeneratedFile, TemplateError> {
        let (body, kind) = match element {
            CodeElement::Struct(decl) => (model_file(decl), FileKind::Model),
            CodeElement::Function(decl) => (constructor_file(decl), FileKind::Constructor),
            CodeElement::Interface(decl) => (interface_file(decl), FileKind::Interface),
            CodeElement::Repository(_) => (self.render_template(element)?, FileKind::Repository),
            CodeElement::Service(_) => (self.render_template(element)?, FileKind::Service),
            CodeElement::Handler(_) => (self.render_template(element)?, FileKind::Handler),
        };

        let layer = element.layer();
        let module = element.module();
        Ok(GeneratedFile::new(
            PathBuf::from("src")
                .join(layer.dir())
                .join(format!("{module}.rs")),
            format!("crate::{}::{module}", layer.dir()),
            with_header(&body),
            kind,
        ))
    }

    /// Render every element, then one `mod.rs` per layer that received files.
    ///
    /// Stops at the first template failure; nothing is appended past it.
    pub fn render_all(
        &self,
        elements: &[CodeElement],
        accumulator: &mut CodeAccumulator,
    ) -> Result<(), TemplateError> {
        let files = elements
            .iter()
            .map(|element| self.render(element))
            .collect::<Result<Vec<_>, _>>()?;
        for file in files {
            accumulator.append(file);
        }
        for index in module_indexes(elements) {
            accumulator.append(index);
        }
        Ok(())
    }

    fn render_template(&self, element: &CodeElement) -> Result<String, TemplateError> {
        let Some((slug, params)) = element.template() else {
            return Err(TemplateError::NotFound {
                slug: element.kind().to_string(),
            });
        };
        tracing::debug!(slug, module = element.module(), "rendering template");
        self.templates.render(slug, &params)
    }
}

fn with_header(body: &str) -> String {
    format!("{GENERATED_HEADER}\n\n{}\n", body.trim_end())
}

/// Module declaration for a file stem, raw-escaped when it is a keyword.
fn module_ident(module: &str) -> String {
    if RUST_KEYWORDS.contains(&module) {
        format!("r#{module}")
    } else {
        module.to_string()
    }
}

/// `mod.rs` for each layer that has elements, in layer order.
///
/// Constructor modules only add inherent impls and are declared without a
/// glob re-export.
pub fn module_indexes(elements: &[CodeElement]) -> Vec<GeneratedFile> {
    let mut layers: BTreeMap<Layer, Vec<(&str, bool)>> = BTreeMap::new();
    for element in elements {
        let modules = layers.entry(element.layer()).or_default();
        if !modules.iter().any(|(m, _)| *m == element.module()) {
            let reexport = !matches!(element, CodeElement::Function(_));
            modules.push((element.module(), reexport));
        }
    }

    layers
        .into_iter()
        .map(|(layer, modules)| {
            let declarations = modules
                .iter()
                .map(|(m, _)| format!("mod {};", module_ident(m)));
            let reexports = modules
                .iter()
                .filter(|(_, reexport)| *reexport)
                .map(|(m, _)| format!("pub use {}::*;", module_ident(m)));
            let content = RustFile::new()
                .module_doc(format!("{}.", layer_title(layer)))
                .add(RawCode::lines(declarations))
                .add(RawCode::lines(reexports))
                .render();
            GeneratedFile::new(
                PathBuf::from("src").join(layer.dir()).join("mod.rs"),
                format!("crate::{}", layer.dir()),
                with_header(&content),
                FileKind::ModuleIndex,
            )
        })
        .collect()
}

fn model_file(decl: &StructDecl) -> String {
    let mut file = RustFile::new()
        .module_doc(format!("`{}` model.", decl.name))
        .use_stmt(Use::new("serde").symbols(["Deserialize", "Serialize"]))
        .use_stmt(Use::new("validator").symbol("Validate"));
    if !decl.patterns.is_empty() {
        file = file
            .use_stmt(Use::new("std::sync").symbol("LazyLock"))
            .use_stmt(Use::new("regex").symbol("Regex"));
    }
    if !decl.imports.is_empty() {
        file = file.use_stmt(Use::new("super").symbols(&decl.imports));
    }

    for pattern in &decl.patterns {
        file = file.add(RawCode::lines([
            format!("static {}: LazyLock<Regex> =", pattern.name),
            format!(
                "    LazyLock::new(|| Regex::new({:?}).expect(\"pattern compiles\"));",
                pattern.regex
            ),
        ]));
    }

    let model = decl.fields.iter().fold(
        Struct::new(&decl.name)
            .doc(
                decl.doc
                    .clone()
                    .unwrap_or_else(|| format!("A `{}` row.", decl.name)),
            )
            .derives(MODEL_DERIVES),
        |model, field| model.field(member(field)),
    );

    file.add_all(decl.enums.iter().map(enum_node))
        .add(model)
        .render()
}

fn member(field: &FieldDecl) -> Field {
    let mut member = Field::new(&field.ident, &field.ty)
        .attr_list("serde", &field.serde)
        .attr_list("validate", &field.validate);
    if let Some(doc) = &field.doc {
        member = member.doc(doc);
    }
    member
}

fn enum_node(decl: &EnumDecl) -> Enum {
    let mut node = Enum::new(&decl.name)
        .doc(
            decl.doc
                .clone()
                .unwrap_or_else(|| format!("Values of `{}`.", decl.name)),
        )
        .derives(ENUM_DERIVES);
    if decl.default_variant.is_some() {
        node = node.derive("Default");
    }

    for value in &decl.variants {
        let mut variant = Variant::new(&value.ident);
        if decl.default_variant.as_deref() == Some(value.ident.as_str()) {
            variant = variant.attr("default");
        }
        if value.ident != value.value {
            variant = variant.attr(format!("serde(rename = {:?})", value.value));
        }
        node = node.variant(variant);
    }
    node
}

fn constructor_file(decl: &FunctionDecl) -> String {
    let mut body = vec!["Self {".to_string()];
    body.extend(decl.inits.iter().map(|init| {
        if init.expr == init.ident {
            format!("    {},", init.ident)
        } else {
            format!("    {}: {},", init.ident, init.expr)
        }
    }));
    body.push("}".to_string());

    let mut function = decl
        .params
        .iter()
        .fold(Fn::new(&decl.name), |f, p| f.param(Param::new(&p.name, &p.ty)))
        .doc(
            decl.doc
                .clone()
                .unwrap_or_else(|| format!("Create a `{}` from its required fields.", decl.owner)),
        )
        .returns("Self")
        .body(body.join("\n"));
    if decl.params.len() > MAX_PARAMS {
        function = function.attr("allow(clippy::too_many_arguments)");
    }

    let mut file = RustFile::new().module_doc(format!("Constructor for `{}`.", decl.owner));
    let mut imports = vec![decl.owner.clone()];
    imports.extend(decl.imports.iter().filter(|i| **i != decl.owner).cloned());
    file = file.use_stmt(Use::new("super").symbols(imports));

    file.add(Impl::new(&decl.owner).method(function)).render()
}

fn interface_file(decl: &InterfaceDecl) -> String {
    let key = &decl.key_ty;
    let entity = &decl.entity;
    let interface = decl.operations.iter().fold(
        Trait::new(&decl.name).doc(format!("Storage for `{entity}` rows keyed by `{key}`.")),
        |interface, op| {
            interface.method(match op {
                RepositoryOp::Insert => Fn::new("insert")
                    .doc("Store a new row and return its key.")
                    .param(Param::receiver("&mut self"))
                    .param(Param::new("entity", entity))
                    .returns(format!("Result<{key}>")),
                RepositoryOp::Get => Fn::new("get")
                    .param(Param::receiver("&self"))
                    .param(Param::new("key", format!("&{key}")))
                    .returns(format!("Result<{entity}>")),
                RepositoryOp::List => Fn::new("list")
                    .doc("Every stored row, in key order.")
                    .param(Param::receiver("&self"))
                    .returns(format!("Result<Vec<{entity}>>")),
                RepositoryOp::Update => Fn::new("update")
                    .doc("Replace the row at `key`, returning the stored value.")
                    .param(Param::receiver("&mut self"))
                    .param(Param::new("key", format!("&{key}")))
                    .param(Param::new("entity", entity))
                    .returns(format!("Result<{entity}>")),
                RepositoryOp::Delete => Fn::new("delete")
                    .doc("Remove the row at `key`, returning it.")
                    .param(Param::receiver("&mut self"))
                    .param(Param::new("key", format!("&{key}")))
                    .returns(format!("Result<{entity}>")),
            })
        },
    );

    RustFile::new()
        .module_doc(format!("Storage interface for `{entity}`."))
        .use_stmt(Use::new("crate::error").symbol("Result"))
        .use_stmt(Use::new("crate::models").symbol(entity))
        .add(interface)
        .render()
}

#[cfg(test)]
mod tests {
    use kiln_codegen::element::{
        FieldInit, ParamDecl, PatternDecl, RepositoryDecl, VariantDecl,
    };

    use super::*;

    fn field(ident: &str, ty: &str) -> FieldDecl {
        FieldDecl {
            name: ident.to_string(),
            ident: ident.to_string(),
            ty: ty.to_string(),
            optional: false,
            serde: Vec::new(),
            validate: Vec::new(),
            doc: None,
            relation: None,
        }
    }

    fn order() -> StructDecl {
        StructDecl {
            name: "Order".into(),
            module: "order".into(),
            doc: None,
            fields: vec![
                field("id", "uuid::Uuid"),
                FieldDecl {
                    validate: vec!["length(min = 1)".into()],
                    ..field("code", "String")
                },
                field("status", "OrderStatus"),
            ],
            enums: vec![EnumDecl {
                name: "OrderStatus".into(),
                doc: None,
                variants: vec![
                    VariantDecl {
                        ident: "Pending".into(),
                        value: "pending".into(),
                    },
                    VariantDecl {
                        ident: "Shipped".into(),
                        value: "Shipped".into(),
                    },
                ],
                default_variant: Some("Pending".into()),
            }],
            patterns: Vec::new(),
            imports: Vec::new(),
        }
    }

    #[test]
    fn test_model_file_layout() {
        let code = model_file(&order());

        assert!(code.starts_with(
            "//! `Order` model.\n\nuse serde::{Deserialize, Serialize};\nuse validator::Validate;\n"
        ));
        assert!(code.contains(
            "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]\n\
             pub enum OrderStatus {\n    #[default]\n    #[serde(rename = \"pending\")]\n    Pending,\n    Shipped,\n}"
        ));
        assert!(code.contains("    #[validate(length(min = 1))]\n    pub code: String,\n"));
        assert!(code.contains("    pub status: OrderStatus,\n}"));
    }

    #[test]
    fn test_model_file_patterns() {
        let decl = StructDecl {
            patterns: vec![PatternDecl {
                name: "ORDER_CODE_PATTERN".into(),
                regex: r"^[A-Z]{3}-\d+$".into(),
            }],
            ..order()
        };
        let code = model_file(&decl);

        assert!(code.starts_with("//! `Order` model.\n\nuse std::sync::LazyLock;\n\n"));
        assert!(code.contains("use validator::Validate;\nuse regex::Regex;\n"));
        assert!(code.contains(
            "static ORDER_CODE_PATTERN: LazyLock<Regex> =\n    \
             LazyLock::new(|| Regex::new(\"^[A-Z]{3}-\\\\d+$\").expect(\"pattern compiles\"));"
        ));
    }

    #[test]
    fn test_constructor_file() {
        let decl = FunctionDecl {
            name: "new".into(),
            owner: "Order".into(),
            module: "order_new".into(),
            doc: None,
            params: vec![ParamDecl {
                name: "code".into(),
                ty: "String".into(),
            }],
            inits: vec![
                FieldInit {
                    ident: "code".into(),
                    expr: "code".into(),
                },
                FieldInit {
                    ident: "status".into(),
                    expr: "OrderStatus::Pending".into(),
                },
            ],
            imports: vec!["OrderStatus".into()],
        };

        assert_eq!(
            constructor_file(&decl),
            "//! Constructor for `Order`.\n\n\
             use super::{Order, OrderStatus};\n\n\
             impl Order {\n    \
             /// Create a `Order` from its required fields.\n    \
             pub fn new(code: String) -> Self {\n        \
             Self {\n            code,\n            status: OrderStatus::Pending,\n        }\n    \
             }\n}\n"
        );
    }

    #[test]
    fn test_interface_file() {
        let decl = InterfaceDecl {
            name: "OrderRepository".into(),
            entity: "Order".into(),
            module: "order".into(),
            key_ty: "uuid::Uuid".into(),
            operations: RepositoryOp::ALL.to_vec(),
        };
        let code = interface_file(&decl);

        assert!(code.contains("use crate::error::Result;\nuse crate::models::Order;\n"));
        assert!(code.contains("pub trait OrderRepository {"));
        assert!(code.contains("    fn insert(&mut self, entity: Order) -> Result<uuid::Uuid>;"));
        assert!(code.contains("    fn get(&self, key: &uuid::Uuid) -> Result<Order>;"));
        assert!(code.contains(
            "    fn update(&mut self, key: &uuid::Uuid, entity: Order) -> Result<Order>;"
        ));
    }

    #[test]
    fn test_render_paths_and_header() {
        let renderer = RustRenderer::new();
        let file = renderer.render(&CodeElement::Struct(order())).unwrap();

        assert_eq!(file.path, PathBuf::from("src/models/order.rs"));
        assert_eq!(file.namespace, "crate::models::order");
        assert_eq!(file.kind, FileKind::Model);
        assert!(file.content.starts_with(GENERATED_HEADER));
        assert!(file.content.ends_with("}\n"));
    }

    #[test]
    fn test_render_template_element() {
        let renderer = RustRenderer::new();
        let element = CodeElement::Repository(RepositoryDecl {
            name: "OrderMemory".into(),
            entity: "Order".into(),
            interface: "OrderRepository".into(),
            module: "order_memory".into(),
            key_ty: "uuid::Uuid".into(),
            key_field: Some("id".into()),
            unique_fields: Vec::new(),
            table: "orders".into(),
            ddl_const: "ORDERS_DDL".into(),
            ddl: "CREATE TABLE orders (id UUID PRIMARY KEY);".into(),
        });
        let file = renderer.render(&element).unwrap();

        assert_eq!(file.path, PathBuf::from("src/repositories/order_memory.rs"));
        assert_eq!(file.kind, FileKind::Repository);
        assert!(file.content.contains("impl OrderRepository for OrderMemory"));
    }

    #[test]
    fn test_module_indexes() {
        let elements = vec![
            CodeElement::Struct(order()),
            CodeElement::Function(FunctionDecl {
                name: "new".into(),
                owner: "Order".into(),
                module: "order_new".into(),
                doc: None,
                params: Vec::new(),
                inits: Vec::new(),
                imports: Vec::new(),
            }),
            CodeElement::Struct(StructDecl {
                name: "Type".into(),
                module: "type".into(),
                ..order()
            }),
        ];
        let indexes = module_indexes(&elements);

        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].path, PathBuf::from("src/models/mod.rs"));
        assert_eq!(
            indexes[0].content,
            format!(
                "{GENERATED_HEADER}\n\n//! Entity models.\n\n\
                 mod order;\nmod order_new;\nmod r#type;\n\n\
                 pub use order::*;\npub use r#type::*;\n"
            )
        );
    }
}
