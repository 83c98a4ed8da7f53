//! A Java source document tree with a dedicated pretty-printer.
//!
//! Generators assemble [`JavaFile`] values from derived facts; only the
//! printer below knows how Java source is laid out. Annotations and method
//! body statements are carried as opaque lines; the tree models the parts
//! whose structure the generators actually reason about (package, imports,
//! type shape, fields, method signatures).

use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct JavaFile {
    /// Package name, without trailing semicolon
    pub package: String,
    /// Import statements, one per entry, without the `import ` prefix
    pub imports: Vec<String>,
    /// Optional block comment emitted before the package line
    pub banner: Option<String>,
    pub decl: TypeDecl,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub annotations: Vec<String>,
    pub kind: TypeKind,
    /// Type name, including any generic parameters
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
    /// Record with its component list, e.g. `String code, String message`
    Record(String),
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(Field),
    Method(Method),
    /// One enum constant line, e.g. `NOT_FOUND,`
    Constant(String),
    /// `static { ... }` initializer body lines
    StaticInit(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub annotations: Vec<String>,
    /// e.g. `private`, `private final`
    pub modifiers: String,
    pub ty: String,
    pub name: String,
    pub init: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub annotations: Vec<String>,
    /// e.g. `public`, `private`, `default`; empty for interface members
    pub modifiers: String,
    /// Return type; empty for constructors
    pub ret: String,
    pub name: String,
    /// Raw parameter list text
    pub params: String,
    /// Body statement lines (already relative-indented); `None` renders an
    /// abstract/interface declaration ending in `;`
    pub body: Option<Vec<String>>,
}

impl Method {
    /// Interface method without a body.
    pub fn abstract_sig(ret: &str, name: &str, params: &str) -> Self {
        Self {
            annotations: Vec::new(),
            modifiers: String::new(),
            ret: ret.to_string(),
            name: name.to_string(),
            params: params.to_string(),
            body: None,
        }
    }
}

impl JavaFile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(banner) = &self.banner {
            let _ = writeln!(out, "/* {banner} */");
        }
        let _ = writeln!(out, "package {};", self.package);
        if !self.imports.is_empty() {
            out.push('\n');
            for import in &self.imports {
                let _ = writeln!(out, "import {import};");
            }
        }
        out.push('\n');
        self.write_decl(&mut out);
        out
    }

    fn write_decl(&self, out: &mut String) {
        let decl = &self.decl;
        for annotation in &decl.annotations {
            let _ = writeln!(out, "{annotation}");
        }
        let keyword = match &decl.kind {
            TypeKind::Class => "public class".to_string(),
            TypeKind::AbstractClass => "public abstract class".to_string(),
            TypeKind::Interface => "public interface".to_string(),
            TypeKind::Enum => "public enum".to_string(),
            TypeKind::Record(components) => {
                let _ = write!(out, "public record {}(\n        {}\n)", decl.name, components);
                self.write_decl_tail(out);
                return;
            }
        };
        let _ = write!(out, "{keyword} {}", decl.name);
        self.write_decl_tail(out);
    }

    fn write_decl_tail(&self, out: &mut String) {
        let decl = &self.decl;
        if let Some(extends) = &decl.extends {
            let _ = write!(out, " extends {extends}");
        }
        if !decl.implements.is_empty() {
            let _ = write!(out, " implements {}", decl.implements.join(", "));
        }
        out.push_str(" {\n");
        let mut previous_constant = false;
        for (i, member) in decl.members.iter().enumerate() {
            let constant = matches!(member, Member::Constant(_));
            // Consecutive enum constants stay on adjacent lines; every other
            // member pair is separated by a blank line.
            if i > 0 && !(constant && previous_constant) {
                out.push('\n');
            }
            previous_constant = constant;
            match member {
                Member::Field(field) => write_field(out, field),
                Member::Method(method) => write_method(out, method),
                Member::Constant(line) => {
                    let _ = writeln!(out, "    {line}");
                }
                Member::StaticInit(lines) => {
                    out.push_str("    static {\n");
                    for line in lines {
                        let _ = writeln!(out, "        {line}");
                    }
                    out.push_str("    }\n");
                }
            }
        }
        out.push_str("}\n");
    }
}

fn write_field(out: &mut String, field: &Field) {
    for annotation in &field.annotations {
        let _ = writeln!(out, "    {annotation}");
    }
    let _ = write!(out, "    {} {} {}", field.modifiers, field.ty, field.name);
    if let Some(init) = &field.init {
        let _ = write!(out, " = {init}");
    }
    out.push_str(";\n");
}

fn write_method(out: &mut String, method: &Method) {
    for annotation in &method.annotations {
        let _ = writeln!(out, "    {annotation}");
    }
    let mut sig = String::from("    ");
    if !method.modifiers.is_empty() {
        let _ = write!(sig, "{} ", method.modifiers);
    }
    if !method.ret.is_empty() {
        let _ = write!(sig, "{} ", method.ret);
    }
    let _ = write!(sig, "{}({})", method.name, method.params);
    match &method.body {
        None => {
            let _ = writeln!(out, "{sig};");
        }
        Some(lines) => {
            let _ = writeln!(out, "{sig} {{");
            for line in lines {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "        {line}");
                }
            }
            out.push_str("    }\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_class_with_field_and_method() {
        let file = JavaFile {
            package: "com.example.demo".to_string(),
            imports: vec!["java.util.UUID".to_string()],
            banner: None,
            decl: TypeDecl {
                annotations: vec!["@Entity".to_string()],
                kind: TypeKind::Class,
                name: "Product".to_string(),
                extends: Some("BaseEntity".to_string()),
                implements: vec![],
                members: vec![
                    Member::Field(Field {
                        annotations: vec!["@Id".to_string()],
                        modifiers: "private".to_string(),
                        ty: "Long".to_string(),
                        name: "id".to_string(),
                        init: None,
                    }),
                    Member::Method(Method {
                        annotations: vec![],
                        modifiers: "public".to_string(),
                        ret: "Long".to_string(),
                        name: "getId".to_string(),
                        params: String::new(),
                        body: Some(vec!["return id;".to_string()]),
                    }),
                ],
            },
        };
        let source = file.render();
        assert!(source.starts_with("package com.example.demo;\n\nimport java.util.UUID;\n"));
        assert!(source.contains("@Entity\npublic class Product extends BaseEntity {\n"));
        assert!(source.contains("    @Id\n    private Long id;\n"));
        assert!(source.contains("    public Long getId() {\n        return id;\n    }\n"));
        assert!(source.ends_with("}\n"));
    }

    #[test]
    fn interface_members_end_with_semicolon() {
        let file = JavaFile {
            package: "com.example.demo".to_string(),
            imports: vec![],
            banner: None,
            decl: TypeDecl {
                annotations: vec![],
                kind: TypeKind::Interface,
                name: "ProductRepository".to_string(),
                extends: Some("BaseRepository<Product, Long>".to_string()),
                implements: vec![],
                members: vec![Member::Method(Method::abstract_sig(
                    "boolean",
                    "existsBySku",
                    "String sku",
                ))],
            },
        };
        let source = file.render();
        assert!(source.contains("public interface ProductRepository extends BaseRepository<Product, Long> {\n"));
        assert!(source.contains("    boolean existsBySku(String sku);\n"));
    }

    #[test]
    fn consecutive_enum_constants_share_a_block() {
        let file = JavaFile {
            package: "com.example.demo".to_string(),
            imports: vec![],
            banner: None,
            decl: TypeDecl {
                annotations: vec![],
                kind: TypeKind::Enum,
                name: "ErrorCode".to_string(),
                extends: None,
                implements: vec![],
                members: vec![
                    Member::Constant("NOT_FOUND,".to_string()),
                    Member::Constant("DUPLICATE,".to_string()),
                ],
            },
        };
        let source = file.render();
        assert!(source.contains("    NOT_FOUND,\n    DUPLICATE,\n"));
    }
}
