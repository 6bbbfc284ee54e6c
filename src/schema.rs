//! Declarative description of a target type.
//!
//! A [`Configurable`] type describes its fields once through a [`Schema`]. The
//! schema is flattened into [`FieldDescriptor`]s; everything after binding
//! (overlay, validation) works only on those descriptors plus the tree.
//!
//! ```
//! use configor::schema::{Configurable, FieldSpec, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Database {
//!     user: String,
//!     password: String,
//!     port: u16,
//! }
//!
//! impl Configurable for Database {
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field(FieldSpec::scalar("user").default("root"))
//!             .field(FieldSpec::scalar("password").required().env("DB_PASSWORD"))
//!             .field(FieldSpec::scalar("port").default("5432"))
//!     }
//! }
//!
//! let paths: Vec<String> = Database::schema()
//!     .descriptors()
//!     .iter()
//!     .map(|d| d.dotted_path())
//!     .collect();
//! assert_eq!(paths, ["user", "password", "port"]);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A type that can be loaded by the configuration pipeline.
///
/// `Default` supplies the zero value every field starts from.
pub trait Configurable: Serialize + DeserializeOwned + Default {
    /// Field metadata of this type.
    fn schema() -> Schema;
}

/// Shape of a field as seen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any leaf: strings, numbers, booleans, options, lists of scalars, maps.
    Scalar,
    /// A nested struct.
    Struct,
    /// A sequence of structs; each element is checked against the same fields.
    Sequence,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar"),
            FieldKind::Struct => write!(f, "struct"),
            FieldKind::Sequence => write!(f, "sequence"),
        }
    }
}

/// Schema and zero value of a nested struct type.
#[derive(Debug, Clone)]
pub struct Element {
    pub schema: Schema,
    template: fn() -> serde_json::Result<Value>,
}

impl Element {
    fn of<C: Configurable>() -> Self {
        Self {
            schema: C::schema(),
            template: zero_tree::<C>,
        }
    }

    /// The serialized zero value of the element type.
    pub fn template(&self) -> serde_json::Result<Value> {
        (self.template)()
    }
}

fn zero_tree<C: Configurable>() -> serde_json::Result<Value> {
    serde_json::to_value(C::default())
}

#[derive(Debug, Clone)]
pub enum Shape {
    Scalar,
    Struct(Element),
    Sequence(Element),
}

/// One declared field and its metadata.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    shape: Shape,
    default: Option<&'static str>,
    required: bool,
    env: Option<&'static str>,
}

impl FieldSpec {
    fn with_shape(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            default: None,
            required: false,
            env: None,
        }
    }

    /// A leaf field. `name` is the serialized key of the field.
    pub fn scalar(name: &'static str) -> Self {
        Self::with_shape(name, Shape::Scalar)
    }

    /// A nested struct field.
    pub fn nested<C: Configurable>(name: &'static str) -> Self {
        Self::with_shape(name, Shape::Struct(Element::of::<C>()))
    }

    /// A `Vec` of structs.
    pub fn sequence<C: Configurable>(name: &'static str) -> Self {
        Self::with_shape(name, Shape::Sequence(Element::of::<C>()))
    }

    /// Literal default, coerced into the field type when applied.
    pub fn default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Explicit environment variable, checked before the generic name.
    pub fn env(mut self, name: &'static str) -> Self {
        self.env = Some(name);
        self
    }

    /// Apply a textual tag: `default`, `required` (`"true"` enables) or `env`.
    pub fn tag(mut self, key: &str, value: &'static str) -> Self {
        match key {
            "default" => self.default = Some(value),
            "required" => self.required = value.trim().eq_ignore_ascii_case("true"),
            "env" => self.env = Some(value).filter(|v| !v.is_empty()),
            other => debug!(field = self.name, tag = other, "ignoring unknown field tag"),
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> FieldKind {
        match self.shape {
            Shape::Scalar => FieldKind::Scalar,
            Shape::Struct(_) => FieldKind::Struct,
            Shape::Sequence(_) => FieldKind::Sequence,
        }
    }
}

/// Ordered field list of one struct type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Flatten into descriptors, parents before their children.
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        let mut out = Vec::new();
        self.extract(&[], &mut out);
        out
    }

    fn extract(&self, parent: &[&'static str], out: &mut Vec<FieldDescriptor>) {
        for field in &self.fields {
            let mut path = parent.to_vec();
            path.push(field.name);
            out.push(FieldDescriptor {
                path: path.clone(),
                kind: field.kind(),
                default: field.default,
                required: field.required,
                env: field.env,
            });
            match &field.shape {
                Shape::Scalar => {}
                Shape::Struct(element) | Shape::Sequence(element) => {
                    element.schema.extract(&path, out);
                }
            }
        }
    }
}

/// Flattened metadata of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field names from the root, by declared name.
    pub path: Vec<&'static str>,
    pub kind: FieldKind,
    pub default: Option<&'static str>,
    pub required: bool,
    pub env: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// Generic variable name: `PREFIX_SEG1_SEG2`, uppercased.
    pub fn generic_env_name(&self, prefix: Option<&str>) -> String {
        let body = self.path.join("_").to_uppercase();
        match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}_{}", prefix.to_uppercase(), body),
            _ => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Contact {
        name: String,
        email: String,
    }

    impl Configurable for Contact {
        fn schema() -> Schema {
            Schema::new()
                .field(FieldSpec::scalar("name"))
                .field(FieldSpec::scalar("email").required())
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Db {
        name: String,
        port: u32,
    }

    impl Configurable for Db {
        fn schema() -> Schema {
            Schema::new()
                .field(FieldSpec::scalar("name"))
                .field(FieldSpec::scalar("port").default("3306"))
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Root {
        app_name: String,
        db: Db,
        contacts: Vec<Contact>,
    }

    impl Configurable for Root {
        fn schema() -> Schema {
            Schema::new()
                .field(FieldSpec::scalar("app_name").default("configor"))
                .field(FieldSpec::nested::<Db>("db"))
                .field(FieldSpec::sequence::<Contact>("contacts"))
        }
    }

    #[test]
    fn test_descriptors_parent_before_children() {
        let descriptors = Root::schema().descriptors();
        let paths: Vec<String> = descriptors.iter().map(|d| d.dotted_path()).collect();
        assert_eq!(
            paths,
            [
                "app_name",
                "db",
                "db.name",
                "db.port",
                "contacts",
                "contacts.name",
                "contacts.email"
            ]
        );
        assert_eq!(descriptors[1].kind, FieldKind::Struct);
        assert_eq!(descriptors[4].kind, FieldKind::Sequence);
        assert_eq!(descriptors[3].default, Some("3306"));
        assert!(descriptors[6].required);
    }

    #[test]
    fn test_fields_without_metadata() {
        let descriptors = Root::schema().descriptors();
        let name = &descriptors[2];
        assert_eq!(name.default, None);
        assert!(!name.required);
        assert_eq!(name.env, None);
    }

    #[test]
    fn test_generic_env_name() {
        let descriptor = FieldDescriptor {
            path: vec!["db", "name"],
            kind: FieldKind::Scalar,
            default: None,
            required: false,
            env: None,
        };
        assert_eq!(descriptor.generic_env_name(Some("CONFIGOR")), "CONFIGOR_DB_NAME");
        assert_eq!(descriptor.generic_env_name(Some("app")), "APP_DB_NAME");
        assert_eq!(descriptor.generic_env_name(None), "DB_NAME");
    }

    #[test]
    fn test_textual_tags() {
        let field = FieldSpec::scalar("password")
            .tag("required", "true")
            .tag("env", "DBPassword")
            .tag("unknown", "x");
        assert!(field.required);
        assert_eq!(field.env, Some("DBPassword"));

        let field = FieldSpec::scalar("port").tag("default", "3306").tag("required", "false");
        assert!(!field.required);
        assert_eq!(field.default, Some("3306"));
    }

    #[test]
    fn test_element_template_is_zero_value() {
        let FieldSpec { shape: Shape::Sequence(element), .. } = FieldSpec::sequence::<Contact>("contacts")
        else {
            panic!("expected a sequence");
        };
        assert_eq!(
            element.template().unwrap(),
            serde_json::json!({"name": "", "email": ""})
        );
    }
}
