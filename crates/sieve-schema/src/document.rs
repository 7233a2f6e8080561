//! # Schema Documents
//!
//! A schema document describes a chain tree declaratively:
//!
//! ```yaml
//! options:
//!   unknown_keys: forbid
//! schema:
//!   type: object
//!   fields:
//!     password:
//!       type: string
//!       required: true
//!       steps:
//!         - name: string/min-length
//!           args: [8]
//!     confirm:
//!       type: string
//!       steps:
//!         - name: equals
//!           args: [{ ref: password }]
//! ```
//!
//! Types are `any`, `string`, `number`, `boolean`, `date`, `array`,
//! `object`, `ref`, or `custom:<name>` for kinds registered on a mapper.
//! Format processors named in `steps` are prioritized automatically, so
//! a document may list them anywhere. Unknown keys are rejected at every
//! level.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sieve_chain::{Arg, Chain, ChainBuilder, DefaultValue, Schema, SchemaOptions, UnknownKeys};
use sieve_core::PathRef;

use crate::error::SchemaDocError;
use crate::source::{self, Format};

/// A whole schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Defaults for the builders made from this document.
    #[serde(default)]
    pub options: SchemaOptions,
    /// The root field.
    pub schema: FieldSpec,
}

/// One field of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Kind name; `any` when omitted.
    #[serde(rename = "type", default = "any_type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub forbidden: bool,
    /// Literal default, or `{ref: path}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Pipeline steps in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepSpec>,
    /// Item spec (arrays).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldSpec>>,
    /// Member specs in declaration order (objects).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldSpec>,
    /// Overrides the document's unknown-key policy (objects).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_keys: Option<UnknownKeys>,
    /// Dotted target (refs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// `strftime` output format (dates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

fn any_type() -> String {
    "any".to_string()
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    /// Processor key.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub prioritize: bool,
}

/// A step argument or default: `{ref: "a.b"}` or any other value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    /// A path reference.
    Ref(RefSpec),
    /// A literal value.
    Literal(Value),
}

/// The `{ref: path}` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefSpec {
    /// Dotted path.
    #[serde(rename = "ref")]
    pub path: String,
}

impl ArgSpec {
    fn to_arg(&self) -> Arg {
        match self {
            Self::Ref(r) => Arg::Ref(PathRef::parse(&r.path)),
            Self::Literal(v) => Arg::Literal(v.clone()),
        }
    }

    fn to_default(&self) -> DefaultValue {
        match self {
            Self::Ref(r) => DefaultValue::Ref(PathRef::parse(&r.path)),
            Self::Literal(v) => DefaultValue::Literal(v.clone()),
        }
    }
}

impl SchemaDocument {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaDocError> {
        source::parse_str(content, Format::Yaml, "schema document")
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaDocError> {
        source::parse_str(content, Format::Json, "schema document")
    }

    /// Read a document, choosing the format from the extension.
    pub fn from_path(path: &Path) -> Result<Self, SchemaDocError> {
        source::read_path(path)
    }

    /// Build the root chain with `base`'s catalogue and this document's
    /// options.
    ///
    /// # Errors
    ///
    /// - [`SchemaDocError::UnknownType`] / [`SchemaDocError::MissingPath`]
    ///   for malformed field specs.
    /// - [`SchemaDocError::Build`] for unknown processors or misplaced
    ///   format steps.
    pub fn build(&self, base: &Schema) -> Result<Chain, SchemaDocError> {
        let schema = base.with_options(self.options);
        self.schema.build(&schema, "schema")
    }

    /// Build with the standard catalogue.
    pub fn build_standard(&self) -> Result<Chain, SchemaDocError> {
        self.build(&Schema::standard())
    }
}

impl FieldSpec {
    /// Build this field's chain. `location` names the field in errors.
    pub fn build(&self, schema: &Schema, location: &str) -> Result<Chain, SchemaDocError> {
        self.check_options(location)?;
        let mut chain = match self.kind.as_str() {
            "any" => schema.any(),
            "string" => schema.string().into_chain(),
            "number" => schema.number().into_chain(),
            "boolean" => schema.boolean().into_chain(),
            "date" => schema.date().into_chain(),
            "array" => {
                let mut array = schema.array();
                if let Some(items) = &self.items {
                    array = array.items(items.build(schema, &format!("{location}.items"))?);
                }
                array.into_chain()
            }
            "object" => {
                let mut object = schema.object();
                for (name, field) in &self.fields {
                    let member = field.build(schema, &format!("{location}.fields.{name}"))?;
                    object = object.field(name, member);
                }
                object.into_chain()
            }
            "ref" => {
                let path = self.path.as_deref().ok_or_else(|| SchemaDocError::MissingPath {
                    location: location.to_string(),
                })?;
                schema.reference(PathRef::parse(path))
            }
            other => match other.strip_prefix("custom:") {
                Some(name) if !name.is_empty() => schema.custom(name),
                _ => {
                    return Err(SchemaDocError::UnknownType {
                        location: location.to_string(),
                        type_name: other.to_string(),
                    })
                }
            },
        };

        let default = self.default.as_ref().map(ArgSpec::to_default);
        chain = chain.set_props(|p| {
            p.required = self.required;
            p.forbidden = self.forbidden;
            p.default = default;
            if let Some(label) = &self.label {
                p.label = Some(label.clone());
            }
            if let Some(policy) = self.unknown_keys {
                p.unknown_keys = policy;
            }
            if let Some(format) = &self.output_format {
                p.output_format = Some(format.clone());
            }
        });

        for step in &self.steps {
            let is_format = chain
                .registry()
                .get(&step.name)
                .is_some_and(|p| p.is_format());
            let args = step.args.iter().map(ArgSpec::to_arg).collect();
            chain = chain.add_step(&step.name, args, step.prioritize || is_format)?;
        }
        Ok(chain)
    }

    /// Reject kind-specific options set on a type that ignores them.
    /// Custom kinds read their props, so `unknown_keys` and
    /// `output_format` are left to them.
    fn check_options(&self, location: &str) -> Result<(), SchemaDocError> {
        let kind = self.kind.as_str();
        let custom = kind.starts_with("custom:");
        let set = [
            ("items", self.items.is_some(), kind == "array"),
            ("fields", !self.fields.is_empty(), kind == "object"),
            ("unknown_keys", self.unknown_keys.is_some(), kind == "object" || custom),
            ("path", self.path.is_some(), kind == "ref"),
            ("output_format", self.output_format.is_some(), kind == "date" || custom),
        ];
        match set.into_iter().find(|(_, present, applies)| *present && !applies) {
            Some((option, ..)) => Err(SchemaDocError::UnusedOption {
                location: location.to_string(),
                option: option.to_string(),
                type_name: self.kind.clone(),
            }),
            None => Ok(()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_chain::{ChainKind, KindTag, Step};
    use sieve_core::BuildError;

    fn build(yaml: &str) -> Result<Chain, SchemaDocError> {
        SchemaDocument::from_yaml_str(yaml)?.build_standard()
    }

    #[test]
    fn test_object_with_ref_argument() {
        let chain = build(
            r#"
schema:
  type: object
  fields:
    confirm:
      type: string
      steps:
        - name: equals
          args: [{ ref: password }]
    password:
      type: string
      required: true
"#,
        )
        .unwrap();
        let ChainKind::Object { fields } = chain.kind() else {
            panic!("object expected");
        };
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["confirm", "password"]);
        assert_eq!(
            fields["confirm"].pipeline()[0].args(),
            [Arg::Ref(PathRef::parse("password"))]
        );
        assert!(fields["password"].props().required);
    }

    #[test]
    fn test_format_steps_prioritized_automatically() {
        let chain = build(
            r#"
schema:
  type: number
  steps:
    - name: number/min
      args: [1]
    - name: number/parse
"#,
        )
        .unwrap();
        let keys: Vec<_> = chain.pipeline().iter().map(Step::key).collect();
        assert_eq!(keys, ["number/parse", "number/min"]);
    }

    #[test]
    fn test_literal_object_argument_is_not_a_ref() {
        let chain = build(
            r#"
schema:
  steps:
    - name: equals
      args: [{ ref: a, extra: 1 }]
"#,
        )
        .unwrap();
        assert_eq!(chain.tag(), KindTag::Any);
        assert_eq!(chain.pipeline()[0].args(), [Arg::Literal(json!({"ref": "a", "extra": 1}))]);
    }

    #[test]
    fn test_defaults_and_options() {
        let chain = build(
            r#"
options:
  unknown_keys: allow
schema:
  type: object
  fields:
    nick: { type: string, default: { ref: name } }
    lang: { type: string, default: en }
    inner: { type: object, unknown_keys: forbid }
"#,
        )
        .unwrap();
        assert_eq!(chain.props().unknown_keys, UnknownKeys::Allow);
        let ChainKind::Object { fields } = chain.kind() else {
            panic!("object expected");
        };
        assert_eq!(fields["nick"].props().default, Some(DefaultValue::Ref(PathRef::parse("name"))));
        assert_eq!(fields["lang"].props().default, Some(DefaultValue::Literal(json!("en"))));
        assert_eq!(fields["inner"].props().unknown_keys, UnknownKeys::Forbid);
    }

    #[test]
    fn test_unknown_document_key_rejected() {
        let yaml = "schema:\n  type: string\n  requried: true\n";
        let err = SchemaDocument::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SchemaDocError::Parse { .. }));
    }

    #[test]
    fn test_unknown_type_and_missing_path() {
        let err = build("schema:\n  type: object\n  fields:\n    age: { type: integer }\n")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaDocError::UnknownType { ref location, .. } if location == "schema.fields.age"
        ));

        let err = build("schema:\n  type: ref\n").unwrap_err();
        assert!(matches!(err, SchemaDocError::MissingPath { .. }));
    }

    #[test]
    fn test_option_for_another_type_rejected() {
        let err = build(
            r#"
schema:
  type: object
  fields:
    name:
      type: string
      fields:
        x: {}
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaDocError::UnusedOption { ref location, ref option, .. }
                if location == "schema.fields.name" && option == "fields"
        ));

        let err = build("schema:\n  type: number\n  output_format: \"%Y\"\n").unwrap_err();
        assert!(matches!(
            err,
            SchemaDocError::UnusedOption { ref option, .. } if option == "output_format"
        ));

        let err = build("schema:\n  type: ref\n  path: a\n  items: { type: string }\n")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaDocError::UnusedOption { ref option, .. } if option == "items"
        ));
    }

    #[test]
    fn test_ref_with_steps() {
        let chain = build(
            r#"
schema:
  type: ref
  path: a
  steps:
    - name: equals
      args: [5]
"#,
        )
        .unwrap();
        assert_eq!(chain.tag(), KindTag::Reference);
        assert_eq!(chain.pipeline()[0].key(), "equals");
    }

    #[test]
    fn test_unknown_processor_is_build_error() {
        let err = build("schema:\n  steps:\n    - name: nope\n").unwrap_err();
        assert!(matches!(err, SchemaDocError::Build(BuildError::UnknownProcessor { .. })));
    }

    #[test]
    fn test_custom_type() {
        let chain = build("schema:\n  type: custom:postcode\n").unwrap();
        assert_eq!(chain.tag(), KindTag::Custom("postcode".into()));
    }

    #[test]
    fn test_json_document() {
        let doc = SchemaDocument::from_json_str(
            r#"{"schema": {"type": "array",
                "items": {"type": "date", "output_format": "%d/%m/%Y"}}}"#,
        )
        .unwrap();
        let chain = doc.build_standard().unwrap();
        let ChainKind::Array { items: Some(item) } = chain.kind() else {
            panic!("array items expected");
        };
        assert_eq!(item.props().output_format.as_deref(), Some("%d/%m/%Y"));
    }
}
