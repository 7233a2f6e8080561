//! Scalar kinds: any, string, number and boolean.

use serde_json::{Map, Value};
use sieve_chain::Chain;
use sieve_core::{BuildError, TrackerId, TrackerTree};

use crate::compiled::EntityBehavior;
use crate::generic::{ChainHooks, CompiledChain, NoHooks};
use crate::mapper::CompileContext;
use crate::state::ProcessState;

/// Records `key` unless the value passes `accepts`.
#[derive(Debug, Clone, Copy)]
pub struct TypeCheck {
    key: &'static str,
    accepts: fn(&Value) -> bool,
}

impl TypeCheck {
    /// A check recording `key` for values `accepts` rejects.
    pub const fn new(key: &'static str, accepts: fn(&Value) -> bool) -> Self {
        Self { key, accepts }
    }

    /// Strings only.
    pub const STRING: Self = Self::new("string/type", Value::is_string);
    /// Numbers only.
    pub const NUMBER: Self = Self::new("number/type", Value::is_number);
    /// Booleans only.
    pub const BOOLEAN: Self = Self::new("boolean/type", Value::is_boolean);
}

impl ChainHooks for TypeCheck {
    fn pre_process(&self, tree: &mut TrackerTree, id: TrackerId, _state: &mut ProcessState) {
        let accepted = tree[id].value().is_some_and(self.accepts);
        if !accepted {
            tree[id].add_error(self.key, Map::new());
        }
    }
}

pub fn compile_any(
    chain: &Chain,
    _: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    Ok(Box::new(CompiledChain::new(chain, NoHooks)))
}

pub fn compile_string(
    chain: &Chain,
    _: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    Ok(Box::new(CompiledChain::new(chain, TypeCheck::STRING)))
}

pub fn compile_number(
    chain: &Chain,
    _: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    Ok(Box::new(CompiledChain::new(chain, TypeCheck::NUMBER)))
}

pub fn compile_boolean(
    chain: &Chain,
    _: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    Ok(Box::new(CompiledChain::new(chain, TypeCheck::BOOLEAN)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use sieve_chain::{ChainBuilder, Schema};

    use crate::CompilationMapper;

    fn error_keys(chain: &sieve_chain::Chain, input: serde_json::Value) -> Vec<String> {
        let entity = Arc::new(CompilationMapper::standard()).compile(chain).unwrap();
        entity.process_value(input).errors().iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn test_type_checks() {
        let schema = Schema::standard();
        assert_eq!(error_keys(schema.string().chain(), json!(1)), ["string/type"]);
        assert_eq!(error_keys(schema.number().chain(), json!("1")), ["number/type"]);
        assert_eq!(error_keys(schema.boolean().chain(), json!(0)), ["boolean/type"]);
        assert!(error_keys(&schema.any(), json!([1])).is_empty());
    }

    #[test]
    fn test_type_check_stops_pipeline() {
        let schema = Schema::standard();
        let chain = schema.string().min_length(3).unwrap();
        assert_eq!(error_keys(chain.chain(), json!(12)), ["string/type"]);
    }

    #[test]
    fn test_number_parse_runs_before_type_check() {
        let schema = Schema::standard();
        let chain = schema.number().parse().unwrap().min(10).unwrap();
        let entity = Arc::new(CompilationMapper::standard()).compile(chain.chain()).unwrap();
        let out = entity.process_value(json!(" 12 "));
        assert!(out.is_valid());
        assert_eq!(out.value(), Some(&json!(12)));
        let keys: Vec<_> = entity
            .process_value(json!("twelve"))
            .errors()
            .iter()
            .map(|e| e.key.clone())
            .collect();
        assert_eq!(keys, ["number/format"]);
    }

    #[test]
    fn test_boolean_parse() {
        let schema = Schema::standard();
        let chain = schema.boolean().parse().unwrap();
        let entity = Arc::new(CompilationMapper::standard()).compile(chain.chain()).unwrap();
        assert_eq!(entity.process_value(json!("yes")).value(), Some(&json!(true)));
    }
}
