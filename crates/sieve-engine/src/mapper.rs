//! # Compilation Mapper
//!
//! Turns builder chains into [`CompiledEntity`] trees. The mapper owns a
//! table from [`KindTag`] to a [`BehaviorFactory`]; a kind with no entry
//! compiles to the base behaviour (presence rules and defaults only, no
//! pipeline).
//!
//! One mapper instance is shared by every entity of a compiled tree. It
//! hands itself to nested compilation through the [`CompileContext`], so
//! members, items and default resolvers are compiled by the same table
//! and draw identities from the same counter.

use std::collections::HashMap;
use std::sync::Arc;

use sieve_chain::{Chain, DefaultValue, KindTag};
use sieve_core::{BuildError, EntityId};

use crate::compiled::{Body, CompiledEntity, EntityBehavior};
use crate::generic::{CompiledChain, NoHooks};
use crate::kinds;

/// Builds the kind-specific behaviour of one chain.
pub type BehaviorFactory = Arc<
    dyn Fn(&Chain, &mut CompileContext) -> Result<Box<dyn EntityBehavior>, BuildError>
        + Send
        + Sync,
>;

/// State threaded through one compilation.
#[derive(Debug)]
pub struct CompileContext {
    mapper: Arc<CompilationMapper>,
    next_id: u64,
    member: Option<String>,
}

impl CompileContext {
    /// A context that compiles with `mapper`, numbering entities from 0.
    pub fn new(mapper: Arc<CompilationMapper>) -> Self {
        Self {
            mapper,
            next_id: 0,
            member: None,
        }
    }

    /// The mapper driving this compilation.
    pub fn mapper(&self) -> &Arc<CompilationMapper> {
        &self.mapper
    }

    /// Issue the next entity identity.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of identities issued so far.
    pub fn issued(&self) -> u64 {
        self.next_id
    }

    /// Name under which the entity being compiled sits in its enclosing
    /// object, if it is an object member.
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Compile a nested chain with the shared mapper.
    pub fn compile(&mut self, chain: &Chain) -> Result<Arc<CompiledEntity>, BuildError> {
        self.compile_scoped(None, chain)
    }

    /// Compile the object member `name`.
    pub fn compile_member(
        &mut self,
        name: &str,
        chain: &Chain,
    ) -> Result<Arc<CompiledEntity>, BuildError> {
        self.compile_scoped(Some(name.to_string()), chain)
    }

    fn compile_scoped(
        &mut self,
        member: Option<String>,
        chain: &Chain,
    ) -> Result<Arc<CompiledEntity>, BuildError> {
        let outer = std::mem::replace(&mut self.member, member);
        let mapper = Arc::clone(&self.mapper);
        let compiled = mapper.create_compiled_entity(chain, self);
        self.member = outer;
        compiled
    }
}

/// Table from chain kind to compiled behaviour.
#[derive(Clone)]
pub struct CompilationMapper {
    table: HashMap<KindTag, BehaviorFactory>,
}

impl Default for CompilationMapper {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for CompilationMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<String> = self.table.keys().map(ToString::to_string).collect();
        kinds.sort_unstable();
        f.debug_struct("CompilationMapper").field("kinds", &kinds).finish()
    }
}

impl CompilationMapper {
    /// A mapper with no entries; every kind compiles to base behaviour.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A mapper with every built-in kind registered.
    pub fn standard() -> Self {
        Self::empty()
            .with_kind(KindTag::Any, kinds::scalar::compile_any)
            .with_kind(KindTag::String, kinds::scalar::compile_string)
            .with_kind(KindTag::Number, kinds::scalar::compile_number)
            .with_kind(KindTag::Boolean, kinds::scalar::compile_boolean)
            .with_kind(KindTag::Date, kinds::date::compile_date)
            .with_kind(KindTag::Array, kinds::array::compile_array)
            .with_kind(KindTag::Object, kinds::object::compile_object)
    }

    /// Register (or replace) the factory for `tag`.
    pub fn with_kind<F>(mut self, tag: KindTag, factory: F) -> Self
    where
        F: Fn(&Chain, &mut CompileContext) -> Result<Box<dyn EntityBehavior>, BuildError>
            + Send
            + Sync
            + 'static,
    {
        self.table.insert(tag, Arc::new(factory));
        self
    }

    /// Whether `tag` has a factory.
    pub fn handles(&self, tag: &KindTag) -> bool {
        self.table.contains_key(tag)
    }

    /// Compile `chain` into a fresh tree of entities.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if any entity in the tree has contradictory
    /// presence rules, an invalid option, or members that depend on each
    /// other in a cycle.
    pub fn compile(self: &Arc<Self>, chain: &Chain) -> Result<Arc<CompiledEntity>, BuildError> {
        let mut context = CompileContext::new(Arc::clone(self));
        let compiled = self.create_compiled_entity(chain, &mut context)?;
        tracing::debug!(
            kind = %chain.tag(),
            entities = context.issued(),
            "compiled chain"
        );
        Ok(compiled)
    }

    /// Compile one entity, injecting this mapper for nested compilation.
    pub fn create_compiled_entity(
        self: &Arc<Self>,
        chain: &Chain,
        context: &mut CompileContext,
    ) -> Result<Arc<CompiledEntity>, BuildError> {
        check_presence(chain)?;
        let id = context.next_id();

        let default_compiled = match &chain.props().default {
            Some(DefaultValue::Ref(path)) => Some(context.compile(&Chain::from(path.clone()))?),
            _ => None,
        };

        let body = match chain.kind() {
            sieve_chain::ChainKind::Reference(path) => Body::Reference {
                path: path.clone(),
                pipeline: CompiledChain::new(chain, NoHooks),
            },
            _ => match self.table.get(&chain.tag()) {
                Some(factory) => Body::Behavior(factory(chain, context)?),
                None => {
                    tracing::debug!(
                        kind = %chain.tag(),
                        "no compiled behaviour registered; using base entity"
                    );
                    Body::Base
                }
            },
        };

        Ok(Arc::new(CompiledEntity::new(
            id,
            chain.clone(),
            Arc::clone(self),
            default_compiled,
            body,
        )))
    }
}

fn check_presence(chain: &Chain) -> Result<(), BuildError> {
    let props = chain.props();
    let reason = if props.required && props.forbidden {
        Some("required and forbidden")
    } else if props.forbidden && props.default.is_some() {
        Some("forbidden with a default value")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(BuildError::ConflictingPresence {
            entity: chain.display_name(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_chain::{ChainBuilder, Schema};

    #[test]
    fn test_standard_handles_builtin_kinds() {
        let mapper = CompilationMapper::standard();
        for tag in [KindTag::String, KindTag::Object, KindTag::Array, KindTag::Date] {
            assert!(mapper.handles(&tag), "{tag}");
        }
        assert!(!mapper.handles(&KindTag::Custom("email".into())));
        assert!(!CompilationMapper::empty().handles(&KindTag::String));
    }

    #[test]
    fn test_required_and_forbidden_conflict() {
        let mapper = Arc::new(CompilationMapper::standard());
        let chain = Schema::standard().string().label("nickname").required().forbidden();
        let err = mapper.compile(chain.chain()).unwrap_err();
        assert_eq!(
            err,
            BuildError::ConflictingPresence {
                entity: "nickname".into(),
                reason: "required and forbidden".into(),
            }
        );
    }

    #[test]
    fn test_forbidden_with_default_conflict() {
        let mapper = Arc::new(CompilationMapper::standard());
        let chain = Schema::standard().any().forbidden().default_to(1);
        assert!(matches!(
            mapper.compile(&chain),
            Err(BuildError::ConflictingPresence { .. })
        ));
    }

    #[test]
    fn test_identities_are_unique_within_a_tree() {
        let schema = Schema::standard();
        let chain = schema
            .object()
            .field("a", schema.string())
            .field("b", schema.number().default_to(sieve_core::PathRef::parse("a")));
        let mapper = Arc::new(CompilationMapper::standard());
        let mut context = CompileContext::new(Arc::clone(&mapper));
        let root = mapper.create_compiled_entity(chain.chain(), &mut context).unwrap();
        assert_eq!(root.id(), EntityId(0));
        // object, a, b and the resolver for b's default
        assert_eq!(context.issued(), 4);
    }
}
