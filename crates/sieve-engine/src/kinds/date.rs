//! Dates.
//!
//! Inside the pipeline a date is an ISO `YYYY-MM-DD` string. After a
//! clean pipeline the value is re-rendered with the chain's
//! `output_format`, if one is set.

use chrono::format::{Item, StrftimeItems};
use serde_json::{Map, Value};
use sieve_chain::processors::date::{format_date, parse_iso_date};
use sieve_chain::Chain;
use sieve_core::{BuildError, TrackerId, TrackerTree};

use crate::compiled::EntityBehavior;
use crate::generic::{ChainHooks, CompiledChain};
use crate::mapper::CompileContext;
use crate::state::ProcessState;

/// Hooks of the date kind.
#[derive(Debug, Clone, Default)]
pub struct DateHooks {
    output_format: Option<String>,
}

impl ChainHooks for DateHooks {
    fn pre_process(&self, tree: &mut TrackerTree, id: TrackerId, _state: &mut ProcessState) {
        if tree[id].value().and_then(parse_iso_date).is_none() {
            tree[id].add_error("date/type", Map::new());
        }
    }

    fn post_process(&self, tree: &mut TrackerTree, id: TrackerId, _state: &mut ProcessState) {
        let Some(format) = &self.output_format else {
            return;
        };
        let rendered = tree[id]
            .value()
            .and_then(parse_iso_date)
            .and_then(|date| format_date(date, format));
        if let Some(rendered) = rendered {
            tree[id].set_value(Some(Value::String(rendered)));
        }
    }
}

pub fn compile_date(
    chain: &Chain,
    _: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    let output_format = chain.props().output_format.clone();
    if let Some(format) = &output_format {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(BuildError::InvalidOption {
                entity: chain.display_name(),
                option: "output_format".into(),
                reason: format!("'{format}' is not a valid strftime format"),
            });
        }
    }
    Ok(Box::new(CompiledChain::new(chain, DateHooks { output_format })))
}
