//! Breakpoint catalog, installation, and per-step checking.

use indexmap::IndexMap;

use runtime_protocol::types::{
    BreakpointParameter, BreakpointParameterKind, BreakpointType, CheckBreakpointArguments,
    DomainBreakpoint, PrimitiveType,
};
use runtime_protocol::{LanguageRuntime, RpcError};
use transport::types::{Breakpoint, SourceBreakpoint};

use crate::locator::{ElementLocator, Origin};
use crate::model::ModelTree;

/// A positive outcome of one `checkBreakpoint` round.
#[derive(Debug, Clone)]
pub struct ActivatedBreakpoint {
    pub type_id: String,
    pub message: Option<String>,
}

/// Owns the runtime-declared breakpoint types and the installed breakpoint
/// instances.
#[derive(Debug)]
pub struct BreakpointManager {
    source_file: String,
    /// Catalog in the runtime's reported order, indexed by type id.
    types: IndexMap<String, BreakpointType>,
    installed: Vec<DomainBreakpoint>,
}

impl BreakpointManager {
    pub fn new(source_file: String, types: Vec<BreakpointType>) -> Self {
        Self {
            source_file,
            types: types.into_iter().map(|t| (t.id.clone(), t)).collect(),
            installed: Vec::new(),
        }
    }

    /// The catalog, in declaration order.
    pub fn available_types(&self) -> Vec<BreakpointType> {
        self.types.values().cloned().collect()
    }

    /// Verify client source breakpoints without installing anything.
    ///
    /// A slot is verifiable iff its position (column required) resolves to a
    /// located element whose type set matches the first `element` parameter
    /// of some declared breakpoint type. One outcome per input, in input
    /// order.
    pub fn verify_source_breakpoints(
        &self,
        breakpoints: &[SourceBreakpoint],
        locator: &ElementLocator,
        ast: &ModelTree,
        origin: Origin,
    ) -> Vec<Breakpoint> {
        breakpoints
            .iter()
            .enumerate()
            .map(|(index, breakpoint)| {
                let verified = breakpoint.column.is_some_and(|column| {
                    locator
                        .element_from_position(ast, breakpoint.line, column, origin)
                        .is_some_and(|node| self.element_matches_some_type(ast, node))
                });

                if verified {
                    Breakpoint {
                        id: Some(index as i64),
                        verified: true,
                        message: None,
                    }
                } else {
                    Breakpoint {
                        id: None,
                        verified: false,
                        message: None,
                    }
                }
            })
            .collect()
    }

    fn element_matches_some_type(&self, ast: &ModelTree, node: crate::model::NodeId) -> bool {
        let node = ast.node(node);
        if node.location.is_none() {
            return false;
        }
        self.types.values().any(|ty| {
            ty.parameters.first().is_some_and(|parameter| {
                matches!(
                    &parameter.kind,
                    BreakpointParameterKind::Element { element_type }
                        if node.types.iter().any(|t| t == element_type)
                )
            })
        })
    }

    /// Replace the installed breakpoints with the valid subset of `list`.
    ///
    /// Returns one validation outcome per input, in input order.
    pub fn set_domain_breakpoints(&mut self, list: Vec<DomainBreakpoint>) -> Vec<bool> {
        let outcomes: Vec<bool> = list.iter().map(|b| self.is_valid_breakpoint(b)).collect();
        self.installed = list
            .into_iter()
            .zip(&outcomes)
            .filter(|(_, valid)| **valid)
            .map(|(breakpoint, _)| breakpoint)
            .collect();

        tracing::debug!(installed = self.installed.len(), "replaced domain breakpoints");
        outcomes
    }

    /// Whether a breakpoint instance matches its declared type: one entry
    /// per parameter, each passing the type and multiplicity check.
    fn is_valid_breakpoint(&self, breakpoint: &DomainBreakpoint) -> bool {
        let Some(declared) = self.types.get(&breakpoint.breakpoint_type_id) else {
            return false;
        };

        if breakpoint.entries.len() != declared.parameters.len() {
            return false;
        }

        declared.parameters.iter().all(|parameter| {
            breakpoint
                .entries
                .get(&parameter.name)
                .is_some_and(|value| entry_matches(parameter, value))
        })
    }

    pub fn installed(&self) -> &[DomainBreakpoint] {
        &self.installed
    }

    /// Check every installed breakpoint against the step about to run.
    ///
    /// One `checkBreakpoint` request per installed breakpoint. A malformed
    /// check result counts as not activated so execution can always make
    /// progress; transport failures propagate.
    pub async fn check<R: LanguageRuntime>(
        &self,
        runtime: &mut R,
        step_id: &str,
    ) -> Result<Vec<ActivatedBreakpoint>, RpcError> {
        let mut activated = Vec::new();

        for breakpoint in &self.installed {
            let args = CheckBreakpointArguments {
                source_file: self.source_file.clone(),
                step_id: step_id.to_string(),
                type_id: breakpoint.breakpoint_type_id.clone(),
                entries: breakpoint.entries.clone(),
            };

            match runtime.check_breakpoint(args).await {
                Ok(result) if result.is_activated => {
                    tracing::debug!(
                        type_id = %breakpoint.breakpoint_type_id,
                        step_id,
                        "breakpoint activated"
                    );
                    activated.push(ActivatedBreakpoint {
                        type_id: breakpoint.breakpoint_type_id.clone(),
                        message: result.message,
                    });
                }
                Ok(_) => {}
                Err(err) if err.is_result_shape_error() => {
                    tracing::warn!(
                        error = %err,
                        type_id = %breakpoint.breakpoint_type_id,
                        "malformed breakpoint check result, treating as not activated"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(activated)
    }
}

/// Typecheck one entry value against its declared parameter.
fn entry_matches(parameter: &BreakpointParameter, value: &serde_json::Value) -> bool {
    if parameter.is_multivalued {
        value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| scalar_matches(&parameter.kind, item)))
    } else {
        scalar_matches(&parameter.kind, value)
    }
}

fn scalar_matches(kind: &BreakpointParameterKind, value: &serde_json::Value) -> bool {
    match kind {
        BreakpointParameterKind::Primitive { primitive_type } => match primitive_type {
            PrimitiveType::Boolean => value.is_boolean(),
            PrimitiveType::Number => value.is_number(),
            PrimitiveType::String => value.is_string(),
        },
        // element parameters take element ids
        BreakpointParameterKind::Element { .. } => value.is_string(),
    }
}
