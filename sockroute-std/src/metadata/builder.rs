//! Builds immutable descriptors out of registry records.

use super::registry::{ControllerRecord, MetadataRegistry, ParamRecord, ResultKind};
use sockroute_core::{
    ActionDescriptor, ActionKind, ConfigError, ControllerDescriptor, MiddlewareDescriptor,
    ParamDescriptor,
};
use std::{collections::HashSet, sync::Arc};

/// Turns a [`MetadataRegistry`] into controller and middleware descriptors.
///
/// `selection` restricts the output to the named targets; `None` selects
/// everything. Output always follows declaration order.
pub struct MetadataBuilder<'r> {
    registry: &'r MetadataRegistry,
}

impl<'r> MetadataBuilder<'r> {
    /// Create a builder over `registry`.
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self { registry }
    }

    /// Build controller descriptors.
    pub fn build_controllers(
        &self,
        selection: Option<&[&str]>,
    ) -> Result<Vec<ControllerDescriptor>, ConfigError> {
        if let Some(targets) = selection {
            for target in targets {
                if !self.registry.controllers().iter().any(|c| c.target == *target) {
                    return Err(ConfigError::UnknownController((*target).to_owned()));
                }
            }
        }

        self.registry
            .controllers()
            .iter()
            .filter(|c| selection.is_none_or(|targets| targets.contains(&c.target.as_str())))
            .map(|c| self.build_controller(c))
            .collect()
    }

    /// Build middleware descriptors.
    pub fn build_middlewares(
        &self,
        selection: Option<&[&str]>,
    ) -> Result<Vec<MiddlewareDescriptor>, ConfigError> {
        if let Some(targets) = selection {
            for target in targets {
                if !self.registry.middlewares().iter().any(|m| m.target == *target) {
                    return Err(ConfigError::UnknownMiddleware((*target).to_owned()));
                }
            }
        }

        Ok(self
            .registry
            .middlewares()
            .iter()
            .filter(|m| selection.is_none_or(|targets| targets.contains(&m.target.as_str())))
            .map(|m| MiddlewareDescriptor {
                target: m.target.clone(),
                priority: m.priority,
                instance: m.instance.clone(),
            })
            .collect())
    }

    fn build_controller(
        &self,
        controller: &ControllerRecord,
    ) -> Result<ControllerDescriptor, ConfigError> {
        let target = controller.target.as_str();
        let actions: Vec<_> = self
            .registry
            .actions()
            .iter()
            .filter(|a| a.target == target)
            .collect();

        let is_action = |method: &str| actions.iter().any(|a| a.method == method);
        if let Some(param) = self
            .registry
            .params()
            .iter()
            .find(|p| p.target == target && !is_action(&p.method))
        {
            return Err(ConfigError::OrphanParam {
                target: target.to_owned(),
                method: param.method.clone(),
                index: param.index,
            });
        }
        if let Some(result) = self
            .registry
            .results()
            .iter()
            .find(|r| r.target == target && !is_action(&r.method))
        {
            return Err(ConfigError::OrphanResult {
                target: target.to_owned(),
                method: result.method.clone(),
            });
        }

        let mut descriptors = Vec::with_capacity(actions.len());
        for action in actions {
            descriptors.push(Arc::new(self.build_action(target, &action.method, &action.kind)?));
        }

        Ok(ControllerDescriptor {
            target: target.to_owned(),
            namespace: controller.namespace.clone(),
            actions: descriptors,
        })
    }

    fn build_action(
        &self,
        target: &str,
        method: &str,
        kind: &ActionKind,
    ) -> Result<ActionDescriptor, ConfigError> {
        let binding = self
            .registry
            .bindings()
            .iter()
            .find(|b| b.target == target && b.method == method)
            .ok_or_else(|| ConfigError::UnboundMethod {
                target: target.to_owned(),
                method: method.to_owned(),
            })?;

        if matches!(kind, ActionKind::Message(name) if name.is_empty()) {
            return Err(ConfigError::EmptyEventName {
                target: target.to_owned(),
                method: method.to_owned(),
            });
        }

        let mut params: Vec<&ParamRecord> = self
            .registry
            .params()
            .iter()
            .filter(|p| p.target == target && p.method == method)
            .collect();
        let mut seen = HashSet::new();
        for param in &params {
            if !seen.insert(param.index) {
                return Err(ConfigError::DuplicateParamIndex {
                    target: target.to_owned(),
                    method: method.to_owned(),
                    index: param.index,
                });
            }
        }
        params.sort_by_key(|p| p.index);

        let results: Vec<&ResultKind> = self
            .registry
            .results()
            .iter()
            .filter(|r| r.target == target && r.method == method)
            .map(|r| &r.kind)
            .collect();
        let on_success = results.iter().find_map(|kind| match kind {
            ResultKind::EmitOnSuccess(rule) => Some(rule.clone()),
            _ => None,
        });
        let on_fail = results.iter().find_map(|kind| match kind {
            ResultKind::EmitOnFail(rule) => Some(rule.clone()),
            _ => None,
        });
        let skip_empty_result = results
            .iter()
            .any(|kind| matches!(kind, ResultKind::SkipEmitOnEmptyResult));

        Ok(ActionDescriptor {
            target: target.to_owned(),
            method: method.to_owned(),
            kind: kind.clone(),
            params: params
                .into_iter()
                .map(|p| ParamDescriptor {
                    index: p.index,
                    kind: p.kind.clone(),
                    coercion: p.coercion.clone(),
                    transform: p.transform.clone(),
                    options: p.options.clone(),
                })
                .collect(),
            on_success,
            on_fail,
            skip_empty_result,
            handler: binding.handler.clone(),
        })
    }
}
