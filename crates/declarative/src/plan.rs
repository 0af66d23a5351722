//! Declarations and validated plans

use crate::context::ApplyContext;
use crate::error::ValidationError;
use crate::guard::Guard;
use crate::resource::{BoxedResource, Resource};
use anyhow::{Context, Result};
use std::collections::HashMap;

/// A named resource plus the metadata the engine acts on
#[derive(Debug)]
pub struct Declaration {
    pub name: String,
    pub resource: BoxedResource,
    pub guards: Vec<Guard>,
    pub notifies: Vec<String>,
    pub depends_on: Vec<String>,
    pub tags: Vec<String>,
    pub best_effort: bool,
    /// Only runs when notified
    pub deferred: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, resource: impl Resource + 'static) -> Self {
        Self::boxed(name, Box::new(resource))
    }

    pub fn boxed(name: impl Into<String>, resource: BoxedResource) -> Self {
        Self {
            name: name.into(),
            resource,
            guards: Vec::new(),
            notifies: Vec::new(),
            depends_on: Vec::new(),
            tags: Vec::new(),
            best_effort: false,
            deferred: false,
        }
    }

    #[must_use]
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    #[must_use]
    pub fn notifies(mut self, target: impl Into<String>) -> Self {
        self.notifies.push(target.into());
        self
    }

    #[must_use]
    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        self.depends_on.push(target.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Evaluate the declaration's guards, then the resource's own check
    ///
    /// Any guard that holds makes the declaration satisfied.
    pub fn is_satisfied(&self, ctx: &ApplyContext) -> Result<bool> {
        for guard in &self.guards {
            if guard
                .is_satisfied(ctx)
                .with_context(|| format!("Failed to evaluate {}", guard.describe()))?
            {
                log::debug!("{}: {} holds", self.name, guard.describe());
                return Ok(true);
            }
        }
        self.resource.is_satisfied(ctx)
    }
}

/// An ordered declaration list that passed validation
#[derive(Debug)]
pub struct Plan {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
}

impl Plan {
    /// Validate declarations and build a plan
    ///
    /// Names must be unique and non-empty. Every dependency must name a
    /// resource declared earlier. Every notification target must exist.
    pub fn new(declarations: Vec<Declaration>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(declarations.len());
        for (position, decl) in declarations.iter().enumerate() {
            if decl.name.trim().is_empty() {
                return Err(ValidationError::EmptyName { position });
            }
            if index.insert(decl.name.clone(), position).is_some() {
                return Err(ValidationError::DuplicateName {
                    name: decl.name.clone(),
                });
            }
        }

        for (position, decl) in declarations.iter().enumerate() {
            for target in &decl.depends_on {
                match index.get(target) {
                    _ if *target == decl.name => {
                        return Err(ValidationError::DependencyCycle {
                            name: decl.name.clone(),
                        });
                    }
                    None => {
                        return Err(ValidationError::MissingDependency {
                            name: decl.name.clone(),
                            target: target.clone(),
                        });
                    }
                    Some(&at) if at > position => {
                        return Err(ValidationError::OrderingViolation {
                            name: decl.name.clone(),
                            target: target.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
            for target in &decl.notifies {
                if *target == decl.name {
                    return Err(ValidationError::SelfNotification {
                        name: decl.name.clone(),
                    });
                }
                if !index.contains_key(target) {
                    return Err(ValidationError::MissingNotificationTarget {
                        name: decl.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(Self {
            declarations,
            index,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Filter choosing which declarations a run processes
///
/// Empty selects everything. Otherwise a declaration is selected when its
/// name is listed or it carries any listed tag.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub names: Vec<String>,
    pub tags: Vec<String>,
}

impl Selector {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.tags.is_empty()
    }

    pub fn accepts(&self, decl: &Declaration) -> bool {
        self.is_empty()
            || self.names.contains(&decl.name)
            || decl.tags.iter().any(|t| self.tags.contains(t))
    }

    /// Names that match no declaration in the plan
    pub fn unknown_names<'a>(&'a self, plan: &Plan) -> Vec<&'a str> {
        self.names
            .iter()
            .filter(|n| plan.get(n).is_none())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{ScriptedRunner, context};
    use crate::types::ResourceKind;

    #[derive(Debug)]
    struct Noop(bool);

    impl Resource for Noop {
        fn kind(&self) -> ResourceKind {
            ResourceKind::CommandExecuted
        }
        fn description(&self) -> String {
            "noop".into()
        }
        fn is_satisfied(&self, _ctx: &ApplyContext) -> Result<bool> {
            Ok(self.0)
        }
        fn apply(&self, _ctx: &ApplyContext) -> Result<()> {
            Ok(())
        }
    }

    fn decl(name: &str) -> Declaration {
        Declaration::new(name, Noop(false))
    }

    #[test]
    fn test_valid_plan() {
        let plan = Plan::new(vec![
            decl("zsh"),
            decl("default shell").depends_on("zsh").notifies("reload"),
            decl("reload").deferred(),
        ])
        .unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.get("reload").unwrap().deferred);
    }

    #[test]
    fn test_duplicate_name() {
        let err = Plan::new(vec![decl("zsh"), decl("zsh")]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateName {
                name: "zsh".into()
            }
        );
    }

    #[test]
    fn test_empty_name() {
        let err = Plan::new(vec![decl("a"), decl("  ")]).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName { position: 1 });
        assert_eq!(err.resource(), None);
    }

    #[test]
    fn test_missing_dependency() {
        let err = Plan::new(vec![decl("shell").depends_on("zsh")]).unwrap_err();
        assert!(matches!(err, ValidationError::MissingDependency { .. }));
        assert_eq!(err.resource(), Some("shell"));
    }

    #[test]
    fn test_forward_dependency_is_ordering_violation() {
        let err = Plan::new(vec![decl("shell").depends_on("zsh"), decl("zsh")]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OrderingViolation {
                name: "shell".into(),
                target: "zsh".into()
            }
        );
    }

    #[test]
    fn test_mutual_dependency_is_rejected() {
        let err = Plan::new(vec![
            decl("a").depends_on("b"),
            decl("b").depends_on("a"),
        ])
        .unwrap_err();
        assert!(matches!(err, ValidationError::OrderingViolation { .. }));
    }

    #[test]
    fn test_self_dependency() {
        let err = Plan::new(vec![decl("a").depends_on("a")]).unwrap_err();
        assert_eq!(err, ValidationError::DependencyCycle { name: "a".into() });
    }

    #[test]
    fn test_notification_targets() {
        let missing = Plan::new(vec![decl("a").notifies("b")]).unwrap_err();
        assert!(matches!(missing, ValidationError::MissingNotificationTarget { .. }));

        let itself = Plan::new(vec![decl("a").notifies("a")]).unwrap_err();
        assert_eq!(itself, ValidationError::SelfNotification { name: "a".into() });

        // Notifications may point forward or backward
        assert!(Plan::new(vec![decl("a"), decl("b").notifies("a")]).is_ok());
    }

    #[test]
    fn test_selector() {
        let plan = Plan::new(vec![decl("zsh").tag("shell"), decl("fonts").tag("assets")]).unwrap();
        let zsh = plan.get("zsh").unwrap();
        let fonts = plan.get("fonts").unwrap();

        assert!(Selector::all().accepts(zsh));

        let by_tag = Selector {
            tags: vec!["shell".into()],
            ..Selector::default()
        };
        assert!(by_tag.accepts(zsh));
        assert!(!by_tag.accepts(fonts));

        let by_name = Selector {
            names: vec!["fonts".into(), "nope".into()],
            ..Selector::default()
        };
        assert!(by_name.accepts(fonts));
        assert_eq!(by_name.unknown_names(&plan), ["nope"]);
    }

    #[test]
    fn test_any_guard_satisfies() {
        let runner = ScriptedRunner::default();
        let ctx = context(&runner);

        let plain = decl("a");
        assert!(!plain.is_satisfied(&ctx).unwrap());

        let guarded = decl("b")
            .guard(Guard::OnlyIf(vec!["true".into()]))
            .guard(Guard::NotIf(vec!["true".into()]));
        assert!(guarded.is_satisfied(&ctx).unwrap());

        let own = Declaration::new("c", Noop(true));
        assert!(own.is_satisfied(&ctx).unwrap());
    }
}
