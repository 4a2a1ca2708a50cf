//! The include path planner.
//!
//! Expands dotted include paths against the resource-type graph into a
//! [`FetchPlan`]: a tree of relation-traversal steps bounded by the root
//! type's include depth. Traversal is bounded by segment count, not cycle
//! detection; depth limits already prevent unbounded expansion over cyclic
//! schemas.
//!
//! Rejection is all-or-nothing per path: a path that exceeds depth, crosses a
//! relation ineligible for eager loading, or references an unknown segment is
//! rejected whole, never truncated. Unknown segments are rejected here even
//! when directive validation upstream should have caught them; a path is
//! never silently dropped.

use tracing::debug;

use graphdoc_core::{
    Error, FetchPlan, FetchStep, IncludeRejection, QueryDirectives, RelationshipDef, ResourceType,
    Result, StepKind,
};
use graphdoc_schema::SchemaRegistry;

/// Expand the request's include directives (plus always-include sets and
/// count-only traversals) into a fetch plan.
pub fn plan_includes(
    registry: &SchemaRegistry,
    root_type: &str,
    directives: &QueryDirectives,
) -> Result<FetchPlan> {
    let root = registry.get(root_type)?;
    let mut plan = FetchPlan::new(root_type);

    // The root type's always-on relations are merged unconditionally,
    // independent of client paths and of the client depth limit.
    merge_always_includes(root, &mut plan.steps)?;

    for path in &directives.include {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::invalid_include(path, IncludeRejection::UnknownSegment));
        }
        if segments.len() > root.max_include_depth {
            return Err(Error::invalid_include(path, IncludeRejection::DepthExceeded));
        }
        let steps = expand_path(registry, root, &segments, path)?;
        for step in steps {
            merge_step(&mut plan.steps, step);
        }
    }

    // Every traversed type brings its own always-on relations along, so a
    // resource never lands in the document with the relations its derived
    // attributes depend on unfetched.
    let mut trail = vec![root.name.clone()];
    attach_always_includes(registry, &mut plan.steps, &mut trail)?;

    // Count-only traversals for requested countable relations that no eager
    // step already covers.
    for name in &directives.count_requested {
        let Some(rel) = root.countable_relationship(name) else {
            continue;
        };
        let already_eager = plan
            .steps
            .iter()
            .any(|s| s.relation == rel.name && s.kind == StepKind::Eager);
        let already_counted = plan
            .steps
            .iter()
            .any(|s| s.relation == rel.name && s.kind == StepKind::CountOnly);
        if !already_eager && !already_counted {
            plan.steps.push(FetchStep::count_only(
                rel.name.clone(),
                root.name.clone(),
                rel.targets[0].clone(),
            ));
        }
    }

    debug!(
        root = %root_type,
        steps = plan.steps.len(),
        depth = plan.depth(),
        "include plan built"
    );
    Ok(plan)
}

/// Expand one dotted path from `current` into traversal steps. Polymorphic
/// relations fan out into one step per sub-relationship; the tail is resolved
/// independently against each branch and must resolve against at least one.
fn expand_path(
    registry: &SchemaRegistry,
    current: &ResourceType,
    segments: &[&str],
    full_path: &str,
) -> Result<Vec<FetchStep>> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(Vec::new());
    };

    let rel = current
        .relationship_def(segment)
        .ok_or_else(|| Error::invalid_include(full_path, IncludeRejection::UnknownSegment))?;
    if !rel.eager_load {
        return Err(Error::invalid_include(
            full_path,
            IncludeRejection::NotEagerLoadable,
        ));
    }

    let mut steps = fan_out(current, rel);
    if rest.is_empty() {
        return Ok(steps);
    }

    let mut resolved_any = false;
    for step in &mut steps {
        let target = registry.get(&step.target_type)?;
        match expand_path(registry, target, rest, full_path) {
            Ok(children) => {
                resolved_any = true;
                step.children = children;
            }
            // A branch lacking the tail segment is simply not expanded
            // further; it only becomes an error if no branch resolves it.
            Err(Error::InvalidIncludePath {
                reason: IncludeRejection::UnknownSegment,
                ..
            }) if steps_fan_wide(rel) => {}
            Err(e) => return Err(e),
        }
    }
    if !resolved_any {
        return Err(Error::invalid_include(
            full_path,
            IncludeRejection::UnknownSegment,
        ));
    }
    Ok(steps)
}

fn steps_fan_wide(rel: &RelationshipDef) -> bool {
    rel.is_polymorphic()
}

/// Merge a type's always-on relations into a sibling step list.
fn merge_always_includes(rt: &ResourceType, siblings: &mut Vec<FetchStep>) -> Result<()> {
    for relation in &rt.always_include {
        let rel = rt
            .relationship_def(relation)
            .ok_or_else(|| Error::UnknownRelationship {
                resource_type: rt.name.clone(),
                relation: relation.clone(),
            })?;
        for step in fan_out(rt, rel) {
            merge_step(siblings, step);
        }
    }
    Ok(())
}

/// Attach each eager step's target-type always-on relations as children,
/// recursively, exempt from the client depth limit. An always-include chain
/// stops expanding at a type already on the current ancestor trail, which
/// keeps mutually always-including types bounded.
fn attach_always_includes(
    registry: &SchemaRegistry,
    steps: &mut [FetchStep],
    trail: &mut Vec<String>,
) -> Result<()> {
    for step in steps {
        if step.kind != StepKind::Eager {
            continue;
        }
        if !trail.contains(&step.target_type) {
            let target = registry.get(&step.target_type)?;
            merge_always_includes(target, &mut step.children)?;
        }
        trail.push(step.target_type.clone());
        attach_always_includes(registry, &mut step.children, trail)?;
        trail.pop();
    }
    Ok(())
}

/// One eager step per concrete target type of the relation.
fn fan_out(parent: &ResourceType, rel: &RelationshipDef) -> Vec<FetchStep> {
    if rel.is_polymorphic() {
        rel.sub_relationships
            .iter()
            .map(|sub| FetchStep::eager(rel.name.clone(), parent.name.clone(), sub.target.clone()))
            .collect()
    } else {
        vec![FetchStep::eager(
            rel.name.clone(),
            parent.name.clone(),
            rel.targets[0].clone(),
        )]
    }
}

/// Merge a step into a sibling list, unioning children of steps that share a
/// relation and target (two paths with a common prefix plan one traversal).
fn merge_step(siblings: &mut Vec<FetchStep>, step: FetchStep) {
    if let Some(existing) = siblings.iter_mut().find(|s| {
        s.relation == step.relation && s.target_type == step.target_type && s.kind == step.kind
    }) {
        for child in step.children {
            merge_step(&mut existing.children, child);
        }
    } else {
        siblings.push(step);
    }
}
