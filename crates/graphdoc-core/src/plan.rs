//! Fetch plans: the bounded relation-traversal trees the planner emits and
//! the engine consumes.

/// How a step's target is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Full eager load: related entities are fetched and included.
    Eager,
    /// Terminal countable-only traversal: only the cardinality is fetched.
    CountOnly,
}

/// One relation-traversal step.
///
/// Polymorphic relations appear as several sibling steps sharing a relation
/// name but differing in `target_type`; each branch carries its own children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStep {
    /// Relationship name on the parent type.
    pub relation: String,
    /// The type the step starts from.
    pub parent_type: String,
    /// The single concrete type this step resolves to.
    pub target_type: String,
    /// Eager load or count-only.
    pub kind: StepKind,
    /// Steps continuing from the fetched entities.
    pub children: Vec<FetchStep>,
}

impl FetchStep {
    /// Create an eager step with no children.
    pub fn eager(
        relation: impl Into<String>,
        parent_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.into(),
            parent_type: parent_type.into(),
            target_type: target_type.into(),
            kind: StepKind::Eager,
            children: Vec::new(),
        }
    }

    /// Create a count-only step.
    pub fn count_only(
        relation: impl Into<String>,
        parent_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.into(),
            parent_type: parent_type.into(),
            target_type: target_type.into(),
            kind: StepKind::CountOnly,
            children: Vec::new(),
        }
    }

    /// Depth of the subtree rooted at this step (this step counts as 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(FetchStep::depth)
            .max()
            .unwrap_or(0)
    }
}

/// An ordered tree of traversal steps for one request. Derived from the
/// include directives plus the root type's always-include set, consumed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPlan {
    /// Resource type the plan starts from.
    pub root_type: String,
    /// Top-level steps.
    pub steps: Vec<FetchStep>,
}

impl FetchPlan {
    /// An empty plan rooted at `root_type`.
    pub fn new(root_type: impl Into<String>) -> Self {
        Self {
            root_type: root_type.into(),
            steps: Vec::new(),
        }
    }

    /// Maximum traversal depth across all steps.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.steps.iter().map(FetchStep::depth).max().unwrap_or(0)
    }

    /// True when the plan fetches nothing beyond the primary data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
