//! Component requirements gating which receivers see an event.

use crate::ecs::{ComponentMask, Family};

/// Predicate over an entity's component mask.
///
/// Chain alternatives with [`Requirement::or`]:
///
/// ```rust,ignore
/// let req = Requirement::all(&[Storage::family(), Sprite::family()])
///     .or(Requirement::one(Node::family()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Requirement {
    /// Every entity qualifies.
    #[default]
    Always,
    /// The entity owns every family in the mask.
    All(ComponentMask),
    /// The entity owns at least one family in the mask.
    Any(ComponentMask),
    /// At least one alternative holds.
    Or(Vec<Requirement>),
}

impl Requirement {
    /// Accepts every entity.
    #[must_use]
    pub const fn always() -> Self {
        Self::Always
    }

    /// Requires every listed family.
    #[must_use]
    pub fn all(families: &[Family]) -> Self {
        Self::All(ComponentMask::from_families(families))
    }

    /// Requires at least one listed family.
    #[must_use]
    pub fn any(families: &[Family]) -> Self {
        Self::Any(ComponentMask::from_families(families))
    }

    /// Requires a single family.
    #[must_use]
    pub fn one(family: Family) -> Self {
        Self::All(ComponentMask::from_families(&[family]))
    }

    /// Accepts entities matching either `self` or `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut alternatives) => {
                alternatives.push(other);
                Self::Or(alternatives)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Tests an entity's mask.
    #[must_use]
    pub fn accepts(&self, mask: &ComponentMask) -> bool {
        match self {
            Self::Always => true,
            Self::All(required) => mask.contains_all(required),
            Self::Any(required) => mask.contains_any(required),
            Self::Or(alternatives) => alternatives.iter().any(|r| r.accepts(mask)),
        }
    }
}
