//! Idempotent deployment primitives (check + apply pattern).
pub mod download;
pub mod editor;
pub mod fs;
pub mod integrations;
pub mod link;
pub mod link_tree;
pub mod manifest;
pub mod repo;

use anyhow::Result;

use crate::context::Context;

/// Minimal interface for resources that can be described, applied, and removed.
///
/// Resources whose state is determined by inspecting several things at once
/// (a checkout, a download destination) implement only this trait. Resources
/// with a single comparable state implement the richer [`Resource`]
/// super-trait.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Install the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// conflicts the options do not allow resolving, or failing tools.
    fn apply(&self, ctx: &Context) -> Result<ResourceChange>;

    /// Remove the resource, undoing a previous `apply()`.
    ///
    /// Default implementation returns an error; override in resources
    /// that support removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be removed, or if removal is
    /// not supported for this resource type.
    fn remove(&self, ctx: &Context) -> Result<ResourceChange> {
        let _ = ctx;
        anyhow::bail!(
            "operation 'remove' is not supported for resource '{}'",
            self.description()
        )
    }

    /// Apply or remove depending on the `uninstall` option.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`apply`](Self::apply) or
    /// [`remove`](Self::remove).
    fn deploy(&self, ctx: &Context) -> Result<ResourceChange> {
        if ctx.opts.uninstall {
            self.remove(ctx)
        } else {
            self.apply(ctx)
        }
    }
}

/// State of a resource on disk.
///
/// # Examples
///
/// ```
/// use dotfiles_deploy::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "points to /other".into() };
///
/// assert_ne!(missing, correct);
/// assert_ne!(wrong, correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// Description of what is there instead.
        current: String,
    },
    /// Resource cannot be replaced in place (e.g. the destination is a real
    /// directory).
    Invalid {
        /// Why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying or removing a resource.
///
/// # Examples
///
/// ```
/// use dotfiles_deploy::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "git not found".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// assert_ne!(noop, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, updated, or removed.
    Applied,
    /// Nothing had to change.
    AlreadyCorrect,
    /// Resource was left alone (missing tool, refused overwrite, ...).
    Skipped {
        /// Why the resource was skipped.
        reason: String,
    },
}

/// Resources that can independently determine their own state.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether [`apply`](Applicable::apply) would change anything.
    ///
    /// # Errors
    ///
    /// Propagates errors from `current_state()`.
    fn needs_change(&self) -> Result<bool> {
        Ok(!matches!(self.current_state()?, ResourceState::Correct))
    }
}
