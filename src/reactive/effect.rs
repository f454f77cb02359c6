use super::{EffectError, EffectId, EffectNode, Runtime};
use std::rc::Rc;

/// Handle to an effect registered with a [`Runtime`]. The effect is freed
/// once every handle is dropped and it has no subscriptions left.
#[derive(Clone)]
pub struct Effect {
    pub(super) node: Rc<EffectNode>,
}

impl Effect {
    pub(super) fn new(node: Rc<EffectNode>) -> Self {
        Self { node }
    }

    pub fn id(&self) -> EffectId {
        self.node.id
    }

    /// Re-run now, replacing the previous run's subscriptions with the ones
    /// this run makes. Does nothing once the runtime is gone.
    pub fn run(&self) -> Result<(), EffectError> {
        match Runtime::upgrade(&self.node.runtime) {
            Some(runtime) => runtime.run_node(&self.node),
            None => Ok(()),
        }
    }

    /// Drop all subscriptions. The effect won't be scheduled again until it
    /// is run by hand.
    pub fn cleanup(&self) {
        self.node.cleanup()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Effect").field(&self.node.id).finish()
    }
}

/// What an effect body may return: nothing, or a result whose error is
/// reported by [`Runtime::flush`].
pub trait EffectOutput {
    fn into_result(self) -> Result<(), EffectError>;
}

impl EffectOutput for () {
    fn into_result(self) -> Result<(), EffectError> {
        Ok(())
    }
}

impl<E: Into<EffectError>> EffectOutput for Result<(), E> {
    fn into_result(self) -> Result<(), EffectError> {
        self.map_err(Into::into)
    }
}
