use bluefeed_core::User;
use bluefeed_core::interests::{InterestDeltas, merge_into};
use bluefeed_storage::DocumentStore;

use crate::context::CallContext;
use crate::error::EngineError;

/// Fold `deltas` into the user's in-memory interests, then write the whole map
/// back with a single replace of the `interests` field.
///
/// The in-memory map is updated even when the write fails, so the caller's
/// copy reflects what was attempted.
pub fn merge_and_persist<S: DocumentStore>(
    ctx: &CallContext,
    store: &mut S,
    user: &mut User,
    deltas: &InterestDeltas,
) -> Result<(), EngineError> {
    ctx.check()?;
    merge_into(&mut user.interests, deltas);
    store.set_user_interests(user.id, &user.interests)?;
    Ok(())
}
