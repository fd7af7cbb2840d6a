//! # Channels: per-key state with merge policies
//!
//! A graph declares its state as a list of [`Channel`]s. Each channel has a key, a
//! default-value factory and a [`Reducer`] that merges node updates into the current
//! value. The [`ChannelStore`] owns the values of one run and is the only place
//! where they change.
//!
//! | Reducer        | Merge                                    | Additive |
//! |----------------|------------------------------------------|----------|
//! | [`LastValue`]  | update replaces current                  | no       |
//! | [`Append`]     | current ++ update (scalars pushed)       | yes      |
//! | [`AddMessages`]| replace by id, remove by tombstone, append | yes    |
//! | [`FnReducer`]  | caller-supplied binary operator          | yes      |
//!
//! Non-additive channels accept one writer per step; two writers in the same step is
//! a [`ChannelError::ConcurrentWriteConflict`].

mod channel;
mod channel_error;
mod reducer;
mod store;

pub use channel::{Channel, DefaultFn};
pub use channel_error::ChannelError;
pub use reducer::{reducer_fn, AddMessages, Append, FnReducer, LastValue, Reducer};
pub use store::ChannelStore;
