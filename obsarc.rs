#![allow(unknown_lints)]

#![cfg_attr(feature = "nightly", feature(test))]

//! A shared, heap-allocated value with exactly one [`Owner`] handle and any number of
//! copyable [`Observer`] handles.  Any handle may take a scoped, exclusive [`BorrowGuard`]
//! on the value; the value itself is destroyed deterministically and exactly once, no matter
//! how handle creation and destruction interleave across threads.
//!
//! ### Roles
//! * `Owner<T>` — move-only lifecycle root.  Dropping it retires the value: the value is
//!   destroyed under the borrow lock even if observers are still around.
//! * `Observer<T>` — counted, cloneable view.  Safe to outlive the Owner; after the Owner
//!   retires it reports `expired()` and its borrows come back empty.
//! * `Handle<T>` — either of the two behind one call surface.  Cloning a `Handle` always
//!   yields the observer side, never a second owner.
//! * `BorrowGuard<'_, T>` — exclusive access for as long as the guard lives; the lock is
//!   released on every exit path.
//!
//! ### Borrowing
//! * `borrow()` blocks until the lock is free; returns `None` once the value is gone.
//! * `try_borrow()` never blocks; `None` on contention or on a gone value.
//! * `lock (f)` borrows, runs `f (&mut T)` and returns [`Locked`]: the result, or the
//!   captured panic, or [`Locked::Gone`] when there was nothing left to borrow.
//!   A panic inside `f` is contained; it neither unwinds into the caller nor poisons
//!   the lock.
//!
//! There is no timeout on `borrow()`: a caller that never drops its guard starves every
//! other borrower, and stalls a concurrent Owner drop.  Liveness probes (`live()`,
//! `expired()`) read a flag outside the lock and are advisory only.

pub mod either;
pub mod handles;
pub mod locked;

pub use either::Handle;
pub use handles::{make_owner, BorrowGuard, Observer, Owner};
pub use locked::Locked;

use core::any::Any;

/// Best-effort stringification of a panic payload.
///
/// Covers the two shapes `panic!` actually produces (`&str` and `String`);
/// anything else comes back as `None`.
pub fn any_to_str<'a> (message: &'a dyn Any) -> Option<&'a str> {
  if let Some (message) = message.downcast_ref::<&str>() {return Some (message)}
  if let Some (message) = message.downcast_ref::<String>() {return Some (&message[..])}
  None}

#[cfg(test)] mod tests {
  use super::*;

  #[test] fn test_any_to_str() {
    let s: Box<dyn Any> = Box::new ("static");
    assert_eq! (any_to_str (&*s), Some ("static"));
    let s: Box<dyn Any> = Box::new (String::from ("owned"));
    assert_eq! (any_to_str (&*s), Some ("owned"));
    let s: Box<dyn Any> = Box::new (42u8);
    assert_eq! (any_to_str (&*s), None)}}
