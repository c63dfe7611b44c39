//! `Owner`, `Observer` and the shared control block behind them.
//!
//! One control block per owned value, shared by the single `Owner` and by N `Observer`s.
//! The block keeps the value in a `Mutex<Option<T>>` slot (the borrow lock), a monotonic
//! `retiring` flag and an atomic count of live observers.  Dropping the `Owner` sets
//! `retiring`, then takes the slot under the lock, so the value's destructor runs exactly
//! once and is serialized against any in-flight borrow.  The block itself is freed by the
//! `Arc` strong count once the last handle lets go.
//!
//! `retiring` is read outside the lock by `expired()`/`live()`: a handle may well observe
//! "live" and then find the slot empty by the time it actually borrows.  Borrows are the
//! ground truth, the probes are hints.

use crate::any_to_str;
use crate::locked::Locked;
use fomat_macros::fomat;
use std::ops::{Deref, DerefMut};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

pub(crate) struct ControlBlock<T> {
  /// The value; `None` once destroyed.  Emptied only while the lock is held.
  slot: Mutex<Option<T>>,
  /// Set once, false → true, when the Owner starts going away.
  retiring: AtomicBool,
  /// Live `Observer` instances.  The Owner is not counted.
  observers: AtomicIsize}

impl<T> ControlBlock<T> {
  fn fresh (value: T) -> ControlBlock<T> {
    ControlBlock {
      slot: Mutex::new (Some (value)),
      retiring: AtomicBool::new (false),
      observers: AtomicIsize::new (0)}}

  /// A panic while borrowed must not brick the block: take the lock through the poison.
  fn slot_lock (&self) -> MutexGuard<'_, Option<T>> {
    self.slot.lock().unwrap_or_else (PoisonError::into_inner)}

  fn borrow (&self) -> Option<BorrowGuard<'_, T>> {
    let slot = self.slot_lock();
    if slot.is_some() {Some (BorrowGuard {slot})} else {None}}

  fn try_borrow (&self) -> Option<BorrowGuard<'_, T>> {
    let slot = match self.slot.try_lock() {
      Ok (slot) => slot,
      Err (TryLockError::Poisoned (poison)) => poison.into_inner(),
      Err (TryLockError::WouldBlock) => return None};
    if slot.is_some() {Some (BorrowGuard {slot})} else {None}}

  fn expired (&self) -> bool {
    self.retiring.load (Ordering::Acquire)}

  /// Owner destruction path.  Serializes with any in-flight borrow before the value goes.
  fn retire_owner (&self) {
    self.retiring.store (true, Ordering::Release);
    let mut slot = self.slot_lock();
    *slot = None}

  /// Observer destruction path.  The lock is only worth taking once `retiring` is visible:
  /// a releasing observer can win the lock ahead of the retiring owner and must then
  /// destroy the value itself (idempotent, the slot may already be empty).
  fn release_observer (&self) {
    self.observers.fetch_sub (1, Ordering::AcqRel);
    if self.retiring.load (Ordering::Acquire) {
      let mut slot = self.slot_lock();
      *slot = None}}

  fn adopt_observer (&self) {
    self.observers.fetch_add (1, Ordering::AcqRel);}}

fn lock_impl<T, R> (cb: Option<&ControlBlock<T>>, f: impl FnOnce (&mut T) -> R) -> Locked<R> {
  let mut guard = match cb.and_then (ControlBlock::borrow) {
    Some (guard) => guard,
    None => return Locked::Gone};
  match catch_unwind (AssertUnwindSafe (|| f (&mut guard))) {
    Ok (r) => Locked::Val (r),
    Err (payload) => Locked::Panic (match any_to_str (&*payload) {
      Some (msg) => fomat! ((msg)),
      None => fomat! ("unprintable panic payload")})}}

/// Scoped, exclusive access to the value.  At most one guard per control block is live
/// at any time; the lock is released when the guard drops, on every exit path.
pub struct BorrowGuard<'a, T> {
  slot: MutexGuard<'a, Option<T>>}

impl<'a, T> BorrowGuard<'a, T> {
  /// Explicit early release; same as dropping the guard.
  pub fn reset (self) {}}

impl<'a, T> Deref for BorrowGuard<'a, T> {
  type Target = T;
  fn deref (&self) -> &T {
    // The slot cannot empty out while this guard holds the lock.
    match self.slot.as_ref() {Some (v) => v, None => unreachable! ()}}}

impl<'a, T> DerefMut for BorrowGuard<'a, T> {
  fn deref_mut (&mut self) -> &mut T {
    match self.slot.as_mut() {Some (v) => v, None => unreachable! ()}}}

/// Allocates a value on the shared heap and returns its one and only [`Owner`].
pub fn make_owner<T> (value: T) -> Owner<T> {Owner::new (value)}

/// The unique lifecycle root of a shared value.  Move-only.
///
/// Dropping the `Owner` destroys the value (under the borrow lock, exactly once) even
/// while observers still hold the block; they will see `expired()` and empty borrows.
pub struct Owner<T> {
  cb: Option<Arc<ControlBlock<T>>>}

impl<T> Owner<T> {
  /// An empty `Owner`: no value, no control block.  Ideal for `static`s and for
  /// "not there" defaults; every operation degrades (`live()` is false, borrows are
  /// `None`, `lock` is `Gone`).
  pub const fn none() -> Owner<T> {Owner {cb: None}}

  pub fn new (value: T) -> Owner<T> {
    Owner {cb: Some (Arc::new (ControlBlock::fresh (value)))}}

  /// Spawns a counted, non-owning view of the value.
  pub fn get_observer (&self) -> Observer<T> {
    match &self.cb {
      Some (cb) => {
        cb.adopt_observer();
        Observer {cb: Some (Arc::clone (cb))}},
      None => Observer::none()}}

  /// Blocks until the borrow lock is free.  `None` iff the value is already destroyed
  /// (or the handle is empty); the lock is not kept in that case.
  pub fn borrow (&self) -> Option<BorrowGuard<'_, T>> {
    self.cb.as_deref()?.borrow()}

  /// Never blocks.  `None` on contention as well as on a destroyed value.
  pub fn try_borrow (&self) -> Option<BorrowGuard<'_, T>> {
    self.cb.as_deref()?.try_borrow()}

  /// Borrows, runs `f` and captures its outcome, panic included, into a [`Locked`].
  pub fn lock<R> (&self, f: impl FnOnce (&mut T) -> R) -> Locked<R> {
    lock_impl (self.cb.as_deref(), f)}

  /// Advisory: the value may be destroyed between this check and a borrow.
  pub fn expired (&self) -> bool {
    match &self.cb {Some (cb) => cb.expired(), None => true}}

  /// True iff the handle points at a block and the value is not (yet) retiring.  Advisory.
  pub fn live (&self) -> bool {
    match &self.cb {Some (cb) => !cb.expired(), None => false}}

  /// Number of live `Observer` instances on this block.
  pub fn observers (&self) -> isize {
    match &self.cb {Some (cb) => cb.observers.load (Ordering::Acquire), None => 0}}}

impl<T> Drop for Owner<T> {
  fn drop (&mut self) {
    if let Some (cb) = self.cb.take() {cb.retire_owner()}}}

/// A counted, cloneable, non-owning view of the value.
///
/// Cloning bumps the observer count on the block; dropping (or assigning away) releases
/// exactly one count per live instance.  An `Observer` may outlive its `Owner`, in which
/// case it reports `expired()` and its borrows come back empty.
pub struct Observer<T> {
  cb: Option<Arc<ControlBlock<T>>>}

impl<T> Observer<T> {
  /// An empty `Observer`; see [`Owner::none`].
  pub const fn none() -> Observer<T> {Observer {cb: None}}

  /// Same as `clone`.
  pub fn get_observer (&self) -> Observer<T> {self.clone()}

  pub fn borrow (&self) -> Option<BorrowGuard<'_, T>> {
    self.cb.as_deref()?.borrow()}

  pub fn try_borrow (&self) -> Option<BorrowGuard<'_, T>> {
    self.cb.as_deref()?.try_borrow()}

  pub fn lock<R> (&self, f: impl FnOnce (&mut T) -> R) -> Locked<R> {
    lock_impl (self.cb.as_deref(), f)}

  pub fn expired (&self) -> bool {
    match &self.cb {Some (cb) => cb.expired(), None => true}}

  pub fn live (&self) -> bool {
    match &self.cb {Some (cb) => !cb.expired(), None => false}}

  pub fn observers (&self) -> isize {
    match &self.cb {Some (cb) => cb.observers.load (Ordering::Acquire), None => 0}}}

impl<T> Clone for Observer<T> {
  fn clone (&self) -> Observer<T> {
    if let Some (cb) = &self.cb {cb.adopt_observer()}
    Observer {cb: self.cb.clone()}}}

impl<T> Drop for Observer<T> {
  fn drop (&mut self) {
    if let Some (cb) = self.cb.take() {cb.release_observer()}}}

impl<T> From<&Owner<T>> for Observer<T> {
  fn from (owner: &Owner<T>) -> Observer<T> {owner.get_observer()}}


#[cfg(all(test, feature = "nightly"))] mod bench {
  extern crate test;
  use super::*;

  #[bench] fn bench_try_borrow (b: &mut test::Bencher) {
    let owner = make_owner (0i32);
    b.iter (|| {
      let guard = owner.try_borrow().unwrap();
      test::black_box (*guard);})}

  #[bench] fn bench_borrow_mut (b: &mut test::Bencher) {
    let owner = make_owner (0i32);
    b.iter (|| {
      let mut guard = owner.borrow().unwrap();
      *guard = test::black_box (*guard + 1);})}

  #[bench] fn bench_get_observer (b: &mut test::Bencher) {
    let owner = make_owner (0i32);
    b.iter (|| {
      test::black_box (owner.get_observer());})}

  #[bench] fn bench_arc_mutex_lock (b: &mut test::Bencher) {
    let m = Arc::new (Mutex::new (0i32));
    b.iter (|| {
      let mut guard = m.lock().unwrap();
      *guard = test::black_box (*guard + 1);})}}
