// The result of running a callable under a borrow, cf. `Owner::lock`.
// A panic inside the callable is captured here rather than unwinding into the caller.

/// Outcome of `lock (f)` on an [`Owner`], [`Observer`] or [`Handle`].
///
/// [`Owner`]: crate::Owner
/// [`Observer`]: crate::Observer
/// [`Handle`]: crate::Handle
#[derive(Debug, PartialEq)]
#[must_use = "this `Locked` may hold a captured panic, which should be handled"]
pub enum Locked<T> {
  /// The callable ran to completion.
  Val (T),
  /// The callable panicked; holds the stringified payload.
  Panic (String),
  /// There was nothing to borrow: the value is destroyed or the handle is empty.
  /// The callable was not invoked.
  Gone}

impl<T> Locked<T> {
  #[inline]
  pub fn ok (self) -> Option<T> {
    match self {Locked::Val (v) => Some (v), _ => None}}

  /// The captured panic message, if the callable panicked.
  #[inline]
  pub fn panicked (self) -> Option<String> {
    match self {Locked::Panic (msg) => Some (msg), _ => None}}

  #[inline]
  pub fn is_val (&self) -> bool {matches! (self, Locked::Val (_))}

  #[inline]
  pub fn is_gone (&self) -> bool {matches! (self, Locked::Gone)}

  #[inline]
  #[track_caller]
  pub fn expect (self, msg: &str) -> T {
    match self {
      Locked::Val (v) => v,
      Locked::Panic (err) => panic! ("{}: callable panicked: {:?}", msg, err),
      Locked::Gone => panic! ("{}: value gone", msg)}}

  #[inline]
  #[track_caller]
  pub fn unwrap (self) -> T {
    match self {
      Locked::Val (v) => v,
      Locked::Panic (err) => panic! ("called `Locked::unwrap()` on a `Panic` value: {:?}", err),
      Locked::Gone => panic! ("called `Locked::unwrap()` on `Gone`")}}

  #[inline]
  pub fn unwrap_or (self, default: T) -> T {
    match self {Locked::Val (v) => v, _ => default}}

  #[inline]
  pub fn map<U, F: FnOnce (T) -> U> (self, op: F) -> Locked<U> {
    match self {
      Locked::Val (v) => Locked::Val (op (v)),
      Locked::Panic (msg) => Locked::Panic (msg),
      Locked::Gone => Locked::Gone}}}
