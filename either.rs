//! `Handle`: one call surface over either an `Owner` or an `Observer`,
//! for code that does not care which role it holds.

use crate::handles::{BorrowGuard, Observer, Owner};
use crate::locked::Locked;

pub enum Handle<T> {
  Owner (Owner<T>),
  Observer (Observer<T>)}

impl<T> Handle<T> {
  /// Spawns a counted observer off whichever variant is held.
  pub fn get_observer (&self) -> Observer<T> {
    match self {Handle::Owner (o) => o.get_observer(), Handle::Observer (o) => o.get_observer()}}

  pub fn borrow (&self) -> Option<BorrowGuard<'_, T>> {
    match self {Handle::Owner (o) => o.borrow(), Handle::Observer (o) => o.borrow()}}

  pub fn try_borrow (&self) -> Option<BorrowGuard<'_, T>> {
    match self {Handle::Owner (o) => o.try_borrow(), Handle::Observer (o) => o.try_borrow()}}

  pub fn lock<R> (&self, f: impl FnOnce (&mut T) -> R) -> Locked<R> {
    match self {Handle::Owner (o) => o.lock (f), Handle::Observer (o) => o.lock (f)}}

  pub fn expired (&self) -> bool {
    match self {Handle::Owner (o) => o.expired(), Handle::Observer (o) => o.expired()}}

  pub fn live (&self) -> bool {
    match self {Handle::Owner (o) => o.live(), Handle::Observer (o) => o.live()}}

  pub fn observers (&self) -> isize {
    match self {Handle::Owner (o) => o.observers(), Handle::Observer (o) => o.observers()}}

  pub fn is_owner (&self) -> bool {matches! (self, Handle::Owner (_))}}

impl<T> Clone for Handle<T> {
  /// Cloning always degrades to the observer side, even when the source holds the Owner:
  /// ownership is never duplicated.  The clone of an owning `Handle` therefore expires
  /// as soon as the original is dropped.
  fn clone (&self) -> Handle<T> {Handle::Observer (self.get_observer())}}

impl<T> From<Owner<T>> for Handle<T> {
  fn from (owner: Owner<T>) -> Handle<T> {Handle::Owner (owner)}}

impl<T> From<Observer<T>> for Handle<T> {
  fn from (observer: Observer<T>) -> Handle<T> {Handle::Observer (observer)}}

impl<T> From<&Handle<T>> for Observer<T> {
  fn from (handle: &Handle<T>) -> Observer<T> {handle.get_observer()}}
