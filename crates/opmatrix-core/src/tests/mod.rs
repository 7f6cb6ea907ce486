/*! Test coverage for the promotion and overflow engine.
 *
 * A wrong predicate silently wraps somebody's arithmetic, so these tests pin the lattice invariants,
 * the exact predicate shapes, and cross-check every generated operator against arbitrary-precision
 * arithmetic at the type boundaries.
 */

mod lattice_tests;
mod overflow_tests;
mod promotion_tests;
