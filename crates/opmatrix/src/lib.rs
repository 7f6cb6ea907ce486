/*! Unified interface for fixed-width integer operator matrices.
 *
 * Single import for everything you need: resolving the matrix, rendering the extension files, and
 * reading the rendered scripts back. Batteries-included entry point for generator workflows.
 */

pub use opmatrix_core as core;
pub use opmatrix_emit as emit;
pub use opmatrix_parser as parser;

pub use opmatrix_core::{
    evaluate, IntegerType, MatrixConfig, Operator, OperatorDefinition, OperatorMatrix, Outcome,
    ResultType,
};

pub use opmatrix_emit::{generate, Artifacts, EmitterConfig};

pub use opmatrix_parser::{parse_script, Statement};
