/*! Render an operator matrix as the files of a loadable extension.
 *
 * The core decides what every operator means; this crate only writes it down, three times over:
 * native C functions that compute and raise, SQL that registers them, and a regression script
 * that calls each one with literal operands. Each renderer walks the same definitions in the
 * same order, so the three files always agree with each other.
 */

pub mod config;
pub mod emitter;
pub mod native;
pub mod output;
pub mod pipeline;
pub mod registration;
pub mod scenario;

pub use config::{EmitterConfig, IndentStyle, VerbosityLevel};
pub use emitter::{section_title, CommentStyle, EmitContext, EmitHelper, EmitResult, Emitter};
pub use native::NativeEmitter;
pub use output::{DefinitionRow, OutputFormat, OutputFormatter};
pub use pipeline::{generate, render, Artifacts, Manifest, ManifestEntry};
pub use registration::RegistrationEmitter;
pub use scenario::{render_statement, ScenarioEmitter, EXPECTATION_MARKER};
