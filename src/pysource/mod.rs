//! Reading FIT SDK Python sources as declarative data.
//!
//! The SDK ships its profile and base-type tables as Python modules whose
//! interesting content is plain top-level literal assignments. Instead of
//! executing that code, this module lexes and parses the source and evaluates
//! only `NAME = <literal>` statements into a name-to-value table, so no
//! foreign code ever runs. Anything outside the literal subset (imports,
//! function definitions, computed expressions) binds nothing.

pub mod lexer;
pub mod parser;
pub mod resolver;

pub use resolver::find_module;
