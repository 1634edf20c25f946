//! Runtime values for Cascade: numbers with units, colors, strings, lists,
//! maps and deferred CSS math, together with the arithmetic over them.

mod collection;
mod color;
mod error;
mod math;
mod number;
pub mod ops;
mod serialize;
mod value;

pub use collection::{ArgList, List, Map, Separator};
pub use color::{Color, ColorModel};
pub use error::{ValueError, ValueResult};
pub use math::{CalcNode, CalcOp, MathFunction, MathName, Reduction};
pub use number::{Number, PRECISION, conversion_factor, format_number, fuzzy_eq, fuzzy_is_int};
pub use value::{Quote, Str, Value};
