//! Binds command-line tokens to typed, caller owned destinations.
//!
//! ```
//! use typed_arg_parse::{checks, Cardinality, Destination, Handler};
//!
//! let mut verbose = false;
//! let mut sizes: Vec<u32> = Vec::new();
//! {
//!     let mut handler = Handler::default();
//!     handler
//!         .add_argument("v,verbose", Destination::flag(&mut verbose), "more output")
//!         .unwrap();
//!     handler
//!         .add_argument("size", Destination::sequence(&mut sizes), "sizes to use")
//!         .unwrap()
//!         .with_cardinality(Cardinality::range(1, 3))
//!         .unwrap()
//!         .add_check(checks::range(10, 20).unwrap())
//!         .unwrap();
//!     handler
//!         .parse_args(["-v", "--size", "15", "--size", "12"])
//!         .unwrap();
//! }
//! assert!(verbose);
//! assert_eq!(sizes, vec![15, 12]);
//! ```

use std::fmt::Display;

pub mod argument_error;
pub mod argument_key;
pub mod cardinality;
pub mod checks;
pub mod constraint;
pub mod container;
pub mod destination;
pub mod formatter;
pub mod handler;
pub mod key_value;
pub mod parse_result;
pub mod settings;
mod token;
pub mod typed_argument;
pub mod value_mode;

pub use argument_error::ArgumentError;
pub use argument_key::ArgumentKey;
pub use cardinality::Cardinality;
pub use constraint::{Constraint, ConstraintKind};
pub use destination::{Destination, Shape, ValueTag, ValueType};
pub use handler::Handler;
pub use parse_result::{ArgumentFailure, ErrorKind, ParseReport, ParserError};
pub use settings::{HandlerSettings, HandlerSettingsBuilder};
pub use typed_argument::TypedArgument;
pub use value_mode::ValueMode;

fn string_vec_to_string<T: Display>(vec: &[T], add_parans: bool) -> String {
    if vec.is_empty() {
        (if add_parans { "[]" } else { "" }).to_string()
    } else {
        let mut builder = vec[0].to_string();

        if vec.len() > 1 {
            for vec_str in vec[1..].iter() {
                builder += format!(", {}", vec_str).as_str();
            }
        }

        if add_parans {
            format!("[{}]", builder)
        } else {
            builder
        }
    }
}
