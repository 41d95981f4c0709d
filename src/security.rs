//! Identifier cleaning and quoting for SQL text assembly.

mod identifiers;

pub use identifiers::{
    check_identifier_length, clean_name, quote_identifier, quote_qualified, resolve_schema,
};
