/*
[INPUT]:  Statement fields and canonical statement text
[OUTPUT]: Rendered sign-in statements and parsed field sets
[POS]:    Message layer - canonical statement format
[UPDATE]: When the statement layout or builder inputs change
*/

pub mod builder;
pub mod parse;
pub mod statement;

pub use builder::MessageBuilder;
pub use statement::{AuthStatement, format_timestamp};
