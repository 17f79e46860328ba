//! Canonical string encoding of header and transaction fields.

use num_bigint::BigUint;
use std::borrow::Cow;

/// A value that can appear as one field of an encoded header.
pub trait EncodeField {
    fn encode_field(&self) -> Cow<'_, str>;
}

impl EncodeField for &str {
    fn encode_field(&self) -> Cow<'_, str> {
        Cow::Borrowed(*self)
    }
}

impl EncodeField for String {
    fn encode_field(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

/// Booleans keep the capitalised spelling so header strings stay hash-compatible
/// with blocks produced by existing nodes.
impl EncodeField for bool {
    fn encode_field(&self) -> Cow<'_, str> {
        Cow::Borrowed(if *self { "True" } else { "False" })
    }
}

impl EncodeField for BigUint {
    fn encode_field(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_str_radix(10))
    }
}

impl EncodeField for u64 {
    fn encode_field(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

/// Stringify every field and join them with `sep`. Never fails.
pub fn encode_as_str(fields: &[&dyn EncodeField], sep: char) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&field.encode_field());
    }
    out
}

/// Join already-rendered items, e.g. the string forms of a transaction list.
pub fn join_with<I, S>(items: I, sep: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(item.as_ref());
    }
    out
}
