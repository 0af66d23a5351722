//! Preference values and their plist encodings.

use crate::error::{Error, Result};
use plist::Value as Plist;
use std::fmt::Write as _;

/// A preference value with the type it is stored as.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<true/>` / `<false/>`
    Bool(bool),
    /// `<integer>`
    Integer(i64),
    /// `<real>`
    Real(f64),
    /// `<string>`
    String(String),
    /// `<array>`
    Array(Vec<Value>),
}

impl Value {
    /// Convert a stored plist value.
    ///
    /// Dictionaries, dates and data blobs have no counterpart and are
    /// reported as [`Error::UnsupportedType`].
    pub fn from_plist(value: &Plist, domain: &str, key: &str) -> Result<Self> {
        let unsupported = |kind: &'static str| Error::UnsupportedType {
            domain: domain.to_string(),
            key: key.to_string(),
            kind,
        };

        Ok(match value {
            Plist::Boolean(b) => Self::Bool(*b),
            Plist::Integer(i) => match i.as_signed() {
                Some(i) => Self::Integer(i),
                None => return Err(unsupported("unsigned integer above i64")),
            },
            Plist::Real(r) => Self::Real(*r),
            Plist::String(s) => Self::String(s.clone()),
            Plist::Array(items) => Self::Array(
                items
                    .iter()
                    .map(|item| Self::from_plist(item, domain, key))
                    .collect::<Result<_>>()?,
            ),
            Plist::Dictionary(_) => return Err(unsupported("dictionary")),
            Plist::Date(_) => return Err(unsupported("date")),
            Plist::Data(_) => return Err(unsupported("data")),
            _ => return Err(unsupported("unknown")),
        })
    }

    /// Arguments after `defaults write <domain> <key>` that store this value.
    ///
    /// Scalars use the typed flags. Arrays use `-array` with one XML
    /// fragment per item so item types survive the round trip.
    pub fn write_args(&self) -> Vec<String> {
        match self {
            Self::Bool(b) => vec!["-bool".into(), b.to_string()],
            Self::Integer(i) => vec!["-int".into(), i.to_string()],
            Self::Real(r) => vec!["-float".into(), format_real(*r)],
            Self::String(s) => vec!["-string".into(), s.clone()],
            Self::Array(items) => std::iter::once("-array".to_string())
                .chain(items.iter().map(Self::xml_fragment))
                .collect(),
        }
    }

    /// Plist XML fragment for this value
    pub fn xml_fragment(&self) -> String {
        match self {
            Self::Bool(true) => "<true/>".into(),
            Self::Bool(false) => "<false/>".into(),
            Self::Integer(i) => format!("<integer>{i}</integer>"),
            Self::Real(r) => format!("<real>{}</real>", format_real(*r)),
            Self::String(s) => format!("<string>{}</string>", escape_xml(s)),
            Self::Array(items) => {
                let mut xml = "<array>".to_string();
                for item in items {
                    xml.push_str(&item.xml_fragment());
                }
                xml.push_str("</array>");
                xml
            }
        }
    }
}

/// Always keep a decimal point so `0.0` is never written as `0`
fn format_real(r: f64) -> String {
    format!("{r:?}")
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\t' && c != '\n' => {
                let _ = write!(out, "&#{};", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_write_args() {
        assert_eq!(Value::Bool(true).write_args(), ["-bool", "true"]);
        assert_eq!(Value::Integer(-3).write_args(), ["-int", "-3"]);
        assert_eq!(Value::Real(0.0).write_args(), ["-float", "0.0"]);
        assert_eq!(Value::String("YES".into()).write_args(), ["-string", "YES"]);
    }

    #[test]
    fn test_array_write_args_keep_item_types() {
        let value = Value::Array(vec![
            Value::Integer(1),
            Value::String("a<b".into()),
            Value::Bool(false),
            Value::Real(2.5),
        ]);
        assert_eq!(
            value.write_args(),
            [
                "-array",
                "<integer>1</integer>",
                "<string>a&lt;b</string>",
                "<false/>",
                "<real>2.5</real>",
            ]
        );
    }

    #[test]
    fn test_from_plist() {
        assert_eq!(
            Value::from_plist(&Plist::Boolean(true), "d", "k").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::from_plist(&Plist::Integer(7_i64.into()), "d", "k").unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            Value::from_plist(&Plist::Real(0.0), "d", "k").unwrap(),
            Value::Real(0.0)
        );

        let nested = Plist::Array(vec![Plist::String("x".into()), Plist::Integer(2_i64.into())]);
        assert_eq!(
            Value::from_plist(&nested, "d", "k").unwrap(),
            Value::Array(vec![Value::String("x".into()), Value::Integer(2)])
        );
    }

    #[test]
    fn test_dictionary_is_unsupported() {
        let dict = Plist::Dictionary(plist::Dictionary::new());
        let err = Value::from_plist(&dict, "com.apple.dock", "persistent-apps").unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { kind: "dictionary", .. }));
    }
}
