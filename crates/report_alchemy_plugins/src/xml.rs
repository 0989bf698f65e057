//! XML escaping helpers.

use std::fmt;

/// Escapes all special XML characters in a string.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A value that can be interpolated into XML text.
///
/// Strings are escaped, numbers are written as they are.
pub trait XmlValue {
    fn fmt_xml(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl XmlValue for str {
    fn fmt_xml(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_xml(self))
    }
}

impl XmlValue for String {
    fn fmt_xml(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt_xml(f)
    }
}

impl<T: XmlValue + ?Sized> XmlValue for &T {
    fn fmt_xml(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt_xml(f)
    }
}

macro_rules! verbatim_numbers {
    ($($t:ty),*) => {
        $(
            impl XmlValue for $t {
                fn fmt_xml(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(self, f)
                }
            }
        )*
    };
}

verbatim_numbers!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

/// Display adapter used by [`xml_text!`](crate::xml_text).
pub struct Interpolated<'a, T: XmlValue + ?Sized>(pub &'a T);

impl<T: XmlValue + ?Sized> fmt::Display for Interpolated<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_xml(f)
    }
}

/// Formats XML text, escaping every interpolated string.
///
/// ```
/// use report_alchemy_plugins::xml_text;
///
/// assert_eq!(xml_text!("<a n=\"{}\">{}</a>", 3, "x&y"), "<a n=\"3\">x&amp;y</a>");
/// ```
#[macro_export]
macro_rules! xml_text {
    ($template:literal $(, $value:expr)* $(,)?) => {
        format!($template $(, $crate::xml::Interpolated(&$value))*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("bar&<>'\"foo"), "bar&amp;&lt;&gt;&apos;&quot;foo");
    }

    #[test]
    fn test_xml_text_escapes_strings() {
        assert_eq!(xml_text!("a{}b{}c", "&", "<"), "a&amp;b&lt;c");
        assert_eq!(xml_text!("a{}b{}", "&", "<"), "a&amp;b&lt;");
        assert_eq!(xml_text!("{}b{}", "&", "<"), "&amp;b&lt;");
        assert_eq!(xml_text!("{}b{}c", "&", "<"), "&amp;b&lt;c");
        assert_eq!(xml_text!("{}b{}c{}", "&", "<", ">"), "&amp;b&lt;c&gt;");
        assert_eq!(xml_text!("{}{}{}", "&", "<", ">"), "&amp;&lt;&gt;");
    }

    #[test]
    fn test_xml_text_numbers_are_verbatim() {
        assert_eq!(xml_text!("a{}b{}c", 1, 2), "a1b2c");
        assert_eq!(xml_text!(" tests=\"{}\"", 3usize), " tests=\"3\"");
    }

    #[test]
    fn test_xml_text_owned_strings() {
        let name = String::from("a<b");
        assert_eq!(xml_text!("name=\"{}\"", name), "name=\"a&lt;b\"");
    }
}
