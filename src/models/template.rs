//! Input file name templates.
//!
//! `file_basename` holds a printf-style template with at most one
//! placeholder, substituted with each run or seed identifier of
//! `file_list`. Supported conversions are `%d`, `%i` and `%s`, optionally
//! with a width (`%3d`) or zero padding (`%03d`). `%%` is a literal percent
//! sign.

use std::fmt;

/// Widest field a placeholder may request.
pub const MAX_TEMPLATE_WIDTH: usize = 64;

use thiserror::Error;

/// Reasons a template cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `%` at the very end of the template.
    #[error("dangling '%' at end of template")]
    Dangling,
    /// A conversion other than `d`, `i` or `s`.
    #[error("unsupported conversion '%{0}'")]
    UnsupportedConversion(char),
    /// More than one placeholder.
    #[error("more than one placeholder")]
    MultiplePlaceholders,
    /// A field width above [`MAX_TEMPLATE_WIDTH`].
    #[error("field width exceeds {}", MAX_TEMPLATE_WIDTH)]
    WidthTooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Integer,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder {
    conversion: Conversion,
    zero_pad: bool,
    width: usize,
}

impl Placeholder {
    fn render(&self, id: i64) -> String {
        let width = self.width;
        match self.conversion {
            Conversion::Integer if self.zero_pad => format!("{:0width$}", id),
            Conversion::Integer | Conversion::Text => format!("{:>width$}", id),
        }
    }
}

/// A parsed file name template.
///
/// # Example
///
/// ```
/// use digicam_config::models::PathTemplate;
///
/// let template = PathTemplate::parse("run_%03d.fits.fz").unwrap();
/// assert_eq!(template.expand(7), "run_007.fits.fz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    prefix: String,
    placeholder: Option<Placeholder>,
    suffix: String,
}

impl PathTemplate {
    /// Parses a template string.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholder = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let literal = if placeholder.is_some() {
                &mut suffix
            } else {
                &mut prefix
            };
            if c != '%' {
                literal.push(c);
                continue;
            }

            let mut zero_pad = false;
            let mut width = 0usize;
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }
            if chars.peek() == Some(&'0') {
                chars.next();
                zero_pad = true;
            }
            while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                chars.next();
                width = width
                    .checked_mul(10)
                    .and_then(|w| w.checked_add(digit as usize))
                    .filter(|&w| w <= MAX_TEMPLATE_WIDTH)
                    .ok_or(TemplateError::WidthTooLarge)?;
            }

            let conversion = match chars.next() {
                None => return Err(TemplateError::Dangling),
                Some('d') | Some('i') => Conversion::Integer,
                Some('s') => Conversion::Text,
                Some(other) => return Err(TemplateError::UnsupportedConversion(other)),
            };
            if placeholder.is_some() {
                return Err(TemplateError::MultiplePlaceholders);
            }
            placeholder = Some(Placeholder {
                conversion,
                zero_pad,
                width,
            });
        }

        Ok(Self {
            source: source.to_string(),
            prefix,
            placeholder,
            suffix,
        })
    }

    /// Returns the template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true when the template contains a placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Substitutes `id` into the placeholder. A template without a
    /// placeholder expands to its literal text.
    pub fn expand(&self, id: i64) -> String {
        match &self.placeholder {
            Some(placeholder) => {
                format!("{}{}{}", self.prefix, placeholder.render(id), self.suffix)
            }
            None => self.prefix.clone(),
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
