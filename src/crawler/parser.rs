//! HTML document parsing and querying
//!
//! Pages are parsed with `scraper` and queried with compiled [`Query`]
//! expressions. Two syntaxes are accepted:
//!
//! - **XPath subset** (expression starts with `/`): child (`/`) and descendant
//!   (`//`) steps with name tests and simple predicates, optionally ending in
//!   `@attr` or `text()`. Translated to a CSS selector.
//! - **CSS** (anything else): a selector, optionally suffixed with
//!   `::attr(name)` or `::text`.
//!
//! Without an attribute or text step each match is the element's HTML.

use crate::GrabError;
use scraper::{Html, Selector};

/// What is extracted from every selected element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// Serialized element HTML
    Html,
    /// Value of the named attribute; elements without it are skipped
    Attr(String),
    /// Concatenated text content
    Text,
}

/// A compiled query expression
#[derive(Debug, Clone)]
pub struct Query {
    selector: Selector,
    extract: Extract,
}

impl Query {
    /// Compiles a query expression
    ///
    /// # Example
    ///
    /// ```
    /// use grabber::crawler::{Document, Query};
    ///
    /// let query = Query::parse("//a[@class='next']/@href").unwrap();
    /// let doc = Document::parse(br#"<a class="next" href="/p/2">next</a>"#).unwrap();
    /// assert_eq!(doc.select(&query), vec!["/p/2".to_string()]);
    /// ```
    pub fn parse(expression: &str) -> Result<Self, GrabError> {
        let trimmed = expression.trim();

        let (css, extract) = if trimmed.starts_with('/') {
            translate_xpath(trimmed).map_err(|message| query_error(expression, message))?
        } else {
            split_css_suffix(trimmed).map_err(|message| query_error(expression, message))?
        };

        let selector = Selector::parse(&css).map_err(|e| {
            query_error(expression, format!("invalid selector '{}': {:?}", css, e))
        })?;

        Ok(Self { selector, extract })
    }
}

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses raw response bytes
    ///
    /// Invalid UTF-8 sequences are replaced. A body that is empty (or only
    /// whitespace) is not a document.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            return Err("empty document".to_string());
        }

        Ok(Self {
            html: Html::parse_document(&text),
        })
    }

    /// Evaluates a query, returning matches in document order
    pub fn select(&self, query: &Query) -> Vec<String> {
        let elements = self.html.select(&query.selector);

        match &query.extract {
            Extract::Html => elements.map(|element| element.html()).collect(),
            Extract::Attr(name) => elements
                .filter_map(|element| element.value().attr(name))
                .map(str::to_string)
                .collect(),
            Extract::Text => elements
                .map(|element| element.text().collect::<String>())
                .collect(),
        }
    }
}

/// Parses `body` and runs `expression` against it
///
/// Kept synchronous: `scraper::Html` is not `Send`, so the document must not
/// live across an await point.
pub fn query_page(url: &str, body: &[u8], expression: &str) -> Result<Vec<String>, GrabError> {
    let document = Document::parse(body).map_err(|message| GrabError::Parse {
        url: url.to_string(),
        message,
    })?;
    let query = Query::parse(expression)?;
    Ok(document.select(&query))
}

fn query_error(expression: &str, message: String) -> GrabError {
    GrabError::Query {
        query: expression.to_string(),
        message,
    }
}

/// Splits `::attr(name)` / `::text` off a CSS expression
fn split_css_suffix(expression: &str) -> Result<(String, Extract), String> {
    if let Some(selector) = expression.strip_suffix("::text") {
        return Ok((selector.trim().to_string(), Extract::Text));
    }

    if let Some(rest) = expression.strip_suffix(')') {
        if let Some((selector, attr)) = rest.rsplit_once("::attr(") {
            let attr = attr.trim().trim_matches(|c| c == '"' || c == '\'');
            if attr.is_empty() {
                return Err("empty attribute name".to_string());
            }
            return Ok((selector.trim().to_string(), Extract::Attr(attr.to_string())));
        }
    }

    Ok((expression.to_string(), Extract::Html))
}

/// Translates an XPath location path into a CSS selector
fn translate_xpath(expression: &str) -> Result<(String, Extract), String> {
    let mut css = String::new();
    let mut extract = Extract::Html;
    let mut rest = expression;
    let mut first = true;

    while !rest.is_empty() {
        if extract != Extract::Html {
            return Err("attribute or text() must be the last step".to_string());
        }

        let descendant = rest.starts_with("//");
        rest = if descendant { &rest[2..] } else { rest.strip_prefix('/').ok_or("expected '/'")? };

        let end = step_end(rest)?;
        let step = &rest[..end];
        rest = &rest[end..];

        if step.is_empty() {
            return Err("empty step".to_string());
        }

        if let Some(attr) = step.strip_prefix('@') {
            if attr.is_empty() || attr == "*" {
                return Err(format!("unsupported attribute step '{}'", step));
            }
            extract = Extract::Attr(attr.to_string());
            continue;
        }

        if step == "text()" {
            extract = Extract::Text;
            continue;
        }

        if !first {
            css.push_str(if descendant { " " } else { " > " });
        }

        css.push_str(&translate_step(step, first && !descendant)?);
        first = false;
    }

    if css.is_empty() {
        return Err("no element step".to_string());
    }

    Ok((css, extract))
}

/// Byte offset of the next step separator outside brackets and quotes
fn step_end(rest: &str) -> Result<usize, String> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (index, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1).ok_or("unbalanced ']'")?,
            (None, '/') if depth == 0 => return Ok(index),
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return Err("unterminated predicate".to_string());
    }

    Ok(rest.len())
}

/// Translates one `name[pred]...` step
fn translate_step(step: &str, rooted: bool) -> Result<String, String> {
    let (name, mut predicates) = match step.find('[') {
        Some(index) => (&step[..index], &step[index..]),
        None => (step, ""),
    };

    let is_name = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if name.is_empty() || !(name == "*" || is_name) {
        return Err(format!("unsupported step '{}'", step));
    }

    let mut css = name.to_string();
    if rooted {
        css.push_str(":root");
    }

    while !predicates.is_empty() {
        let inner_end = step_end_of_predicate(predicates)?;
        let predicate = predicates[1..inner_end].trim();
        predicates = &predicates[inner_end + 1..];
        css.push_str(&translate_predicate(predicate, name == "*")?);
    }

    Ok(css)
}

/// Index of the `]` closing the predicate that starts at offset 0
fn step_end_of_predicate(predicates: &str) -> Result<usize, String> {
    if !predicates.starts_with('[') {
        return Err(format!("unexpected '{}'", predicates));
    }

    let mut quote: Option<char> = None;
    for (index, c) in predicates.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Ok(index),
            (None, '[') => return Err("nested predicates are not supported".to_string()),
            _ => {}
        }
    }

    Err("unterminated predicate".to_string())
}

fn translate_predicate(predicate: &str, any_name: bool) -> Result<String, String> {
    if let Ok(position) = predicate.parse::<usize>() {
        if position == 0 {
            return Err("positions start at 1".to_string());
        }
        return Ok(if any_name {
            format!(":nth-child({})", position)
        } else {
            format!(":nth-of-type({})", position)
        });
    }

    if predicate == "last()" {
        return Ok(if any_name { ":last-child" } else { ":last-of-type" }.to_string());
    }

    if let Some(attr) = predicate.strip_prefix('@') {
        return match attr.split_once('=') {
            Some((name, value)) => Ok(format!(
                "[{}=\"{}\"]",
                attribute_name(name)?,
                string_literal(value)?
            )),
            None => Ok(format!("[{}]", attribute_name(attr)?)),
        };
    }

    for (function, operator) in [("contains", "*="), ("starts-with", "^=")] {
        if let Some(arguments) = predicate
            .strip_prefix(function)
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let (attr, value) = arguments
                .split_once(',')
                .ok_or_else(|| format!("{}() takes two arguments", function))?;
            let attr = attr
                .trim()
                .strip_prefix('@')
                .ok_or_else(|| format!("{}() only works on attributes", function))?;
            return Ok(format!(
                "[{}{}\"{}\"]",
                attribute_name(attr)?,
                operator,
                string_literal(value)?
            ));
        }
    }

    Err(format!("unsupported predicate '[{}]'", predicate))
}

fn attribute_name(name: &str) -> Result<&str, String> {
    let name = name.trim();
    let valid = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == ':');
    if !name.is_empty() && valid {
        Ok(name)
    } else {
        Err(format!("invalid attribute name '{}'", name))
    }
}

fn string_literal(value: &str) -> Result<&str, String> {
    let value = value.trim();
    let unquoted = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .ok_or_else(|| format!("expected a quoted string, got '{}'", value))?;

    if unquoted.contains('"') {
        return Err(format!("unsupported string '{}'", value));
    }

    Ok(unquoted)
}
