//! User-defined composition: composed groups, keyed groups and composite vars
//!
//! Runs strictly after native synthesis so expressions can reference the
//! native variables. Expressions are deliberately small: JSON literals,
//! dotted variable references, `!`, and `==` / `!=` comparisons.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::CoreError;
use crate::graph::InventoryGraph;
use crate::naming::clean_group_name;
use crate::record::is_truthy;

/// Template for deriving group names from a variable value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyedGroup {
    /// Expression producing the group key
    pub key: String,
    /// Static prefix for the group name
    #[serde(default)]
    pub prefix: String,
    /// Separator between prefix and key value
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    "_".to_string()
}

/// User-authored composition rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Group name -> membership expression
    #[serde(default)]
    pub groups: BTreeMap<String, String>,
    /// Keyed-group templates
    #[serde(default)]
    pub keyed_groups: Vec<KeyedGroup>,
    /// Variable name -> value expression
    #[serde(default)]
    pub compose: BTreeMap<String, String>,
    /// Fail the run on unresolved expressions instead of skipping them
    #[serde(default)]
    pub strict: bool,
}

impl ComposeConfig {
    /// Check whether any rule is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.keyed_groups.is_empty() && self.compose.is_empty()
    }
}

/// Apply all composition rules to one entry.
///
/// Membership and variables are added to `graph`; composite vars may
/// overwrite native ones. Under strict mode the first failing expression
/// aborts, otherwise it is skipped with a warning.
///
/// # Errors
/// Returns `CoreError::Composition` when an expression fails and `strict`
/// is set.
pub fn apply_composition(
    graph: &mut InventoryGraph,
    config: &ComposeConfig,
    key: &str,
) -> Result<(), CoreError> {
    if config.is_empty() {
        return Ok(());
    }

    let vars = graph.entry(key).map(|e| e.vars.clone()).unwrap_or_default();

    for (group, expr) in &config.groups {
        match evaluate(expr, &vars) {
            Ok(value) => {
                if is_truthy(Some(&value)) {
                    graph.add_group(group.as_str());
                    graph.add_child(group, key);
                }
            }
            Err(e) if config.strict => return Err(e),
            Err(e) => warn!(group = %group, error = %e, "skipping composed group"),
        }
    }

    for keyed in &config.keyed_groups {
        match evaluate(&keyed.key, &vars) {
            Ok(Value::Null) => {}
            Ok(value) => {
                let token = value_token(&value);
                let name = if keyed.prefix.is_empty() {
                    clean_group_name(&token)
                } else {
                    clean_group_name(&format!("{}{}{}", keyed.prefix, keyed.separator, token))
                };
                graph.add_group(name.as_str());
                graph.add_child(&name, key);
            }
            Err(e) if config.strict => return Err(e),
            Err(e) => warn!(key = %keyed.key, error = %e, "skipping keyed group"),
        }
    }

    for (name, expr) in &config.compose {
        match evaluate(expr, &vars) {
            Ok(value) => graph.set_variable(key, name, value),
            Err(e) if config.strict => return Err(e),
            Err(e) => warn!(var = %name, error = %e, "skipping composite var"),
        }
    }

    Ok(())
}

/// Render a value as a group-name fragment
fn value_token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Evaluate an expression against an entry's variables
pub fn evaluate(expr: &str, vars: &BTreeMap<String, Value>) -> Result<Value, CoreError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression(vars)?;
    if parser.pos != parser.tokens.len() {
        return Err(CoreError::Composition(format!(
            "trailing input in expression '{expr}'"
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Eq,
    Ne,
    Bang,
    Literal(Value),
    Reference(Vec<String>),
}

fn tokenize(expr: &str) -> Result<Vec<Token>, CoreError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '=' | '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(if c == '=' { Token::Eq } else { Token::Ne });
                i += 2;
            }
            '!' => {
                tokens.push(Token::Bang);
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end == chars.len() {
                    return Err(CoreError::Composition(format!(
                        "unterminated string in expression '{expr}'"
                    )));
                }
                let s: String = chars[start..end].iter().collect();
                tokens.push(Token::Literal(Value::String(s)));
                i = end + 1;
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let s: String = chars[start..i].iter().collect();
                let number: serde_json::Number = s.parse().map_err(|_| {
                    CoreError::Composition(format!("invalid number '{s}' in expression '{expr}'"))
                })?;
                tokens.push(Token::Literal(Value::Number(number)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::Literal(Value::Bool(true)),
                    "false" => Token::Literal(Value::Bool(false)),
                    "null" => Token::Literal(Value::Null),
                    _ => Token::Reference(word.split('.').map(str::to_string).collect()),
                });
            }
            other => {
                return Err(CoreError::Composition(format!(
                    "unexpected character '{other}' in expression '{expr}'"
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn expression(&mut self, vars: &BTreeMap<String, Value>) -> Result<Value, CoreError> {
        let left = self.unary(vars)?;
        match self.tokens.get(self.pos) {
            Some(Token::Eq) => {
                self.pos += 1;
                let right = self.unary(vars)?;
                Ok(Value::Bool(left == right))
            }
            Some(Token::Ne) => {
                self.pos += 1;
                let right = self.unary(vars)?;
                Ok(Value::Bool(left != right))
            }
            _ => Ok(left),
        }
    }

    fn unary(&mut self, vars: &BTreeMap<String, Value>) -> Result<Value, CoreError> {
        if self.tokens.get(self.pos) == Some(&Token::Bang) {
            self.pos += 1;
            let value = self.unary(vars)?;
            return Ok(Value::Bool(!is_truthy(Some(&value))));
        }
        self.primary(vars)
    }

    fn primary(&mut self, vars: &BTreeMap<String, Value>) -> Result<Value, CoreError> {
        match self.tokens.get(self.pos) {
            Some(Token::Literal(value)) => {
                let value = value.clone();
                self.pos += 1;
                Ok(value)
            }
            Some(Token::Reference(path)) => {
                let value = resolve(path, vars)?;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(CoreError::Composition(
                "expected a literal or variable reference".to_string(),
            )),
        }
    }
}

/// Resolve a dotted variable reference against the variable map
fn resolve(path: &[String], vars: &BTreeMap<String, Value>) -> Result<Value, CoreError> {
    let mut current = vars
        .get(&path[0])
        .ok_or_else(|| CoreError::Composition(format!("undefined variable '{}'", path[0])))?;

    for segment in &path[1..] {
        current = current.get(segment).ok_or_else(|| {
            CoreError::Composition(format!("undefined variable '{}'", path.join(".")))
        })?;
    }

    Ok(current.clone())
}
