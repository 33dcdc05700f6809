//! Evaluation of parsed manifest statements into values.
//!
//! Statements are evaluated in order, so `Var(...)` can only see `vars`
//! assigned earlier in the file.

use std::collections::{BTreeMap, HashMap};

use super::parser::{Expr, ExprKind, Statement};
use super::{Dict, Value};
use crate::error::{Error, Result};

/// Evaluate `statements` into a map of top-level names to values.
///
/// `deps_os` is always present, defaulting to an empty dict.
pub fn evaluate(
    statements: &[Statement],
    custom_vars: &HashMap<String, Value>,
) -> Result<BTreeMap<String, Value>> {
    let mut scope = BTreeMap::new();
    scope.insert("deps_os".to_string(), Value::Dict(Dict::new()));
    for statement in statements {
        let value = Evaluator {
            custom_vars,
            scope: &scope,
        }
        .eval(&statement.value)?;
        scope.insert(statement.name.clone(), value);
    }
    Ok(scope)
}

struct Evaluator<'a> {
    custom_vars: &'a HashMap<String, Value>,
    scope: &'a BTreeMap<String, Value>,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::None => Ok(Value::None),
            ExprKind::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            ExprKind::Dict(entries) => {
                let mut dict = Dict::new();
                for (key, value) in entries {
                    let key = match self.eval(key)? {
                        Value::Str(s) => s,
                        other => {
                            return Err(Error::UnsupportedExpression {
                                line: expr.line,
                                message: format!("dict keys must be strings, found {}", other),
                            })
                        }
                    };
                    dict.insert(key, self.eval(value)?);
                }
                Ok(Value::Dict(dict))
            }
            ExprKind::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    match self.eval(part)? {
                        Value::Str(s) => out.push_str(&s),
                        other => {
                            return Err(Error::UnsupportedExpression {
                                line: part.line,
                                message: format!("`+` only joins strings, found {}", other),
                            })
                        }
                    }
                }
                Ok(Value::Str(out))
            }
            ExprKind::Var(name) => self.lookup(name),
            ExprKind::From { module, path } => Ok(Value::From {
                module: module.clone(),
                path: path.clone(),
            }),
        }
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.custom_vars.get(name) {
            return Ok(value.clone());
        }
        self.scope
            .get("vars")
            .and_then(Value::as_dict)
            .and_then(|vars| vars.get(name))
            .cloned()
            .ok_or_else(|| Error::Lookup {
                name: name.to_string(),
            })
    }
}
