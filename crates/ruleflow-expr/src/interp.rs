//! Tree-walking interpreter
//!
//! Evaluates a parsed [`Program`] against the execution context.
//! Context variables are read-only to expressions; script assignments
//! go to a script-local scope layered over them, so no script-internal
//! name ever leaks into the context. The only callable surfaces are the
//! fixed built-in method table and the `util` namespace.

use crate::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use crate::util_fns;
use ruleflow_domain::{Error, ExecutionContext, Result, Value};
use std::collections::HashMap;

/// Evaluate a program against the context
pub fn evaluate(program: &Program, source: &str, ctx: &ExecutionContext) -> Result<Value> {
    let mut interp = Interpreter {
        source,
        ctx,
        locals: HashMap::new(),
    };
    match program {
        Program::Expression(expr) => interp.eval(expr),
        Program::Script(stmts) => interp.run(stmts),
    }
}

struct Interpreter<'a> {
    source: &'a str,
    ctx: &'a ExecutionContext,
    locals: HashMap<String, Value>,
}

impl Interpreter<'_> {
    fn error(&self, message: String) -> Error {
        Error::expression(self.source, message)
    }

    fn check_deadline(&self) -> Result<()> {
        if let Some(deadline) = self.ctx.deadline {
            if deadline.exceeded() {
                return Err(Error::timeout(deadline.timeout_ms));
            }
        }
        Ok(())
    }

    // ---- statements ------------------------------------------------

    fn run(&mut self, stmts: &[Stmt]) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in stmts {
            last = self.run_stmt(stmt)?;
        }
        Ok(last)
    }

    fn run_stmt(&mut self, stmt: &Stmt) -> Result<Value> {
        match stmt {
            Stmt::Expr(expr) => self.eval(expr),
            Stmt::Assign { name, value } => {
                if name == "util" {
                    return Err(self.error("'util' is reserved and cannot be assigned".into()));
                }
                let value = self.eval(value)?;
                self.locals.insert(name.clone(), value.clone());
                Ok(value)
            }
            Stmt::For {
                var,
                iterable,
                body,
            } => {
                let items = self.iterable_items(iterable)?;
                let shadowed = self.locals.remove(var);
                for item in items {
                    self.check_deadline()?;
                    self.locals.insert(var.clone(), item);
                    for stmt in body {
                        self.run_stmt(stmt)?;
                    }
                }
                match shadowed {
                    Some(previous) => {
                        self.locals.insert(var.clone(), previous);
                    }
                    None => {
                        self.locals.remove(var);
                    }
                }
                Ok(Value::Null)
            }
        }
    }

    fn iterable_items(&mut self, iterable: &Expr) -> Result<Vec<Value>> {
        match self.eval(iterable)? {
            Value::List(items) => Ok(items),
            Value::Map(map) => Ok(map.keys().cloned().map(Value::String).collect()),
            Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(self.error(format!("cannot iterate over {}", other.type_name()))),
        }
    }

    // ---- expressions -----------------------------------------------

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => self.lookup(name),
            Expr::Member { object, field } => {
                let object = self.eval(object)?;
                self.member(&object, field)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                self.index(&object, &index)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                self.unary(*op, &operand)
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<Value>>>()?;
                if matches!(object.as_ref(), Expr::Variable(name) if name == "util") {
                    return util_fns::call(self.source, method, &args);
                }
                let recv = self.eval(object)?;
                self.call_method(&recv, method, &args)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if name == "util" {
            return Err(self.error(
                "'util' is a function namespace; call it as util.fn(...)".into(),
            ));
        }
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        // Unknown variables read as null so guards like
        // `discountedAmount != null` work before the variable is bound.
        Ok(self.ctx.variable_or_null(name))
    }

    fn member(&self, object: &Value, field: &str) -> Result<Value> {
        match object {
            Value::Null => Ok(Value::Null),
            Value::Map(map) => Ok(map.get(field).cloned().unwrap_or(Value::Null)),
            Value::String(s) if field == "length" => Ok(Value::Int(s.chars().count() as i64)),
            Value::List(items) if field == "size" || field == "length" => {
                Ok(Value::Int(items.len() as i64))
            }
            other => Err(self.error(format!(
                "cannot access field '{field}' on {}",
                other.type_name()
            ))),
        }
    }

    fn index(&self, object: &Value, index: &Value) -> Result<Value> {
        match (object, index) {
            (Value::Null, _) => Ok(Value::Null),
            (Value::List(items), index) => {
                let Some(i) = index.as_i64() else {
                    return Err(self.error(format!(
                        "list index must be an integer, found {}",
                        index.type_name()
                    )));
                };
                if i < 0 {
                    return Ok(Value::Null);
                }
                Ok(items.get(i as usize).cloned().unwrap_or(Value::Null))
            }
            (Value::Map(map), Value::String(key)) => {
                Ok(map.get(key).cloned().unwrap_or(Value::Null))
            }
            (Value::String(s), index) => {
                let Some(i) = index.as_i64() else {
                    return Err(self.error(format!(
                        "string index must be an integer, found {}",
                        index.type_name()
                    )));
                };
                if i < 0 {
                    return Ok(Value::Null);
                }
                Ok(s.chars()
                    .nth(i as usize)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null))
            }
            (other, _) => Err(self.error(format!("cannot index into {}", other.type_name()))),
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Value) -> Result<Value> {
        match op {
            UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
            UnaryOp::Neg => match operand {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(self.error(format!("cannot negate {}", other.type_name()))),
            },
        }
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        // Short-circuit forms evaluate the right operand lazily
        match op {
            BinaryOp::And => {
                if !self.eval(left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval(right)?;
                return Ok(Value::Bool(right.is_truthy()));
            }
            BinaryOp::Or => {
                if self.eval(left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval(right)?;
                return Ok(Value::Bool(right.is_truthy()));
            }
            _ => {}
        }

        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        match op {
            BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
            BinaryOp::NotEq => Ok(Value::Bool(lhs != rhs)),
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                self.relational(op, &lhs, &rhs)
            }
            BinaryOp::Add => self.add(&lhs, &rhs),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                self.arithmetic(op, &lhs, &rhs)
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn relational(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
        use std::cmp::Ordering;

        let ordering = match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            _ => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => a
                    .partial_cmp(&b)
                    .ok_or_else(|| self.error("cannot order NaN".into()))?,
                _ => {
                    return Err(self.error(format!(
                        "cannot compare {} {} {}",
                        lhs.type_name(),
                        op.symbol(),
                        rhs.type_name()
                    )));
                }
            },
        };
        let result = match op {
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::LtEq => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            BinaryOp::GtEq => ordering != Ordering::Less,
            _ => unreachable!("relational operator"),
        };
        Ok(Value::Bool(result))
    }

    fn add(&self, lhs: &Value, rhs: &Value) -> Result<Value> {
        // `+` with any string operand is concatenation of both display
        // forms
        if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
            return Ok(Value::String(format!("{lhs}{rhs}")));
        }
        self.arithmetic(BinaryOp::Add, lhs, rhs)
    }

    fn arithmetic(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
        if lhs.is_null() || rhs.is_null() {
            return Err(self.error(format!("null operand to '{}'", op.symbol())));
        }
        if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
            return self.int_arithmetic(op, *a, *b);
        }
        let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
            return Err(self.error(format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                lhs.type_name(),
                rhs.type_name()
            )));
        };
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return Err(self.error("division by zero".into()));
                }
                a / b
            }
            BinaryOp::Rem => {
                if b == 0.0 {
                    return Err(self.error("division by zero".into()));
                }
                a % b
            }
            _ => unreachable!("arithmetic operator"),
        };
        Ok(Value::Float(result))
    }

    fn int_arithmetic(&self, op: BinaryOp, a: i64, b: i64) -> Result<Value> {
        let overflow = || self.error("integer overflow".to_string());
        match op {
            BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
            BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(self.error("division by zero".into()));
                }
                // Exact division stays integral, otherwise widen
                if a % b == 0 {
                    Ok(Value::Int(a / b))
                } else {
                    Ok(Value::Float(a as f64 / b as f64))
                }
            }
            BinaryOp::Rem => {
                if b == 0 {
                    return Err(self.error("division by zero".into()));
                }
                Ok(Value::Int(a % b))
            }
            _ => unreachable!("arithmetic operator"),
        }
    }

    // ---- built-in value methods ------------------------------------

    fn call_method(&self, recv: &Value, method: &str, args: &[Value]) -> Result<Value> {
        match recv {
            Value::Null => Ok(Value::Null),
            Value::String(s) => self.string_method(s, method, args),
            Value::List(items) => self.list_method(items, method, args),
            Value::Map(map) => self.map_method(map, method, args),
            other if method == "toString" => Ok(Value::String(other.to_string())),
            other => Err(self.not_allowed(method, other)),
        }
    }

    fn not_allowed(&self, method: &str, recv: &Value) -> Error {
        self.error(format!(
            "method '{method}' is not available on {}",
            recv.type_name()
        ))
    }

    fn arity(&self, method: &str, args: &[Value], expected: usize) -> Result<()> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(self.error(format!(
                "method '{method}' expects {expected} argument(s), got {}",
                args.len()
            )))
        }
    }

    fn string_method(&self, s: &str, method: &str, args: &[Value]) -> Result<Value> {
        let str_arg = |i: usize| -> Result<&str> {
            args.get(i).and_then(Value::as_str).ok_or_else(|| {
                self.error(format!("method '{method}' expects a string argument"))
            })
        };
        match method {
            "length" | "size" => {
                self.arity(method, args, 0)?;
                Ok(Value::Int(s.chars().count() as i64))
            }
            "isEmpty" => {
                self.arity(method, args, 0)?;
                Ok(Value::Bool(s.is_empty()))
            }
            "toUpperCase" => {
                self.arity(method, args, 0)?;
                Ok(Value::String(s.to_uppercase()))
            }
            "toLowerCase" => {
                self.arity(method, args, 0)?;
                Ok(Value::String(s.to_lowercase()))
            }
            "trim" => {
                self.arity(method, args, 0)?;
                Ok(Value::String(s.trim().to_string()))
            }
            "contains" => {
                self.arity(method, args, 1)?;
                Ok(Value::Bool(s.contains(str_arg(0)?)))
            }
            "startsWith" => {
                self.arity(method, args, 1)?;
                Ok(Value::Bool(s.starts_with(str_arg(0)?)))
            }
            "endsWith" => {
                self.arity(method, args, 1)?;
                Ok(Value::Bool(s.ends_with(str_arg(0)?)))
            }
            "substring" => {
                if args.len() != 1 && args.len() != 2 {
                    return Err(self.error(format!(
                        "method 'substring' expects 1 or 2 arguments, got {}",
                        args.len()
                    )));
                }
                let chars: Vec<char> = s.chars().collect();
                let start = args[0]
                    .as_i64()
                    .ok_or_else(|| self.error("substring start must be an integer".into()))?
                    .max(0) as usize;
                let end = match args.get(1) {
                    Some(value) => value
                        .as_i64()
                        .ok_or_else(|| self.error("substring end must be an integer".into()))?
                        .max(0) as usize,
                    None => chars.len(),
                };
                let start = start.min(chars.len());
                let end = end.clamp(start, chars.len());
                Ok(Value::String(chars[start..end].iter().collect()))
            }
            "replace" => {
                self.arity(method, args, 2)?;
                Ok(Value::String(s.replace(str_arg(0)?, str_arg(1)?)))
            }
            "split" => {
                self.arity(method, args, 1)?;
                Ok(Value::List(
                    s.split(str_arg(0)?)
                        .map(|part| Value::String(part.to_string()))
                        .collect(),
                ))
            }
            "toString" => {
                self.arity(method, args, 0)?;
                Ok(Value::String(s.to_string()))
            }
            _ => Err(self.not_allowed(method, &Value::String(s.to_string()))),
        }
    }

    fn list_method(&self, items: &[Value], method: &str, args: &[Value]) -> Result<Value> {
        match method {
            "size" | "length" => {
                self.arity(method, args, 0)?;
                Ok(Value::Int(items.len() as i64))
            }
            "isEmpty" => {
                self.arity(method, args, 0)?;
                Ok(Value::Bool(items.is_empty()))
            }
            "contains" => {
                self.arity(method, args, 1)?;
                Ok(Value::Bool(items.contains(&args[0])))
            }
            "get" => {
                self.arity(method, args, 1)?;
                let i = args[0]
                    .as_i64()
                    .ok_or_else(|| self.error("list index must be an integer".into()))?;
                if i < 0 {
                    return Ok(Value::Null);
                }
                Ok(items.get(i as usize).cloned().unwrap_or(Value::Null))
            }
            "first" => {
                self.arity(method, args, 0)?;
                Ok(items.first().cloned().unwrap_or(Value::Null))
            }
            "last" => {
                self.arity(method, args, 0)?;
                Ok(items.last().cloned().unwrap_or(Value::Null))
            }
            "join" => {
                self.arity(method, args, 1)?;
                let delim = args[0]
                    .as_str()
                    .ok_or_else(|| self.error("join delimiter must be a string".into()))?;
                let joined = items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(delim);
                Ok(Value::String(joined))
            }
            "toString" => {
                self.arity(method, args, 0)?;
                Ok(Value::String(Value::List(items.to_vec()).to_string()))
            }
            _ => Err(self.not_allowed(method, &Value::List(items.to_vec()))),
        }
    }

    fn map_method(
        &self,
        map: &std::collections::BTreeMap<String, Value>,
        method: &str,
        args: &[Value],
    ) -> Result<Value> {
        match method {
            "size" => {
                self.arity(method, args, 0)?;
                Ok(Value::Int(map.len() as i64))
            }
            "isEmpty" => {
                self.arity(method, args, 0)?;
                Ok(Value::Bool(map.is_empty()))
            }
            "containsKey" => {
                self.arity(method, args, 1)?;
                let key = args[0]
                    .as_str()
                    .ok_or_else(|| self.error("map key must be a string".into()))?;
                Ok(Value::Bool(map.contains_key(key)))
            }
            "get" => {
                self.arity(method, args, 1)?;
                let key = args[0]
                    .as_str()
                    .ok_or_else(|| self.error("map key must be a string".into()))?;
                Ok(map.get(key).cloned().unwrap_or(Value::Null))
            }
            "keys" => {
                self.arity(method, args, 0)?;
                Ok(Value::List(
                    map.keys().cloned().map(Value::String).collect(),
                ))
            }
            "values" => {
                self.arity(method, args, 0)?;
                Ok(Value::List(map.values().cloned().collect()))
            }
            "toString" => {
                self.arity(method, args, 0)?;
                Ok(Value::String(Value::Map(map.clone()).to_string()))
            }
            _ => Err(self.not_allowed(method, &Value::Map(map.clone()))),
        }
    }
}
