//! Tree-walking evaluator for the script language.
//!
//! All errors are `RuntimeError`s unwinding toward the nearest
//! protected-call boundary; nothing here panics on script misbehavior.

use rustc_hash::FxHashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::parser::ast::{BinOp, Block, Expr, Stmt};
use crate::value::{Function, ScriptFn, Value};
use crate::vm::Vm;

#[derive(Default)]
struct Scope {
    locals: FxHashMap<String, Value>,
}

enum Flow {
    Normal,
    Return(Vec<Value>),
}

/// Run a script function with positionally bound arguments; missing
/// arguments bind to nil, extra arguments are dropped.
pub(crate) fn run_function(
    vm: &mut Vm,
    function: &ScriptFn,
    args: Vec<Value>,
) -> Result<Vec<Value>, RuntimeError> {
    let mut scope = Scope::default();
    let mut args = args.into_iter();
    for param in &function.params {
        scope
            .locals
            .insert(param.clone(), args.next().unwrap_or(Value::Nil));
    }

    match exec_block(vm, &mut scope, &function.body)? {
        Flow::Return(values) => Ok(values),
        Flow::Normal => Ok(Vec::new()),
    }
}

fn exec_block(vm: &mut Vm, scope: &mut Scope, block: &Block) -> Result<Flow, RuntimeError> {
    for stmt in block {
        match stmt {
            Stmt::Assign { name, value, local } => {
                let value = eval_expr(vm, scope, value)?;
                if *local || scope.locals.contains_key(name) {
                    scope.locals.insert(name.clone(), value);
                } else {
                    vm.globals().borrow_mut().raw_set(name.as_str(), value);
                }
            }
            Stmt::Expr(expr) => {
                eval_expr(vm, scope, expr)?;
            }
            Stmt::Return(exprs) => {
                let mut values = Vec::with_capacity(exprs.len());
                for (i, expr) in exprs.iter().enumerate() {
                    // the last expression spreads all its results if it is a call
                    if i + 1 == exprs.len() {
                        if let Expr::Call { callee, args } = expr {
                            values.extend(eval_call(vm, scope, callee, args)?);
                            continue;
                        }
                    }
                    values.push(eval_expr(vm, scope, expr)?);
                }
                return Ok(Flow::Return(values));
            }
        }
    }
    Ok(Flow::Normal)
}

fn eval_expr(vm: &mut Vm, scope: &mut Scope, expr: &Expr) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Nil => Ok(Value::Nil),
        Expr::True => Ok(Value::Bool(true)),
        Expr::False => Ok(Value::Bool(false)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::str(s)),
        Expr::Var(name) => Ok(lookup(vm, scope, name)),
        Expr::Function { name, params, body } => {
            Ok(Value::Function(Function::Script(Rc::new(ScriptFn {
                name: name.clone(),
                params: params.clone(),
                body: body.clone(),
            }))))
        }
        Expr::Call { callee, args } => {
            let mut results = eval_call(vm, scope, callee, args)?;
            Ok(if results.is_empty() {
                Value::Nil
            } else {
                results.swap_remove(0)
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(vm, scope, lhs)?;
            let rhs = eval_expr(vm, scope, rhs)?;
            binary(*op, lhs, rhs)
        }
        Expr::Neg(operand) => match eval_expr(vm, scope, operand)? {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(RuntimeError::new(format!(
                "attempt to perform arithmetic on a {} value",
                other.type_name()
            ))),
        },
    }
}

fn lookup(vm: &Vm, scope: &Scope, name: &str) -> Value {
    if let Some(value) = scope.locals.get(name) {
        value.clone()
    } else {
        vm.globals().borrow().raw_get(name)
    }
}

fn eval_call(
    vm: &mut Vm,
    scope: &mut Scope,
    callee: &Expr,
    args: &[Expr],
) -> Result<Vec<Value>, RuntimeError> {
    let callee_value = eval_expr(vm, scope, callee)?;
    let mut argv = Vec::with_capacity(args.len());
    for arg in args {
        argv.push(eval_expr(vm, scope, arg)?);
    }

    match callee_value {
        Value::Function(_) => vm.call_value(callee_value, argv),
        other => {
            let suffix = match callee {
                Expr::Var(name) => format!(" (global '{}')", name),
                _ => String::new(),
            };
            Err(RuntimeError::new(format!(
                "attempt to call a {} value{}",
                other.type_name(),
                suffix
            )))
        }
    }
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            let (a, b) = numeric_operands(&lhs, &rhs)?;
            let n = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                // floored modulo, matching the VM's number semantics
                BinOp::Mod => a - (a / b).floor() * b,
                _ => unreachable!(),
            };
            Ok(Value::Number(n))
        }
        BinOp::Concat => {
            let a = concat_operand(&lhs)?;
            let b = concat_operand(&rhs)?;
            Ok(Value::str(format!("{}{}", a, b)))
        }
        BinOp::Eq => Ok(Value::Bool(Value::raw_eq(&lhs, &rhs))),
        BinOp::Ne => Ok(Value::Bool(!Value::raw_eq(&lhs, &rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => ordered(op, &lhs, &rhs),
    }
}

fn numeric_operands(lhs: &Value, rhs: &Value) -> Result<(f64, f64), RuntimeError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => {
            let bad = if matches!(lhs, Value::Number(_)) {
                rhs
            } else {
                lhs
            };
            Err(RuntimeError::new(format!(
                "attempt to perform arithmetic on a {} value",
                bad.type_name()
            )))
        }
    }
}

fn concat_operand(value: &Value) -> Result<String, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Number(n) => Ok(Value::number_to_string(*n)),
        other => Err(RuntimeError::new(format!(
            "attempt to concatenate a {} value",
            other.type_name()
        ))),
    }
}

fn ordered(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let result = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => compare(op, a.partial_cmp(b)),
        (Value::Str(a), Value::Str(b)) => compare(op, Some(a.cmp(b))),
        _ => None,
    };
    result.map(Value::Bool).ok_or_else(|| {
        RuntimeError::new(format!(
            "attempt to compare {} with {}",
            lhs.type_name(),
            rhs.type_name()
        ))
    })
}

fn compare(op: BinOp, ordering: Option<std::cmp::Ordering>) -> Option<bool> {
    let ordering = ordering?;
    Some(match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => return None,
    })
}
