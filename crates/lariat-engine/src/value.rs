//! VM value model.
//!
//! Every value carries its own discriminant, so type checks never read
//! fields through an untyped view. One slot of the evaluation stack holds
//! exactly one `Value`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::parser::ast::Block;
use crate::table::Table;
use crate::vm::Vm;

/// Runtime type tag of one stack slot.
///
/// `None` is the pseudo-tag reported for indices outside the current stack
/// extent; it is never the tag of a live value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    None,
    Nil,
    Boolean,
    Number,
    String,
    Table,
    Function,
    Opaque,
}

impl TypeTag {
    /// Stable diagnostic name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::None => "no value",
            TypeTag::Nil => "nil",
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Table => "table",
            TypeTag::Function => "function",
            TypeTag::Opaque => "userdata",
        }
    }
}

/// Trampoline entry point for a bridged native function.
///
/// Invoked with a stack frame holding exactly the call's arguments; returns
/// the number of results it pushed. All per-call state lives in the closure's
/// captures; the VM keeps the closure alive for as long as the corresponding
/// function value is reachable.
pub type NativeFn = Rc<dyn Fn(&mut Vm) -> Result<usize, RuntimeError>>;

/// A function compiled from script source.
#[derive(Debug)]
pub struct ScriptFn {
    /// Declared name, or `None` for anonymous function literals.
    pub name: Option<String>,
    /// Parameter names, bound positionally; missing arguments become nil.
    pub params: Vec<String>,
    pub body: Block,
}

/// A callable VM value.
#[derive(Clone)]
pub enum Function {
    Native(NativeFn),
    Script(Rc<ScriptFn>),
}

impl Function {
    /// Identity comparison; functions have no structural equality.
    pub fn ptr_eq(a: &Function, b: &Function) -> bool {
        match (a, b) {
            (Function::Native(x), Function::Native(y)) => Rc::ptr_eq(x, y),
            (Function::Script(x), Function::Script(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native(ptr) => write!(f, "native function ({:p})", Rc::as_ptr(ptr)),
            Function::Script(sf) => match &sf.name {
                Some(name) => write!(f, "function '{}'", name),
                None => write!(f, "anonymous function"),
            },
        }
    }
}

/// A non-owned native pointer crossing the boundary, tagged with the
/// fingerprint of its compile-time type.
///
/// The VM keeps this block alive for as long as the value is reachable; the
/// pointee's lifetime remains the native caller's responsibility. No
/// ownership transfer occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpaqueRef {
    /// Process-local identity of the pointee's native type.
    pub fingerprint: u32,
    pub ptr: *mut (),
}

/// One VM value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Table(Rc<RefCell<Table>>),
    Function(Function),
    Opaque(OpaqueRef),
}

impl Value {
    /// Build a string value, copying the bytes into VM-owned storage.
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub const fn tag(&self) -> TypeTag {
        match self {
            Value::Nil => TypeTag::Nil,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::Str(_) => TypeTag::String,
            Value::Table(_) => TypeTag::Table,
            Value::Function(_) => TypeTag::Function,
            Value::Opaque(_) => TypeTag::Opaque,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    /// VM truthiness: nil and false are falsy, everything else is truthy.
    pub const fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Equality as the script language's `==` defines it: structural for
    /// scalars and strings, identity for tables, functions and opaque blocks.
    pub fn raw_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Table(x), Value::Table(y)) => Rc::ptr_eq(x, y),
            (Value::Function(x), Value::Function(y)) => Function::ptr_eq(x, y),
            (Value::Opaque(x), Value::Opaque(y)) => x == y,
            _ => false,
        }
    }

    /// Render a number the way the VM prints it: integral values without a
    /// decimal point.
    pub fn number_to_string(n: f64) -> String {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", Value::number_to_string(*n)),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Table(t) => write!(f, "table ({:p})", Rc::as_ptr(t)),
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Opaque(r) => write!(f, "userdata ({:p}, fingerprint {})", r.ptr, r.fingerprint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.truthy());
        assert!(!Value::Bool(false).truthy());
        assert!(Value::Bool(true).truthy());
        assert!(Value::Number(0.0).truthy());
        assert!(Value::str("").truthy());
    }

    #[test]
    fn raw_equality() {
        assert!(Value::raw_eq(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(!Value::raw_eq(&Value::Number(1.0), &Value::str("1")));
        assert!(Value::raw_eq(&Value::str("a"), &Value::str("a")));

        let t = Rc::new(RefCell::new(Table::new()));
        let a = Value::Table(t.clone());
        let b = Value::Table(t);
        assert!(Value::raw_eq(&a, &b));
        assert!(!Value::raw_eq(
            &a,
            &Value::Table(Rc::new(RefCell::new(Table::new())))
        ));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(Value::number_to_string(200.0), "200");
        assert_eq!(Value::number_to_string(-3.0), "-3");
        assert_eq!(Value::number_to_string(1.5), "1.5");
    }
}
