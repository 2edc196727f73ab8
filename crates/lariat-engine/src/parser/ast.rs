//! Abstract syntax of the script language.

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `name = expr`, or `local name = expr` when `local` is set.
    Assign {
        name: String,
        value: Expr,
        local: bool,
    },
    /// An expression evaluated for its side effects; only calls are legal here.
    Expr(Expr),
    /// `return e1, e2, ...` — must be the last statement of its block.
    Return(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Nil,
    True,
    False,
    Number(f64),
    Str(String),
    /// A variable reference: the enclosing scope, then the globals table.
    Var(String),
    Function {
        name: Option<String>,
        params: Vec<String>,
        body: Block,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Neg(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}
