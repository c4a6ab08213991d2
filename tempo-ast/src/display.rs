#![forbid(unsafe_code)]

use std::fmt;

use crate::command::Command;
use crate::expr::{BinOp, Expr, Literal, UnaryOp};
use crate::program::{Function, Program};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Or,
    And,
    Not,
    Cmp,
    Sum,
    Product,
    Neg,
    Atom,
}

fn bin_prec(op: BinOp) -> Prec {
    match op {
        BinOp::Or => Prec::Or,
        BinOp::And => Prec::And,
        BinOp::Le | BinOp::Lt | BinOp::Ge | BinOp::Gt | BinOp::Eq | BinOp::Ne => Prec::Cmp,
        BinOp::Add | BinOp::Sub => Prec::Sum,
        BinOp::Mul | BinOp::Mod => Prec::Product,
    }
}

fn bin_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Mod => "%",
        BinOp::Le => "<=",
        BinOp::Lt => "<",
        BinOp::Ge => ">=",
        BinOp::Gt => ">",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

fn expr_prec(expr: &Expr) -> Prec {
    match expr {
        Expr::Var(_) => Prec::Atom,
        Expr::Const(Literal::Int(n)) if *n < 0 => Prec::Neg,
        Expr::Const(_) => Prec::Atom,
        Expr::Unary { op: UnaryOp::Neg, .. } => Prec::Neg,
        Expr::Unary { op: UnaryOp::Not, .. } => Prec::Not,
        Expr::Binary { op, .. } => bin_prec(*op),
        // Always printed parenthesised.
        Expr::Cond { .. } => Prec::Atom,
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        f.write_str("(")?;
        write!(f, "{expr}")?;
        f.write_str(")")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => f.write_str(name),
            Expr::Const(lit) => write!(f, "{lit}"),
            Expr::Unary { op, operand } => {
                let (symbol, prec) = match op {
                    UnaryOp::Neg => ("-", Prec::Neg),
                    UnaryOp::Not => ("not ", Prec::Not),
                };
                f.write_str(symbol)?;
                write_expr(f, operand, expr_prec(operand) < prec)
            }
            Expr::Binary { op, left, right } => {
                let prec = bin_prec(*op);
                let lp = expr_prec(left);
                // Comparisons do not chain.
                write_expr(f, left, lp < prec || (lp == prec && prec == Prec::Cmp))?;
                write!(f, " {} ", bin_symbol(*op))?;
                write_expr(f, right, expr_prec(right) <= prec)
            }
            Expr::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                write!(f, "({then_expr} if {cond} else {else_expr})")
            }
        }
    }
}

fn write_command(f: &mut fmt::Formatter<'_>, cmd: &Command, depth: usize) -> fmt::Result {
    let pad = "    ".repeat(depth);
    match cmd {
        Command::Pass => writeln!(f, "{pad}pass"),
        Command::Call { callee, args } => {
            write!(f, "{pad}{callee}(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            writeln!(f, ")")
        }
        Command::Block { first, second } => {
            write_command(f, first, depth)?;
            write_command(f, second, depth)
        }
        Command::If {
            cond,
            then_branch,
            else_branch,
        } => {
            writeln!(f, "{pad}if {cond}:")?;
            write_command(f, then_branch, depth + 1)?;
            if **else_branch != Command::Pass {
                writeln!(f, "{pad}else:")?;
                write_command(f, else_branch, depth + 1)?;
            }
            Ok(())
        }
    }
}

/// Surface-syntax rendering, one statement per line.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_command(f, self, f.width().unwrap_or(0))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "def {}({}) -> \"{}\":",
            self.name(),
            self.params().join(", "),
            self.annotation()
        )?;
        write_command(f, self.body(), 1)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.functions().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{func}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::build::{add, int, ite, leq, mul, sub, var};
    use crate::expr::{BinOp, Expr, UnaryOp};
    use crate::{Command, Function};

    #[test]
    fn binary_expressions_use_minimal_parentheses() {
        let e = mul(add(var("a"), var("b")), sub(var("c"), sub(var("d"), int(1))));
        assert_eq!(e.to_string(), "(a + b) * (c - (d - 1))");

        let e = add(mul(var("c0__1"), mul(var("n"), var("m"))), var("c1__2"));
        assert_eq!(e.to_string(), "c0__1 * (n * m) + c1__2");
    }

    #[test]
    fn conditionals_and_unary_operators_print_readably() {
        let e = ite(leq(var("n"), int(0)), int(0), Expr::unary(UnaryOp::Neg, var("n")));
        assert_eq!(e.to_string(), "(0 if n <= 0 else -n)");

        let e = Expr::unary(
            UnaryOp::Not,
            Expr::binary(BinOp::And, var("a"), var("b")),
        );
        assert_eq!(e.to_string(), "not (a and b)");
    }

    #[test]
    fn functions_print_in_surface_syntax() {
        let body = Command::if_(
            leq(var("n"), int(0)),
            Command::Pass,
            Command::call("f", vec![sub(var("n"), int(1))]),
        );
        let f = Function::new("f", vec!["n".to_string()], body, var("n")).unwrap();
        assert_eq!(
            f.to_string(),
            "def f(n) -> \"n\":\n    if n <= 0:\n        pass\n    else:\n        f(n - 1)\n"
        );
    }
}
