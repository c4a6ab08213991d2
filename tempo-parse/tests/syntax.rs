use tempo_ast::build::{int, leq, mul, sub, var};
use tempo_ast::{Command, Expr, UnaryOp};
use tempo_parse::{format_program, parse_expr, parse_source};

const LOOPS: &str = r#"
# Nested counting loops.
def loop1(n) -> "n":
    if n <= 0:
        pass
    else:
        loop1(n - 1)

def loop2(n, m) -> "n * m":
    if n <= 0:
        pass
    else:
        loop1(m)
        loop2(n - 1, m)
"#;

#[test]
fn loops_program_parses() {
    let program = parse_source(LOOPS).expect("loops should parse");
    assert_eq!(program.functions().len(), 2);

    let loop1 = program.lookup("loop1").unwrap();
    assert_eq!(loop1.params(), ["n".to_string()]);
    assert_eq!(loop1.annotation(), &var("n"));
    assert_eq!(
        loop1.body(),
        &Command::if_(
            leq(var("n"), int(0)),
            Command::Pass,
            Command::call("loop1", vec![sub(var("n"), int(1))]),
        )
    );

    let loop2 = program.lookup("loop2").unwrap();
    assert_eq!(loop2.annotation(), &mul(var("n"), var("m")));
    assert_eq!(
        loop2.body(),
        &Command::if_(
            leq(var("n"), int(0)),
            Command::Pass,
            Command::block(
                Command::call("loop1", vec![var("m")]),
                Command::call("loop2", vec![sub(var("n"), int(1)), var("m")]),
            ),
        )
    );
}

#[test]
fn missing_annotation_claims_constant_cost() {
    let program = parse_source("def f():\n    pass\n").unwrap();
    assert_eq!(program.functions()[0].annotation(), &int(1));
}

#[test]
fn unparsable_annotation_claims_constant_cost() {
    let program = parse_source("def f(n) -> \"n **\":\n    pass\n").unwrap();
    assert_eq!(program.functions()[0].annotation(), &int(1));
}

#[test]
fn annotation_may_mention_free_names() {
    let program = parse_source("def f(n) -> \"c0__1 * n + k\":\n    pass\n").unwrap();
    let vars = program.functions()[0].annotation().variables();
    assert!(vars.contains("c0__1"));
    assert!(vars.contains("k"));
}

#[test]
fn elif_nests_into_else_branch() {
    let src = "def f(n):\n    if n < 0:\n        pass\n    elif n == 0:\n        f(n)\n    else:\n        f(n - 1)\n";
    let program = parse_source(src).unwrap();
    match program.functions()[0].body() {
        Command::If { else_branch, .. } => {
            assert!(matches!(**else_branch, Command::If { .. }));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn if_without_else_gets_pass() {
    let program = parse_source("def f(n):\n    if n > 0:\n        f(n - 1)\n").unwrap();
    match program.functions()[0].body() {
        Command::If { else_branch, .. } => assert_eq!(**else_branch, Command::Pass),
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn body_variable_outside_params_is_rejected() {
    let err = parse_source("def f(n):\n    f(m)\n").expect_err("expected scope error");
    let msg = err.to_string();
    assert!(msg.contains("`m`"), "unexpected error message: {msg}");
    assert!(msg.contains("[n]"), "unexpected error message: {msg}");
}

#[test]
fn chained_comparisons_are_rejected() {
    let err = parse_expr("a < b < c").expect_err("expected parse error");
    let msg = err.to_string();
    assert!(
        msg.contains("chained comparisons"),
        "unexpected error message: {msg}"
    );
}

#[test]
fn expression_statements_are_rejected() {
    assert!(parse_source("def f(n):\n    n\n").is_err());
    assert!(parse_source("def f(n):\n    n + 1\n").is_err());
}

#[test]
fn calls_inside_expressions_are_rejected() {
    assert!(parse_source("def f(n):\n    f(f(n))\n").is_err());
}

#[test]
fn duplicate_parameters_are_rejected() {
    let err = parse_source("def f(n, n):\n    pass\n").expect_err("expected parse error");
    assert!(err.to_string().contains("duplicate parameter"));
}

#[test]
fn integer_literal_overflow_is_rejected() {
    assert!(parse_expr("9223372036854775807").is_ok());
    assert!(parse_expr("9223372036854775808").is_err());
}

#[test]
fn operator_precedence() {
    let e = parse_expr("not a and b or n + 2 * m % 3 <= -k").unwrap();
    assert_eq!(e.to_string(), "not a and b or n + 2 * m % 3 <= -k");

    match parse_expr("-n").unwrap() {
        Expr::Unary { op, operand } => {
            assert_eq!(op, UnaryOp::Neg);
            assert_eq!(*operand, var("n"));
        }
        other => panic!("expected negation, got {other:?}"),
    }
}

#[test]
fn duplicate_function_names_parse() {
    // Resolution happens when costs are derived.
    let program = parse_source("def f():\n    pass\n\ndef f():\n    pass\n").unwrap();
    assert_eq!(program.functions().len(), 2);
}

#[test]
fn formatting_round_trips() {
    let program = parse_source(LOOPS).unwrap();
    let text = format_program(&program);
    let reparsed = parse_source(&text).expect("formatted output should parse");
    assert_eq!(reparsed, program);
    assert_eq!(format_program(&reparsed), text);
}

#[test]
fn top_level_statements_are_rejected() {
    assert!(parse_source("f(1)\n").is_err());
}
