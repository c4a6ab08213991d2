use proptest::prelude::*;
use tempo_ast::build::{boolean, int, var};
use tempo_ast::{BinOp, Expr, UnaryOp};
use tempo_parse::{format_expr, parse_expr};

// Conditionals have no surface syntax and negative constants reparse as
// negations, so neither is generated here.
fn surface_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (0i64..100).prop_map(int),
        any::<bool>().prop_map(boolean),
        prop::sample::select(vec!["a", "b", "n", "m"]).prop_map(var),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (prop::sample::select(BinOp::ALL.to_vec()), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Expr::binary(op, l, r)),
            (prop::sample::select(UnaryOp::ALL.to_vec()), inner)
                .prop_map(|(op, e)| Expr::unary(op, e)),
        ]
    })
}

proptest! {
    #[test]
    fn formatted_expressions_reparse_to_the_same_tree(e in surface_expr()) {
        let text = format_expr(&e);
        let back = parse_expr(&text).map_err(|err| TestCaseError::fail(format!("{text}: {err}")))?;
        prop_assert_eq!(back, e);
    }
}
