mod common;

use common::{lower_body, lower_body_clean, Ast, TestFacts};
use vbsharp::ast::cs;
use vbsharp::ast::vb::StmtKind;
use vbsharp::facts::TypeRef;

fn int_array(rank: u32) -> TypeRef {
    TypeRef::array(TypeRef::named("Integer"), rank)
}

#[test]
fn plain_resize_is_a_fresh_allocation() {
    // ReDim numArray(3)  →  numArray = new int[4];
    let ast = Ast::new();
    let (redim, target_id) = ast.redim("numArray", false, vec![ast.int(3)]);
    let facts = TestFacts::new().with_type(target_id, int_array(1));

    let stmts = lower_body_clean(&ast, vec![redim], &facts);
    assert_eq!(
        stmts,
        vec![cs::Stmt::Expr(cs::Expr::assign(
            cs::Expr::ident("numArray"),
            cs::Expr::NewArray { elem: cs::Type::named("int"), extents: vec![cs::Expr::int(4)] },
        ))]
    );
}

#[test]
fn erase_assigns_null() {
    let ast = Ast::new();
    let erase = ast.stmt(StmtKind::Erase { targets: vec![ast.ident("numArray")] });
    let stmts = lower_body_clean(&ast, vec![erase], &TestFacts::new());
    assert_eq!(
        stmts,
        vec![cs::Stmt::Expr(cs::Expr::assign(cs::Expr::ident("numArray"), cs::Expr::Null))]
    );
}

#[test]
fn preserving_resize_captures_allocates_and_guards_the_copy() {
    // ReDim Preserve numArray(5) on a 1-D array: capture old reference,
    // allocate length 6, copy min(6, old.Length) behind a null guard.
    let ast = Ast::new();
    let (redim, target_id) = ast.redim("numArray", true, vec![ast.int(5)]);
    let facts = TestFacts::new().with_type(target_id, int_array(1));

    let stmts = lower_body_clean(&ast, vec![redim], &facts);
    assert_eq!(stmts.len(), 3);

    assert_eq!(
        stmts[0],
        cs::Stmt::LocalDecl {
            ty: None,
            is_const: false,
            declarators: vec![cs::Declarator {
                name: "oldNumArray".into(),
                init: Some(cs::Expr::ident("numArray")),
            }],
        }
    );
    assert_eq!(
        stmts[1],
        cs::Stmt::Expr(cs::Expr::assign(
            cs::Expr::ident("numArray"),
            cs::Expr::NewArray { elem: cs::Type::named("int"), extents: vec![cs::Expr::int(6)] },
        ))
    );
    match &stmts[2] {
        cs::Stmt::If { condition, then_body, else_body } => {
            assert_eq!(*condition, cs::Expr::not_null(cs::Expr::ident("oldNumArray")));
            assert!(else_body.is_none());
            assert_eq!(
                then_body[0],
                cs::Stmt::Expr(cs::Expr::invoke_static(
                    "Array",
                    "Copy",
                    vec![
                        cs::Expr::ident("oldNumArray"),
                        cs::Expr::ident("numArray"),
                        cs::Expr::invoke_static(
                            "Math",
                            "Min",
                            vec![
                                cs::Expr::int(6),
                                cs::Expr::member(cs::Expr::ident("oldNumArray"), "Length"),
                            ],
                        ),
                    ],
                ))
            );
        }
        other => panic!("expected guarded copy, got {other:?}"),
    }
}

#[test]
fn preserving_resize_capture_names_are_unique_per_variable() {
    // Two preserves of different variables in one procedure.
    let ast = Ast::new();
    let (first, first_id) = ast.redim("numArray", true, vec![ast.int(5)]);
    let (second, second_id) = ast.redim("numArray2", true, vec![ast.int(5)]);
    let facts = TestFacts::new()
        .with_type(first_id, int_array(1))
        .with_type(second_id, int_array(1));

    let stmts = lower_body_clean(&ast, vec![first, second], &facts);
    assert_eq!(stmts.len(), 6);
    assert!(matches!(
        &stmts[0],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldNumArray"
    ));
    assert!(matches!(
        &stmts[3],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldNumArray2"
    ));
}

#[test]
fn repeated_preserve_of_one_variable_disambiguates_the_capture() {
    let ast = Ast::new();
    let (first, first_id) = ast.redim("a", true, vec![ast.int(5)]);
    let (second, second_id) = ast.redim("a", true, vec![ast.int(7)]);
    let facts = TestFacts::new()
        .with_type(first_id, int_array(1))
        .with_type(second_id, int_array(1));

    let stmts = lower_body_clean(&ast, vec![first, second], &facts);
    assert!(matches!(
        &stmts[0],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldA"
    ));
    assert!(matches!(
        &stmts[3],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldA1"
    ));
}

#[test]
fn rank_two_preserve_copies_row_by_row() {
    // ReDim Preserve y(6, 8): a flat bulk copy is invalid once the trailing
    // extent changes, so rows are copied with stride GetLength(1), both the
    // row count and the stride clamped to the smaller side.
    let ast = Ast::new();
    let (redim, target_id) = ast.redim("y", true, vec![ast.int(6), ast.int(8)]);
    let facts = TestFacts::new().with_type(target_id, int_array(2));

    let stmts = lower_body_clean(&ast, vec![redim], &facts);
    assert_eq!(stmts.len(), 3);
    assert!(matches!(
        &stmts[0],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldY"
    ));
    assert_eq!(
        stmts[1],
        cs::Stmt::Expr(cs::Expr::assign(
            cs::Expr::ident("y"),
            cs::Expr::NewArray {
                elem: cs::Type::named("int"),
                extents: vec![cs::Expr::int(7), cs::Expr::int(9)],
            },
        ))
    );

    let old = cs::Expr::ident("oldY");
    let target = cs::Expr::ident("y");
    let stride = |arr: &cs::Expr| {
        cs::Expr::invoke(cs::Expr::member(arr.clone(), "GetLength"), vec![cs::Expr::int(1)])
    };
    let rows = |arr: &cs::Expr| {
        cs::Expr::binary(cs::BinOp::Div, cs::Expr::member(arr.clone(), "Length"), stride(arr))
    };
    let expected_loop = cs::Stmt::For {
        init: cs::ForInit::Decl { ty: None, var: "i".into(), value: cs::Expr::int(0) },
        condition: cs::Expr::binary(
            cs::BinOp::LtEq,
            cs::Expr::ident("i"),
            cs::Expr::binary(
                cs::BinOp::Sub,
                cs::Expr::invoke_static("Math", "Min", vec![rows(&old), rows(&target)]),
                cs::Expr::int(1),
            ),
        ),
        update: cs::Expr::Increment(Box::new(cs::Expr::ident("i"))),
        body: vec![cs::Stmt::Expr(cs::Expr::invoke_static(
            "Array",
            "Copy",
            vec![
                old.clone(),
                cs::Expr::binary(cs::BinOp::Mul, cs::Expr::ident("i"), stride(&old)),
                target.clone(),
                cs::Expr::binary(cs::BinOp::Mul, cs::Expr::ident("i"), stride(&target)),
                cs::Expr::invoke_static("Math", "Min", vec![stride(&old), stride(&target)]),
            ],
        ))],
    };
    assert_eq!(
        stmts[2],
        cs::Stmt::If {
            condition: cs::Expr::not_null(old),
            then_body: vec![expected_loop],
            else_body: None,
        }
    );
}

#[test]
fn resize_without_type_facts_is_a_diagnostic() {
    let ast = Ast::new();
    let (redim, _) = ast.redim("mystery", true, vec![ast.int(5)]);
    let lowered = lower_body(&ast, vec![redim], &TestFacts::new());
    assert_eq!(lowered.diagnostics.len(), 1);
    assert!(lowered.diagnostics[0].message.contains("resolve_type"));
    assert!(matches!(lowered.stmts[0], cs::Stmt::Unsupported { .. }));
}

#[test]
fn resize_of_non_array_is_unsupported() {
    let ast = Ast::new();
    let (redim, target_id) = ast.redim("notArray", false, vec![ast.int(5)]);
    let facts = TestFacts::new().with_type(target_id, TypeRef::named("Integer"));
    let lowered = lower_body(&ast, vec![redim], &facts);
    assert_eq!(lowered.diagnostics.len(), 1);
    assert!(lowered.diagnostics[0].message.contains("not an array"));
}

#[test]
fn multiple_targets_expand_in_order() {
    // ReDim Preserve numArray(5), numArray2(5)
    let ast = Ast::new();
    let first_id = ast.fresh_id();
    let second_id = ast.fresh_id();
    let redim = ast.stmt(StmtKind::Redim {
        preserve: true,
        targets: vec![
            vbsharp::ast::vb::RedimTarget {
                id: first_id,
                span: vbsharp::Span::dummy(),
                target: ast.ident("numArray"),
                bounds: vec![ast.int(5)],
            },
            vbsharp::ast::vb::RedimTarget {
                id: second_id,
                span: vbsharp::Span::dummy(),
                target: ast.ident("numArray2"),
                bounds: vec![ast.int(5)],
            },
        ],
    });
    let facts = TestFacts::new()
        .with_type(first_id, int_array(1))
        .with_type(second_id, int_array(1));

    let stmts = lower_body_clean(&ast, vec![redim], &facts);
    // capture / allocate / guarded copy, twice.
    assert_eq!(stmts.len(), 6);
    assert!(matches!(
        &stmts[0],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldNumArray"
    ));
    assert!(matches!(
        &stmts[3],
        cs::Stmt::LocalDecl { declarators, .. } if declarators[0].name == "oldNumArray2"
    ));
}
