use super::*;
use crate::lexer;

fn parse_source(src: &str) -> Result<Program> {
    let tokens = lexer::lex(src).expect("should lex");
    parse(&tokens)
}

fn parse_expression(src: &str) -> Result<Exp> {
    let tokens = lexer::lex(src).expect("should lex");
    let mut cursor = Cursor::new(&tokens);
    parse_exp(&mut cursor, 0)
}

#[test]
fn test_minimal_main() {
    let program = parse_source("int main() { return 0; }").expect("should parse");
    assert_eq!(1, program.declarations.len());
    let Declaration::Fun(func) = &program.declarations[0] else {
        panic!("expected function definition");
    };
    assert_eq!("main", func.name);
    assert_eq!(Type::scalar(BaseType::Int), func.return_type);
    assert!(func.params.is_empty());
    let expected_body = vec![Statement::Return(Some(Exp::IntLiteral(0)))];
    assert_eq!(expected_body, func.body.statements);
}

#[test]
fn test_expression_precedence() {
    let parsed = parse_expression("1 * 2 - 3 * (4 + 5)");
    let expected = Exp::binary(
        BinaryOp::Subtract,
        Exp::binary(BinaryOp::Multiply, Exp::IntLiteral(1), Exp::IntLiteral(2)),
        Exp::binary(
            BinaryOp::Multiply,
            Exp::IntLiteral(3),
            Exp::binary(BinaryOp::Add, Exp::IntLiteral(4), Exp::IntLiteral(5)),
        ),
    );
    assert_eq!(Ok(expected), parsed);
}

#[test]
fn test_logical_precedence() {
    let parsed = parse_expression("a == 1 && b < 2 || c");
    let expected = Exp::binary(
        BinaryOp::LogicalOr,
        Exp::binary(
            BinaryOp::LogicalAnd,
            Exp::binary(BinaryOp::IsEqual, Exp::var("a".into()), Exp::IntLiteral(1)),
            Exp::binary(BinaryOp::LessThan, Exp::var("b".into()), Exp::IntLiteral(2)),
        ),
        Exp::var("c".into()),
    );
    assert_eq!(Ok(expected), parsed);
}

#[test]
fn test_assignment_right_associative() {
    let parsed = parse_expression("a = b = 1");
    let expected = Exp::assignment(
        Exp::var("a".into()),
        Exp::assignment(Exp::var("b".into()), Exp::IntLiteral(1)),
    );
    assert_eq!(Ok(expected), parsed);
}

#[test]
fn test_unary_chain() {
    let parsed = parse_expression("-!x");
    let expected = Exp::unary(UnaryOp::Negate, Exp::unary(UnaryOp::LogicalNot, Exp::var("x".into())));
    assert_eq!(Ok(expected), parsed);
}

#[test]
fn test_call_and_array_access() {
    let parsed = parse_expression("f(a, g(), b[i + 1])");
    let expected = Exp::call(
        "f".into(),
        vec![
            Exp::var("a".into()),
            Exp::call("g".into(), vec![]),
            Exp::array_access(
                "b".into(),
                Exp::binary(BinaryOp::Add, Exp::var("i".into()), Exp::IntLiteral(1)),
            ),
        ],
    );
    assert_eq!(Ok(expected), parsed);
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    let program = parse_source("int main() { if (a) if (b) return 1; else return 2; }")
        .expect("should parse");
    let Declaration::Fun(func) = &program.declarations[0] else {
        panic!("expected function definition");
    };
    let Statement::If(outer) = &func.body.statements[0] else {
        panic!("expected if");
    };
    assert!(outer.els.is_none());
    let Statement::If(inner) = outer.then.as_ref() else {
        panic!("expected nested if");
    };
    assert!(inner.els.is_some());
}

#[test]
fn test_var_decl_forms() {
    let program = parse_source(
        "int main() { int x; char c = 'a'; int* p; int arr[10]; const int k = 3; }",
    )
    .expect("should parse");
    let Declaration::Fun(func) = &program.declarations[0] else {
        panic!("expected function definition");
    };
    let decls: Vec<&VarDecl> = func
        .body
        .statements
        .iter()
        .map(|s| match s {
            Statement::Decl(d) => d,
            other => panic!("expected declaration, got {other:?}"),
        })
        .collect();

    assert_eq!("x", decls[0].name);
    assert_eq!(Type::scalar(BaseType::Int), decls[0].var_type);

    assert_eq!(Some(Exp::CharLiteral(b'a')), decls[1].init);

    assert_eq!(Type::new(BaseType::Int, 1), decls[2].var_type);

    assert!(decls[3].is_array);
    assert_eq!(10, decls[3].array_size);

    assert!(decls[4].is_const);
    assert_eq!(Some(Exp::IntLiteral(3)), decls[4].init);
}

#[test]
fn test_array_size_must_be_literal() {
    let result = parse_source("int main() { int arr[n]; }");
    assert!(result.is_err());
}

#[test]
fn test_const_requires_initializer() {
    let result = parse_source("const int k;");
    assert!(result.is_err());
}

#[test]
fn test_function_with_params() {
    let program = parse_source("int add(int a, int b) { return a + b; }").expect("should parse");
    let Declaration::Fun(func) = &program.declarations[0] else {
        panic!("expected function definition");
    };
    let expected_params = vec![
        (Type::scalar(BaseType::Int), String::from("a")),
        (Type::scalar(BaseType::Int), String::from("b")),
    ];
    assert_eq!(expected_params, func.params);
}

#[test]
fn test_top_level_declaration_count() {
    let program = parse_source(
        "int g;\nconst int k = 1;\nint helper(int x) { return x; }\nint main() { return helper(g); }",
    )
    .expect("should parse");
    assert_eq!(4, program.declarations.len());
}

#[test]
fn test_pointer_lookahead_still_finds_function() {
    let program = parse_source("int* alias(int* p) { return p; }").expect("should parse");
    let Declaration::Fun(func) = &program.declarations[0] else {
        panic!("expected function definition");
    };
    assert_eq!(Type::new(BaseType::Int, 1), func.return_type);
}

#[test]
fn test_while_with_break_and_continue() {
    let program = parse_source("int main() { while (1) { break; continue; } }")
        .expect("should parse");
    let Declaration::Fun(func) = &program.declarations[0] else {
        panic!("expected function definition");
    };
    let Statement::While(w) = &func.body.statements[0] else {
        panic!("expected while");
    };
    let Statement::Compound(block) = w.body.as_ref() else {
        panic!("expected block body");
    };
    assert_eq!(
        vec![Statement::Break, Statement::Continue],
        block.statements
    );
}

#[test]
fn test_error_carries_line() {
    let result = parse_source("int main() {\n  return 0\n}");
    let err = result.expect_err("should fail");
    assert_eq!(3, err.get_line());
}

#[test]
fn test_unexpected_top_level() {
    let result = parse_source("return 0;");
    let err = result.expect_err("should fail");
    assert_eq!(
        InnerParseError::UnexpectedTopLevel(Token::Return),
        err.inner
    );
}
