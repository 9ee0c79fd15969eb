//! Recursive-descent parser with precedence climbing.
//!
//! [parse] consumes the token stream and produces the [Program] tree, or the
//! first [ParseError]. Statements and declarations each get a small
//! `parse_*` function; expressions go through [parse_exp], which climbs the
//! precedence ladder, with [parse_factor] handling unary chains and
//! primaries.

mod cursor;
mod parse_error;
#[cfg(test)]
mod parser_tests;

use crate::ast::*;
use crate::lexer::{SpannedToken, Token};
use cursor::Cursor;
pub use parse_error::{InnerParseError, ParseError, Result};

fn get_prec(token: &Token) -> u64 {
    match token {
        Token::Asterisk | Token::FSlash | Token::Percent => 50,
        Token::Plus | Token::Hyphen => 45,
        Token::IsLessThan
        | Token::IsLessThanOrEqual
        | Token::IsGreaterThan
        | Token::IsGreaterThanOrEqual => 35,
        Token::IsEqual | Token::IsNotEqual => 30,
        Token::LogicalAnd => 10,
        Token::LogicalOr => 5,
        Token::Assign => 1,
        _ => 0,
    }
}

impl TryFrom<&Token> for BinaryOp {
    type Error = InnerParseError;
    fn try_from(value: &Token) -> std::result::Result<Self, InnerParseError> {
        match value {
            Token::Plus => Ok(BinaryOp::Add),
            Token::Hyphen => Ok(BinaryOp::Subtract),
            Token::Asterisk => Ok(BinaryOp::Multiply),
            Token::FSlash => Ok(BinaryOp::Divide),
            Token::Percent => Ok(BinaryOp::Modulo),
            Token::IsEqual => Ok(BinaryOp::IsEqual),
            Token::IsNotEqual => Ok(BinaryOp::IsNotEqual),
            Token::IsLessThan => Ok(BinaryOp::LessThan),
            Token::IsLessThanOrEqual => Ok(BinaryOp::LessOrEqual),
            Token::IsGreaterThan => Ok(BinaryOp::GreaterThan),
            Token::IsGreaterThanOrEqual => Ok(BinaryOp::GreaterOrEqual),
            Token::LogicalAnd => Ok(BinaryOp::LogicalAnd),
            Token::LogicalOr => Ok(BinaryOp::LogicalOr),
            _ => Err(InnerParseError::BadFactor(value.clone())),
        }
    }
}

impl TryFrom<&Token> for UnaryOp {
    type Error = InnerParseError;
    fn try_from(value: &Token) -> std::result::Result<Self, InnerParseError> {
        match value {
            Token::Plus => Ok(Self::Plus),
            Token::Hyphen => Ok(Self::Negate),
            Token::LogicalNot => Ok(Self::LogicalNot),
            Token::Ampersand => Ok(Self::AddressOf),
            Token::Asterisk => Ok(Self::Dereference),
            Token::Increment => Ok(Self::Increment),
            Token::Decrement => Ok(Self::Decrement),
            _ => Err(InnerParseError::BadFactor(value.clone())),
        }
    }
}

fn parse_identifier(cursor: &mut Cursor) -> Result<Identifier> {
    let line = cursor.get_line();
    let next = cursor.next_or_error()?;
    if let Token::Identifier(name) = next {
        Ok(name.to_owned())
    } else {
        Err(InnerParseError::ExpectedIdentifierButGot(next.clone()).set_line(line))
    }
}

/// Type for function returns and parameters: `int`, `char` or `void`, with
/// any number of `*` suffixes.
fn parse_any_type(cursor: &mut Cursor) -> Result<Type> {
    let line = cursor.get_line();
    let next = cursor.next_or_error()?;
    let base = match next {
        Token::Int => BaseType::Int,
        Token::Char => BaseType::Char,
        Token::Void => BaseType::Void,
        _ => return Err(InnerParseError::ExpectedTypeButGot(next.clone()).set_line(line)),
    };
    Ok(Type::new(base, parse_pointer_suffix(cursor)))
}

/// Type for variable declarations: `int` or `char` only.
fn parse_data_type(cursor: &mut Cursor) -> Result<Type> {
    let line = cursor.get_line();
    let next = cursor.next_or_error()?;
    let base = match next {
        Token::Int => BaseType::Int,
        Token::Char => BaseType::Char,
        _ => return Err(InnerParseError::ExpectedTypeButGot(next.clone()).set_line(line)),
    };
    Ok(Type::new(base, parse_pointer_suffix(cursor)))
}

fn parse_pointer_suffix(cursor: &mut Cursor) -> u8 {
    let mut pointer_level = 0;
    while cursor.bump_if(&Token::Asterisk) {
        pointer_level += 1;
    }
    pointer_level
}

fn parse_exp_assign(cursor: &mut Cursor, prec: u64, left: Exp) -> Result<Exp> {
    cursor.expect(&Token::Assign)?;
    // same precedence on the right makes assignment right-associative; the
    // IR generator rejects non-identifier targets
    let right = parse_exp(cursor, prec)?;
    Ok(Exp::assignment(left, right))
}

fn parse_binary_op(cursor: &mut Cursor) -> Result<BinaryOp> {
    let line = cursor.get_line();
    let next = cursor.next_or_error()?;
    BinaryOp::try_from(next).map_err(|err| err.set_line(line))
}

fn parse_exp_binary(cursor: &mut Cursor, prec: u64, left: Exp) -> Result<Exp> {
    let op = parse_binary_op(cursor)?;
    let right = parse_exp(cursor, prec + 1)?;
    Ok(Exp::binary(op, left, right))
}

fn parse_exp(cursor: &mut Cursor, min_prec: u64) -> Result<Exp> {
    let mut left = parse_factor(cursor)?;

    while let Some(next_token) = cursor.peek().filter(|t| t.is_binaryop()) {
        let prec = get_prec(next_token);
        if prec < min_prec {
            break;
        }
        left = match next_token {
            Token::Assign => parse_exp_assign(cursor, prec, left)?,
            _ => parse_exp_binary(cursor, prec, left)?,
        };
    }

    Ok(left)
}

fn parse_unary_operation(cursor: &mut Cursor) -> Result<Exp> {
    let line = cursor.get_line();
    let next = cursor.next_or_error()?;
    let op = UnaryOp::try_from(next).map_err(|err| err.set_line(line))?;
    let inner = parse_factor(cursor)?;

    Ok(Exp::unary(op, inner))
}

fn parse_arguments(cursor: &mut Cursor) -> Result<Vec<Exp>> {
    let mut args = Vec::new();

    if cursor.peek_is(&Token::CloseParanth) {
        return Ok(args);
    }

    loop {
        let exp = parse_exp(cursor, 0)?;
        args.push(exp);
        if !cursor.bump_if(&Token::Comma) {
            break;
        }
    }

    Ok(args)
}

fn parse_factor_call(cursor: &mut Cursor, name: Identifier) -> Result<Exp> {
    cursor.expect(&Token::OpenParanth)?;
    let arguments = parse_arguments(cursor)?;
    cursor.expect(&Token::CloseParanth)?;
    Ok(Exp::call(name, arguments))
}

fn parse_factor_index(cursor: &mut Cursor, name: Identifier) -> Result<Exp> {
    cursor.expect(&Token::OpenBracket)?;
    let index = parse_exp(cursor, 0)?;
    cursor.expect(&Token::CloseBracket)?;
    Ok(Exp::array_access(name, index))
}

fn parse_factor_identifier(cursor: &mut Cursor) -> Result<Exp> {
    let name = parse_identifier(cursor)?;
    match cursor.peek() {
        Some(Token::OpenParanth) => parse_factor_call(cursor, name),
        Some(Token::OpenBracket) => parse_factor_index(cursor, name),
        _ => Ok(Exp::var(name)),
    }
}

fn parse_factor_subexp(cursor: &mut Cursor) -> Result<Exp> {
    cursor.expect(&Token::OpenParanth)?;
    let exp = parse_exp(cursor, 0)?;
    cursor.expect(&Token::CloseParanth)?;
    Ok(exp)
}

fn parse_factor(cursor: &mut Cursor) -> Result<Exp> {
    let peek = cursor.peek_or_error()?;
    match peek {
        Token::IntLiteral(i) => {
            let literal = Exp::IntLiteral(*i);
            cursor.bump();
            Ok(literal)
        }
        Token::CharLiteral(c) => {
            let literal = Exp::CharLiteral(*c);
            cursor.bump();
            Ok(literal)
        }
        Token::StringLiteral(s) => {
            let literal = Exp::StringLiteral(s.clone());
            cursor.bump();
            Ok(literal)
        }
        Token::Identifier(_) => parse_factor_identifier(cursor),
        Token::OpenParanth => parse_factor_subexp(cursor),
        t if t.is_unaryop() => parse_unary_operation(cursor),
        _ => {
            let peek = peek.clone();
            let line = cursor.get_line();
            Err(InnerParseError::BadFactor(peek).set_line(line))
        }
    }
}

fn parse_array_size(cursor: &mut Cursor) -> Result<i64> {
    let line = cursor.get_line();
    let next = cursor.next_or_error()?;
    if let Token::IntLiteral(n) = next {
        Ok(*n)
    } else {
        Err(InnerParseError::ExpectedArraySizeButGot(next.clone()).set_line(line))
    }
}

fn parse_var_decl(cursor: &mut Cursor) -> Result<VarDecl> {
    let var_type = parse_data_type(cursor)?;
    let name = parse_identifier(cursor)?;

    let is_array = cursor.bump_if(&Token::OpenBracket);
    let mut array_size = 0;
    if is_array {
        array_size = parse_array_size(cursor)?;
        cursor.expect(&Token::CloseBracket)?;
    }

    let has_init = cursor.bump_if(&Token::Assign);
    let init = has_init.then(|| parse_exp(cursor, 0)).transpose()?;
    cursor.expect(&Token::Semicolon)?;

    Ok(VarDecl {
        name,
        var_type,
        is_const: false,
        is_array,
        array_size,
        init,
    })
}

fn parse_const_decl(cursor: &mut Cursor) -> Result<VarDecl> {
    cursor.expect(&Token::Const)?;
    let var_type = parse_data_type(cursor)?;
    let name = parse_identifier(cursor)?;

    cursor.expect(&Token::Assign)?;
    let init = parse_exp(cursor, 0)?;
    cursor.expect(&Token::Semicolon)?;

    Ok(VarDecl {
        name,
        var_type,
        is_const: true,
        is_array: false,
        array_size: 0,
        init: Some(init),
    })
}

fn parse_if(cursor: &mut Cursor) -> Result<Statement> {
    cursor.expect(&Token::If)?;
    cursor.expect(&Token::OpenParanth)?;
    let condition = parse_exp(cursor, 0)?;
    cursor.expect(&Token::CloseParanth)?;
    let then = parse_statement(cursor).map(Box::new)?;
    // a trailing else binds to the nearest if
    let else_present = cursor.bump_if(&Token::Else);
    let els = else_present
        .then(|| parse_statement(cursor))
        .transpose()?
        .map(Box::new);

    Ok(Statement::If(If {
        condition,
        then,
        els,
    }))
}

fn parse_while(cursor: &mut Cursor) -> Result<Statement> {
    cursor.expect(&Token::While)?;
    cursor.expect(&Token::OpenParanth)?;
    let condition = parse_exp(cursor, 0)?;
    cursor.expect(&Token::CloseParanth)?;
    let body = parse_statement(cursor).map(Box::new)?;

    Ok(Statement::While(While { condition, body }))
}

fn parse_break(cursor: &mut Cursor) -> Result<Statement> {
    cursor.expect(&Token::Break)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Statement::Break)
}

fn parse_continue(cursor: &mut Cursor) -> Result<Statement> {
    cursor.expect(&Token::Continue)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Statement::Continue)
}

fn parse_return(cursor: &mut Cursor) -> Result<Statement> {
    cursor.expect(&Token::Return)?;
    if cursor.bump_if(&Token::Semicolon) {
        return Ok(Statement::Return(None));
    }
    let exp = parse_exp(cursor, 0)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Statement::Return(Some(exp)))
}

fn parse_statement_exp(cursor: &mut Cursor) -> Result<Statement> {
    let exp = parse_exp(cursor, 0)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Statement::Exp(exp))
}

fn parse_statement(cursor: &mut Cursor) -> Result<Statement> {
    let peek = cursor.peek_or_error()?;
    match peek {
        Token::Int | Token::Char => parse_var_decl(cursor).map(Statement::Decl),
        Token::Const => parse_const_decl(cursor).map(Statement::Decl),
        Token::If => parse_if(cursor),
        Token::While => parse_while(cursor),
        Token::Return => parse_return(cursor),
        Token::Break => parse_break(cursor),
        Token::Continue => parse_continue(cursor),
        Token::OpenCurly => parse_block(cursor).map(Statement::Compound),
        _ => parse_statement_exp(cursor),
    }
}

fn parse_block(cursor: &mut Cursor) -> Result<Block> {
    let mut statements = Vec::new();

    cursor.expect(&Token::OpenCurly)?;

    while !cursor.bump_if(&Token::CloseCurly) {
        let statement = parse_statement(cursor)?;
        statements.push(statement);
    }

    Ok(Block { statements })
}

fn parse_function_def(cursor: &mut Cursor) -> Result<FunctionDef> {
    let return_type = parse_any_type(cursor)?;
    let name = parse_identifier(cursor)?;

    cursor.expect(&Token::OpenParanth)?;
    let params = parse_params(cursor)?;
    cursor.expect(&Token::CloseParanth)?;

    let body = parse_block(cursor)?;

    Ok(FunctionDef {
        name,
        return_type,
        params,
        body,
    })
}

fn parse_params(cursor: &mut Cursor) -> Result<Vec<(Type, Identifier)>> {
    let mut params = Vec::new();

    if cursor.peek_is(&Token::CloseParanth) {
        return Ok(params);
    }

    loop {
        let ptype = parse_any_type(cursor)?;
        let pname = parse_identifier(cursor)?;
        params.push((ptype, pname));
        if !cursor.bump_if(&Token::Comma) {
            break;
        }
    }

    Ok(params)
}

/// Looks past the type and any `*` tokens: a name followed by `(` starts a
/// function definition, anything else is a variable declaration.
fn looks_like_function(cursor: &Cursor) -> bool {
    let mut n = 1;
    while cursor.peek_nth(n) == Some(&Token::Asterisk) {
        n += 1;
    }
    matches!(cursor.peek_nth(n), Some(Token::Identifier(_)))
        && cursor.peek_nth(n + 1) == Some(&Token::OpenParanth)
}

fn parse_top_level(cursor: &mut Cursor) -> Result<Declaration> {
    let peek = cursor.peek_or_error()?;
    match peek {
        Token::Const => parse_const_decl(cursor).map(Declaration::Var),
        t if t.is_type_specifier() => {
            if looks_like_function(cursor) {
                parse_function_def(cursor).map(Declaration::Fun)
            } else {
                parse_var_decl(cursor).map(Declaration::Var)
            }
        }
        _ => {
            let peek = peek.clone();
            let line = cursor.get_line();
            Err(InnerParseError::UnexpectedTopLevel(peek).set_line(line))
        }
    }
}

pub fn parse(tokens: &[SpannedToken]) -> Result<Program> {
    let mut declarations = Vec::new();
    let mut cursor = Cursor::new(tokens);

    while !cursor.peek_is(&Token::Eof) {
        let declaration = parse_top_level(&mut cursor)?;
        declarations.push(declaration);
    }

    Ok(Program { declarations })
}
