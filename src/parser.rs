use nonempty::NonEmpty;
use tracing::{debug, trace};

use crate::annotated_ast::{AnnotatedExpression, AnnotatedProgram, AnnotatedStatement, ExprId};
use crate::annotated_ast::AnnotatedExpression::{Assign, Literal, Variable};
use crate::ast::{Atom, BinaryOperator, LogicalOperator, UnaryOperator};
use crate::common::error::{convert_errors, ErrorInfo, LoxResult, ParserError};
use crate::common::lexer::{Token, TokenType};

const MAX_ARGUMENTS: usize = 255;

/// Parses a whole program, failing if any syntax error was reported.
pub fn parse(tokens: &[Token]) -> LoxResult<AnnotatedProgram> {
    let (program, errors) = Parser::parse(tokens);
    match NonEmpty::from_vec(errors) {
        Some(errors) => convert_errors(Err(errors)),
        None => Ok(program),
    }
}

type ParserResult<A> = Result<A, ParserError>;

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    // Stands in for a missing end-of-input marker.
    eof: Token,
    errors: Vec<ParserError>,
    current: usize,
}

impl<'a> Parser<'a> {
    /// Parses every statement it can. A statement with a syntax error is dropped, its error is
    /// recorded, and parsing resumes at the next statement boundary.
    pub fn parse(tokens: &'a [Token]) -> (AnnotatedProgram, Vec<ParserError>) {
        let last_line = tokens.last().map(|t| t.line).unwrap_or(1);
        let mut parser = Parser { tokens, eof: Token::eof(last_line), current: 0, errors: Vec::new() };
        let program = parser.program();
        debug!(
            statements = program.statements.len(),
            errors = parser.errors.len(),
            "parsed program",
        );
        (program, parser.errors)
    }

    fn program(&mut self) -> AnnotatedProgram {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(s) = self.declaration() {
                statements.push(s);
            }
        }
        AnnotatedProgram { statements }
    }

    fn declaration(&mut self) -> Option<AnnotatedStatement> {
        let result = self.matches_single(TokenType::Var)
            .map(|_| self.var_declaration())
            .unwrap_or_else(|| self.statement());
        match result {
            Ok(s) => Some(s),
            Err(e) => {
                debug!(line = e.token.line, message = %e.message, "syntax error");
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParserResult<AnnotatedStatement> {
        let (name, info) = self.consume_identifier("Expect variable name.")?;
        let initializer = self.matches_single(TokenType::Equal)
            .map(|_| self.expression())
            .transpose()?;
        self.consume(TokenType::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(AnnotatedStatement::Variable(name, initializer, info))
    }

    fn statement(&mut self) -> ParserResult<AnnotatedStatement> {
        if let Some(i) = self.matches_single(TokenType::If) {
            return self.if_statement(i);
        }
        if let Some(i) = self.matches_single(TokenType::Print) {
            return self.print_statement(i);
        }
        if let Some(i) = self.matches_single(TokenType::OpenBrace) {
            return self.block().map(|statements| AnnotatedStatement::Block(statements, i));
        }
        self.expression_statement()
    }

    fn if_statement(&mut self, i: ErrorInfo) -> ParserResult<AnnotatedStatement> {
        self.consume(TokenType::OpenParen, "Expect '(' after 'if'.")?;
        let cond = self.expression()?;
        self.consume(TokenType::CloseParen, "Expect ')' after if condition.")?;
        // Recursing through statement() makes an else bind to the nearest unmatched if.
        let if_stmt = self.statement().map(Box::new)?;
        let else_stmt = self.matches_single(TokenType::Else)
            .map(|_| self.statement().map(Box::new))
            .transpose()?;
        Ok(AnnotatedStatement::IfElse { cond, if_stmt, else_stmt, error_info: i })
    }

    fn print_statement(&mut self, i: ErrorInfo) -> ParserResult<AnnotatedStatement> {
        let value = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(AnnotatedStatement::Print(value, i))
    }

    fn expression_statement(&mut self) -> ParserResult<AnnotatedStatement> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(AnnotatedStatement::Expression(expr))
    }

    fn block(&mut self) -> ParserResult<Vec<AnnotatedStatement>> {
        let mut statements = Vec::new();
        while !self.check(&TokenType::CloseBrace) && !self.is_at_end() {
            if let Some(s) = self.declaration() {
                statements.push(s);
            }
        }
        self.consume(TokenType::CloseBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParserResult<AnnotatedExpression> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParserResult<AnnotatedExpression> {
        let expr = self.logical_or()?;
        let equals = self.peek().clone();
        match self.matches_single(TokenType::Equal) {
            None => Ok(expr),
            Some(_) => {
                let value = self.assignment()?;
                match expr {
                    Variable(name, id, i) => Ok(Assign(name, id, Box::new(value), i)),
                    // Reported, but the statement is still well-formed enough to keep parsing.
                    e => {
                        debug!(line = equals.line, "invalid assignment target");
                        self.errors.push(ParserError::new("Invalid assignment target.", equals));
                        Ok(e)
                    }
                }
            }
        }
    }

    fn logical_or(&mut self) -> ParserResult<AnnotatedExpression> {
        self.logical(
            |e| match e {
                TokenType::Or => Some(LogicalOperator::Or),
                _ => None,
            },
            |e| e.logical_and(),
        )
    }

    fn logical_and(&mut self) -> ParserResult<AnnotatedExpression> {
        self.logical(
            |e| match e {
                TokenType::And => Some(LogicalOperator::And),
                _ => None,
            },
            |e| e.equality(),
        )
    }

    fn equality(&mut self) -> ParserResult<AnnotatedExpression> {
        self.binary(
            |e| match e {
                TokenType::BangEqual => Some(BinaryOperator::BangEqual),
                TokenType::EqualEqual => Some(BinaryOperator::EqualEqual),
                _ => None,
            },
            |e| e.comparison(),
        )
    }

    fn comparison(&mut self) -> ParserResult<AnnotatedExpression> {
        self.binary(
            |e| match e {
                TokenType::Greater => Some(BinaryOperator::Greater),
                TokenType::Less => Some(BinaryOperator::Less),
                TokenType::GreaterEqual => Some(BinaryOperator::GreaterEqual),
                TokenType::LessEqual => Some(BinaryOperator::LessEqual),
                _ => None,
            },
            |e| e.term(),
        )
    }

    fn term(&mut self) -> ParserResult<AnnotatedExpression> {
        self.binary(
            |e| match e {
                TokenType::Minus => Some(BinaryOperator::Minus),
                TokenType::Plus => Some(BinaryOperator::Plus),
                _ => None,
            },
            |e| e.factor(),
        )
    }

    fn factor(&mut self) -> ParserResult<AnnotatedExpression> {
        self.binary(
            |e| match e {
                TokenType::Slash => Some(BinaryOperator::Div),
                TokenType::Star => Some(BinaryOperator::Mult),
                _ => None,
            },
            |e| e.unary(),
        )
    }

    fn unary(&mut self) -> ParserResult<AnnotatedExpression> {
        match self.matches(|e| match e {
            TokenType::Bang => Some(UnaryOperator::Bang),
            TokenType::Minus => Some(UnaryOperator::Minus),
            _ => None,
        }) {
            Some((operator, info)) => {
                let right = self.unary()?;
                Ok(AnnotatedExpression::Unary(operator, Box::new(right), info))
            }
            None => self.call(),
        }
    }

    fn call(&mut self) -> ParserResult<AnnotatedExpression> {
        let mut expr = self.primary()?;
        while self.matches_single(TokenType::OpenParen).is_some() {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: AnnotatedExpression) -> ParserResult<AnnotatedExpression> {
        let mut arguments = Vec::new();
        if !self.check(&TokenType::CloseParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.errors.push(ParserError::new("Can't have more than 255 arguments.", token));
                }
                arguments.push(self.expression()?);
                if self.matches_single(TokenType::Comma).is_none() {
                    break;
                }
            }
        }
        let paren = self.consume(TokenType::CloseParen, "Expect ')' after arguments.")?;
        Ok(AnnotatedExpression::Call(Box::new(callee), arguments, paren))
    }

    fn primary(&mut self) -> ParserResult<AnnotatedExpression> {
        if let Some((atom, info)) = self.matches(|e| match e {
            TokenType::False => Some(Atom::False),
            TokenType::True => Some(Atom::True),
            TokenType::Nil => Some(Atom::Nil),
            TokenType::StringLiteral(literal) => Some(Atom::string(literal)),
            TokenType::NumberLiteral(literal) => Some(Atom::Number(*literal)),
            _ => None,
        }) {
            return Ok(Literal(atom, info));
        }
        if let Some((name, info)) = self.matches(identifier) {
            return Ok(Variable(name, ExprId::fresh(), info));
        }
        if let Some(info) = self.matches_single(TokenType::OpenParen) {
            let expr = self.expression()?;
            self.consume(TokenType::CloseParen, "Expect ')' after expression.")?;
            return Ok(AnnotatedExpression::Grouping(Box::new(expr), info));
        }
        Err(ParserError::new("Expect expression.", self.peek().clone()))
    }

    fn binary<F, Next>(&mut self, func: F, next: Next) -> ParserResult<AnnotatedExpression>
        where F: Fn(&TokenType) -> Option<BinaryOperator>,
              Next: Fn(&mut Self) -> ParserResult<AnnotatedExpression> {
        let mut expr = next(self)?;
        while let Some((operator, info)) = self.matches(&func) {
            let right = next(self)?;
            expr = AnnotatedExpression::Binary(operator, Box::new(expr), Box::new(right), info)
        }
        Ok(expr)
    }

    fn logical<F, Next>(&mut self, func: F, next: Next) -> ParserResult<AnnotatedExpression>
        where F: Fn(&TokenType) -> Option<LogicalOperator>,
              Next: Fn(&mut Self) -> ParserResult<AnnotatedExpression> {
        let mut expr = next(self)?;
        while let Some((operator, info)) = self.matches(&func) {
            let right = next(self)?;
            expr = AnnotatedExpression::Logical(operator, Box::new(expr), Box::new(right), info)
        }
        Ok(expr)
    }

    fn matches_single(&mut self, expected: TokenType) -> Option<ErrorInfo> {
        if self.check(&expected) {
            Some(self.advance().error_info())
        } else {
            None
        }
    }

    fn matches<F, A>(&mut self, func: F) -> Option<(A, ErrorInfo)>
        where F: Fn(&TokenType) -> Option<A>
    {
        if self.is_at_end() {
            return None;
        }
        let result = func(self.peek().get_type()).map(|e| (e, self.peek().error_info()));
        if result.is_some() {
            self.advance();
        }
        result
    }

    fn consume(&mut self, expected: TokenType, message: &str) -> ParserResult<ErrorInfo> {
        if self.check(&expected) {
            Ok(self.advance().error_info())
        } else {
            Err(ParserError::new(message, self.peek().clone()))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> ParserResult<(String, ErrorInfo)> {
        self.matches(identifier).ok_or_else(|| ParserError::new(message, self.peek().clone()))
    }

    fn check(&self, expected: &TokenType) -> bool {
        !self.is_at_end() && self.peek().get_type() == expected
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().get_type() == &TokenType::Eof
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    fn previous(&self) -> &Token {
        self.current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&self.eof)
    }

    fn synchronize(&mut self) {
        trace!(line = self.peek().line, "synchronizing after syntax error");
        self.advance();
        while !self.is_at_end() {
            if self.previous().get_type() == &TokenType::Semicolon {
                return;
            }
            if self.peek().get_type().starts_statement() {
                return;
            }
            self.advance();
        }
    }
}

fn identifier(tt: &TokenType) -> Option<String> {
    match tt {
        TokenType::Identifier(name) => Some(name.to_owned()),
        _ => None,
    }
}
