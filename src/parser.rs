use crate::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::{
    lexer::Lexer,
    token::{Token, TokenType},
};

pub struct Parser {
    lexer: Lexer,
    peek: Token,
    error_msgs: Vec<String>,
    // blocks opened but not yet closed by the statement being parsed
    open_blocks: usize,
}

#[derive(Debug, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Equals,      // ==
    LessGreater, // > or <
    Sum,         // + or -
    Product,     // * or /
    Prefix,      // -x or !x
    Call,        // my_function(x)
    Index,       // array[0]
}

fn token_type_precedence(t: &Token) -> Option<Precedence> {
    use Precedence::*;
    use TokenType::*;
    let p = match t.token_type {
        EQ => Equals,
        NOT_EQ => Equals,
        LT => LessGreater,
        GT => LessGreater,
        PLUS => Sum,
        MINUS => Sum,
        SLASH => Product,
        ASTERISK => Product,
        LPAREN => Call,
        LBRACKET => Index,
        _ => return None,
    };
    Some(p)
}

#[derive(Debug)]
pub struct ParserError {
    errors: Vec<String>,
}

impl ParserError {
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl std::error::Error for ParserError {}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Parser Error:")?;
        for e in &self.errors {
            writeln!(f, "- {}", e)?
        }
        Ok(())
    }
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let peek = lexer.next_token();
        Self {
            lexer,
            peek,
            error_msgs: Vec::new(),
            open_blocks: 0,
        }
    }

    /// Parses `input` and fails with every diagnostic collected along the way.
    pub fn parse(input: &str) -> Result<Program, ParserError> {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        if parser.error_msgs.is_empty() {
            Ok(program)
        } else {
            Err(ParserError {
                errors: parser.error_msgs,
            })
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.error_msgs
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::<Statement>::new();
        while !self.peek_token_is(TokenType::EOF) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement)
            } else {
                self.synchronize();
            }
        }
        Program { statements }
    }

    // Skip past the next top-level semicolon so the following statement starts
    // clean. Blocks left open by the failed statement are closed first.
    fn synchronize(&mut self) {
        use TokenType::*;
        let mut nested = 0usize;
        while !self.peek_token_is(EOF) {
            match self.next_token().token_type {
                LBRACE => nested += 1,
                RBRACE if nested > 0 => nested -= 1,
                RBRACE => self.open_blocks = self.open_blocks.saturating_sub(1),
                SEMICOLON if nested == 0 && self.open_blocks == 0 => break,
                _ => {}
            }
        }
        self.open_blocks = 0;
    }

    fn next_token(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.peek, next)
    }

    fn peek_precedence(&self) -> Precedence {
        token_type_precedence(&self.peek).unwrap_or(Precedence::Lowest)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        use TokenType::*;
        match self.peek.token_type {
            LET => self.parse_let_statement(),
            RETURN => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token_is(TokenType::SEMICOLON) {
            let _ = self.next_token();
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.peek.clone();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::ExpressionStmt { token, value })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let token_type = self.peek.token_type;

        use TokenType::*;
        // handle prefix
        let mut left_expression = match token_type {
            IDENT => Some(Expression::Identifier(self.parse_identifier())),
            INT => self.parse_integer_literal(),
            STRING => self.parse_string_literal(),
            TRUE | FALSE => self.parse_boolean(),
            BANG | MINUS => self.parse_prefix_expression(),
            LPAREN => self.parse_grouped_expression(),
            IF => self.parse_if_expression(),
            FUNCTION => self.parse_function_literal(),
            LBRACKET => self.parse_array_literal(),
            LBRACE => self.parse_hash_literal(),
            _ => {
                self.push_error(format!(
                    "no prefix parse function for {:?} found",
                    token_type
                ));
                None
            }
        }?;

        // handle infix
        while precedence < self.peek_precedence() && !self.peek_token_is(SEMICOLON) {
            left_expression = match self.peek.token_type {
                PLUS | MINUS | SLASH | ASTERISK | EQ | NOT_EQ | LT | GT => {
                    self.parse_infix_expression(left_expression)
                }
                LPAREN => self.parse_call_expression(left_expression),
                LBRACKET => self.parse_index_expression(left_expression),
                _ => return Some(left_expression),
            }?;
        }
        Some(left_expression)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.next_token();
        debug_assert_eq!(TokenType::LPAREN, token.token_type);
        let arguments = self.parse_expression_list(TokenType::RPAREN)?;
        Some(Expression::CallExpression {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.next_token();
        debug_assert_eq!(TokenType::LBRACKET, token.token_type);
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_next(TokenType::RBRACKET)?;
        Some(Expression::IndexExpression {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.next_token();
        debug_assert_eq!(TokenType::LBRACKET, token.token_type);
        let elements = self.parse_expression_list(TokenType::RBRACKET)?;
        Some(Expression::ArrayLiteral { token, elements })
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        self.parse_list(end, |p| p.parse_expression(Precedence::Lowest))
    }

    /// Comma separated items up to and including `end`. The opening delimiter
    /// must already be consumed.
    fn parse_list<T>(
        &mut self,
        end: TokenType,
        mut parse_item: impl FnMut(&mut Parser) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut items = Vec::new();
        // handle empty list
        if self.peek_token_is(end) {
            let _ = self.next_token();
            return Some(items);
        }
        // handle first element
        items.push(parse_item(self)?);
        while self.peek_token_is(TokenType::COMMA) {
            let _ = self.next_token();
            items.push(parse_item(self)?);
        }
        self.expect_next(end)?;
        Some(items)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let token = self.next_token();
        debug_assert_eq!(TokenType::LBRACE, token.token_type);
        let pairs = self.parse_list(TokenType::RBRACE, |p| {
            let key = p.parse_expression(Precedence::Lowest)?;
            p.expect_next(TokenType::COLON)?;
            let value = p.parse_expression(Precedence::Lowest)?;
            Some((key, value))
        })?;
        Some(Expression::HashLiteral { token, pairs })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.next_token();
        let tt = token.token_type;
        debug_assert!(tt == TokenType::BANG || tt == TokenType::MINUS);
        let right = Box::new(self.parse_expression(Precedence::Prefix)?);
        Some(Expression::PrefixExpression {
            operator: token.literal.clone(),
            token,
            right,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        // fn token
        let token = self.next_token();
        debug_assert_eq!(TokenType::FUNCTION, token.token_type);
        self.expect_next(TokenType::LPAREN)?;
        let parameters = self.parse_list(TokenType::RPAREN, |p| {
            let token = p.expect_next(TokenType::IDENT)?;
            Some(Identifier {
                value: token.literal.clone(),
                token,
            })
        })?;
        let body = self.parse_block_statement()?;
        Some(Expression::FunctionLiteral {
            token,
            parameters,
            body,
        })
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        // if token
        let token = self.next_token();
        debug_assert_eq!(TokenType::IF, token.token_type);

        self.expect_next(TokenType::LPAREN)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_next(TokenType::RPAREN)?;

        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token_is(TokenType::ELSE) {
            let _ = self.next_token();
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        let l_paren_token = self.next_token();
        debug_assert_eq!(TokenType::LPAREN, l_paren_token.token_type);
        let exp = self.parse_expression(Precedence::Lowest)?;
        self.expect_next(TokenType::RPAREN)?;
        Some(exp)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.next_token(); // operator token
        let curr_precedence = token_type_precedence(&token).unwrap_or(Precedence::Lowest);
        let right = Box::new(self.parse_expression(curr_precedence)?);
        Some(Expression::InfixExpression {
            left: Box::new(left),
            operator: token.literal.clone(),
            token,
            right,
        })
    }

    fn parse_identifier(&mut self) -> Identifier {
        let token = self.next_token(); // ident token
        debug_assert_eq!(TokenType::IDENT, token.token_type);
        Identifier {
            value: token.literal.clone(),
            token,
        }
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        let token = self.next_token(); // bool token
        let value = token.token_type == TokenType::TRUE;
        Some(Expression::Boolean { token, value })
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.next_token();
        debug_assert_eq!(TokenType::INT, token.token_type);
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                self.push_error(format!("could not parse {} as integer", token.literal));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.next_token();
        debug_assert_eq!(TokenType::STRING, token.token_type);
        Some(Expression::StringLiteral {
            value: token.literal.clone(),
            token,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        // first token should be return
        let token = self.next_token();
        debug_assert_eq!(TokenType::RETURN, token.token_type);

        use TokenType::{EOF, RBRACE, SEMICOLON};
        let value = match self.peek.token_type {
            SEMICOLON | RBRACE | EOF => None,
            _ => Some(self.parse_expression(Precedence::Lowest)?),
        };
        self.skip_semicolon();

        Some(Statement::ReturnStmt { token, value })
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        // should be a let statement
        let token = self.next_token();
        debug_assert_eq!(TokenType::LET, token.token_type);

        // after let statement, we should have an identifier
        let ident_token = self.expect_next(TokenType::IDENT)?;
        let name = Identifier {
            value: ident_token.literal.clone(),
            token: ident_token,
        };
        // after ident token we should get an assign token
        self.expect_next(TokenType::ASSIGN)?;

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(Statement::LetStmt { token, name, value })
    }

    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let token = self.expect_next(TokenType::LBRACE)?;
        self.open_blocks += 1;

        let mut statements = Vec::new();
        use TokenType::{EOF, RBRACE};
        loop {
            if self.peek_token_is(EOF) {
                self.peek_error(RBRACE);
                return None;
            }
            if self.peek_token_is(RBRACE) {
                let _ = self.next_token();
                self.open_blocks -= 1;
                break;
            }
            let statement = self.parse_statement()?;
            statements.push(statement);
        }

        Some(BlockStatement { token, statements })
    }

    fn peek_token_is(&self, expected: TokenType) -> bool {
        self.peek.token_type == expected
    }

    /// Consumes the next token if it has the expected type, otherwise records
    /// an error and leaves the token in place.
    fn expect_next(&mut self, expected: TokenType) -> Option<Token> {
        if self.peek_token_is(expected) {
            Some(self.next_token())
        } else {
            self.peek_error(expected);
            None
        }
    }

    fn peek_error(&mut self, expected: TokenType) {
        let got = self.peek.token_type;
        self.push_error(format!(
            "expected next token to be {:?}, got {:?} instead",
            expected, got
        ));
    }

    fn push_error(&mut self, msg: String) {
        log::debug!("parse error: {}", msg);
        self.error_msgs.push(msg);
    }
}
