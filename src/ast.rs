use std::fmt;

use crate::token::Token;

pub trait Node: fmt::Display {
    fn token_literal(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    LetStmt {
        token: Token, // let token
        name: Identifier,
        value: Expression,
    },
    ReturnStmt {
        token: Token, // return token
        value: Option<Expression>,
    },
    ExpressionStmt {
        token: Token, // first token of the expression
        value: Expression,
    },
}

impl Node for Statement {
    fn token_literal(&self) -> &str {
        use Statement::*;
        match self {
            LetStmt { token, .. } => &token.literal,
            ReturnStmt { token, .. } => &token.literal,
            ExpressionStmt { token, .. } => &token.literal,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Statement::*;
        match self {
            LetStmt { name, value, .. } => {
                write!(f, "{} {} = {}", self.token_literal(), name, value)
            }
            ReturnStmt { value: Some(value), .. } => {
                write!(f, "{} {}", self.token_literal(), value)
            }
            ReturnStmt { value: None, .. } => f.write_str(self.token_literal()),
            ExpressionStmt { value, .. } => write!(f, "{}", value),
        }
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Node for Program {
    fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(|stmt| stmt.token_literal())
            .unwrap_or("")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.statements, "; "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token, // { token
    pub statements: Vec<Statement>,
}

impl Node for BlockStatement {
    fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            f.write_str("{ }")
        } else {
            write!(f, "{{ {} }}", join(&self.statements, "; "))
        }
    }
}

// Expressions

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    PrefixExpression {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    InfixExpression {
        token: Token,
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
    IfExpression {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    CallExpression {
        token: Token, // ( token
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    IndexExpression {
        token: Token, // [ token
        left: Box<Expression>,
        index: Box<Expression>,
    },
    HashLiteral {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
}

impl Node for Expression {
    fn token_literal(&self) -> &str {
        use Expression::*;
        match self {
            Identifier(i) => i.token_literal(),
            IntegerLiteral { token, .. }
            | StringLiteral { token, .. }
            | Boolean { token, .. }
            | PrefixExpression { token, .. }
            | InfixExpression { token, .. }
            | IfExpression { token, .. }
            | FunctionLiteral { token, .. }
            | CallExpression { token, .. }
            | ArrayLiteral { token, .. }
            | IndexExpression { token, .. }
            | HashLiteral { token, .. } => &token.literal,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expression::*;
        match self {
            Identifier(i) => write!(f, "{}", i),
            IntegerLiteral { value, .. } => write!(f, "{}", value),
            StringLiteral { value, .. } => write!(f, "\"{}\"", value),
            Boolean { value, .. } => write!(f, "{}", value),
            PrefixExpression {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            InfixExpression {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            IfExpression {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            FunctionLiteral {
                token,
                parameters,
                body,
            } => write!(f, "{}({}) {}", token.literal, join(parameters, ", "), body),
            CallExpression {
                function,
                arguments,
                ..
            } => write!(f, "{}({})", function, join(arguments, ", ")),
            ArrayLiteral { elements, .. } => write!(f, "[{}]", join(elements, ", ")),
            IndexExpression { left, index, .. } => write!(f, "({}[{}])", left, index),
            HashLiteral { pairs, .. } => {
                let pairs = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", pairs.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token, // token.IDENT token
    pub value: String,
}

impl Node for Identifier {
    fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
