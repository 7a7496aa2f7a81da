use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{self, BlockStatement, Expression, Identifier, Statement};
use crate::builtins::Builtins;
use crate::object::{Environment, Function, HashPair, Object};

type Env = Rc<RefCell<Environment>>;

/// Tree-walking evaluator. `return` and errors travel up the tree as
/// `Object::Return` / `Object::Error` values.
pub struct Evaluator {
    builtins: Builtins,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            builtins: Builtins::new(),
        }
    }

    pub fn eval_program(&self, program: &ast::Program, env: &Env) -> Rc<Object> {
        let mut res = Object::null();
        for stmt in &program.statements {
            res = self.eval_statement(stmt, env);
            if let Object::Return(v) = &*res {
                return Rc::clone(v);
            }
            if res.is_err() {
                return res;
            }
        }
        res
    }

    // unlike eval_program, a return signal is passed up untouched
    fn eval_block_statement(&self, block: &BlockStatement, env: &Env) -> Rc<Object> {
        let mut res = Object::null();
        for stmt in &block.statements {
            res = self.eval_statement(stmt, env);
            if matches!(*res, Object::Return(_) | Object::Error(_)) {
                return res;
            }
        }
        res
    }

    fn eval_statement(&self, stmt: &Statement, env: &Env) -> Rc<Object> {
        use Statement::*;
        match stmt {
            LetStmt { name, value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_signal() {
                    return value;
                }
                Environment::set(env, &name.value, &value);
                Object::null()
            }
            ReturnStmt { value, .. } => {
                let result = match value {
                    Some(value) => self.eval_expression(value, env),
                    None => Object::null(),
                };
                if result.is_signal() {
                    result
                } else {
                    Rc::new(Object::Return(result))
                }
            }
            ExpressionStmt { value, .. } => self.eval_expression(value, env),
        }
    }

    fn eval_expression(&self, expr: &Expression, env: &Env) -> Rc<Object> {
        use Expression::*;
        match expr {
            Identifier(ident) => self.eval_identifier(ident, env),
            IntegerLiteral { value, .. } => Rc::new(Object::Int(*value)),
            StringLiteral { value, .. } => Rc::new(Object::Str(value.clone())),
            Boolean { value, .. } => Object::bool(*value),
            PrefixExpression {
                operator, right, ..
            } => {
                let right = self.eval_expression(right, env);
                if right.is_signal() {
                    return right;
                }
                eval_prefix_expression(operator, &right)
            }
            InfixExpression {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.eval_expression(left, env);
                if left.is_signal() {
                    return left;
                }
                let right = self.eval_expression(right, env);
                if right.is_signal() {
                    return right;
                }
                eval_infix_expression(operator, &left, &right)
            }
            IfExpression {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_signal() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.eval_block_statement(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block_statement(alt, env)
                } else {
                    Object::null()
                }
            }
            FunctionLiteral {
                parameters, body, ..
            } => Rc::new(Object::Function(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            })),
            CallExpression {
                function,
                arguments,
                ..
            } => {
                let function = self.eval_expression(function, env);
                if function.is_signal() {
                    return function;
                }
                match self.eval_expressions(arguments, env) {
                    Ok(args) => self.apply_function(&function, args),
                    Err(err) => err,
                }
            }
            ArrayLiteral { elements, .. } => match self.eval_expressions(elements, env) {
                Ok(elements) => Rc::new(Object::Array(elements)),
                Err(err) => err,
            },
            IndexExpression { left, index, .. } => {
                let left = self.eval_expression(left, env);
                if left.is_signal() {
                    return left;
                }
                let index = self.eval_expression(index, env);
                if index.is_signal() {
                    return index;
                }
                eval_index_expression(&left, &index)
            }
            HashLiteral { pairs, .. } => self.eval_hash_literal(pairs, env),
        }
    }

    fn eval_identifier(&self, ident: &Identifier, env: &Env) -> Rc<Object> {
        Environment::get(env, &ident.value)
            .or_else(|| self.builtins.get(&ident.value))
            .unwrap_or_else(|| Object::error(format!("identifier not found: {}", ident.value)))
    }

    /// Evaluates left to right, stopping at the first error.
    fn eval_expressions(
        &self,
        exprs: &[Expression],
        env: &Env,
    ) -> Result<Vec<Rc<Object>>, Rc<Object>> {
        let mut res = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let evaluated = self.eval_expression(expr, env);
            if evaluated.is_signal() {
                return Err(evaluated);
            }
            res.push(evaluated);
        }
        Ok(res)
    }

    fn eval_hash_literal(&self, pairs: &[(Expression, Expression)], env: &Env) -> Rc<Object> {
        let mut entries = HashMap::with_capacity(pairs.len());
        for (key_expr, value_expr) in pairs {
            let key = self.eval_expression(key_expr, env);
            if key.is_signal() {
                return key;
            }
            let Some(hash_key) = key.hash_key() else {
                return unusable_as_hash_key(&key);
            };
            let value = self.eval_expression(value_expr, env);
            if value.is_signal() {
                return value;
            }
            entries.insert(hash_key, HashPair { key, value });
        }
        Rc::new(Object::Hash(entries))
    }

    fn apply_function(&self, function: &Object, args: Vec<Rc<Object>>) -> Rc<Object> {
        match function {
            Object::Function(f) => {
                if f.parameters.len() != args.len() {
                    return Object::error(format!(
                        "wrong number of arguments: want={}, got={}",
                        f.parameters.len(),
                        args.len()
                    ));
                }
                log::trace!("calling function with {} argument(s)", args.len());
                // a call scope hangs off the closure's scope, not the caller's
                let call_env = Environment::with_outer(&f.env);
                for (param, arg) in f.parameters.iter().zip(&args) {
                    Environment::set(&call_env, &param.value, arg);
                }
                let res = self.eval_block_statement(&f.body, &call_env);
                if let Object::Return(v) = &*res {
                    return Rc::clone(v);
                }
                res
            }
            Object::Builtin(builtin) => builtin.call(args),
            other => Object::error(format!("not a function: {}", other.type_as_str())),
        }
    }
}

fn unusable_as_hash_key(obj: &Object) -> Rc<Object> {
    Object::error(format!("unusable as hash key: {}", obj.type_as_str()))
}

fn eval_index_expression(left: &Object, index: &Object) -> Rc<Object> {
    match (left, index) {
        (Object::Array(items), Object::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .map(Rc::clone)
            .unwrap_or_else(Object::null),
        (Object::Array(_), _) => Object::null(),
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map(|pair| Rc::clone(&pair.value))
                .unwrap_or_else(Object::null),
            None => unusable_as_hash_key(index),
        },
        _ => Object::error(format!(
            "index operator not supported: {}",
            left.type_as_str()
        )),
    }
}

fn eval_infix_expression(operator: &str, left: &Object, right: &Object) -> Rc<Object> {
    use Object::*;
    match (left, operator, right) {
        (Int(l), _, Int(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Bool(l), "==", Bool(r)) => Object::bool(l == r),
        (Bool(l), "!=", Bool(r)) => Object::bool(l != r),
        (Str(l), "+", Str(r)) => Rc::new(Str(format!("{}{}", l, r))),
        (_, _, _) if left.type_as_str() != right.type_as_str() => Object::error(format!(
            "type mismatch: {} {} {}",
            left.type_as_str(),
            operator,
            right.type_as_str()
        )),
        (_, _, _) => Object::error(format!(
            "unknown operator: {} {} {}",
            left.type_as_str(),
            operator,
            right.type_as_str()
        )),
    }
}

// arithmetic wraps on overflow
fn eval_integer_infix_expression(operator: &str, l: i64, r: i64) -> Rc<Object> {
    let value = match operator {
        "+" => l.wrapping_add(r),
        "-" => l.wrapping_sub(r),
        "*" => l.wrapping_mul(r),
        "/" if r == 0 => return Object::error("division by zero"),
        "/" => l.wrapping_div(r),
        "<" => return Object::bool(l < r),
        ">" => return Object::bool(l > r),
        "==" => return Object::bool(l == r),
        "!=" => return Object::bool(l != r),
        _ => {
            return Object::error(format!("unknown operator: INTEGER {} INTEGER", operator))
        }
    };
    Rc::new(Object::Int(value))
}

fn eval_prefix_expression(operator: &str, right: &Object) -> Rc<Object> {
    match operator {
        "!" => Object::bool(!right.is_truthy()),
        "-" => eval_minus_prefix_operator_expression(right),
        _ => Object::error(format!(
            "unknown operator: {}{}",
            operator,
            right.type_as_str()
        )),
    }
}

fn eval_minus_prefix_operator_expression(right: &Object) -> Rc<Object> {
    if let Object::Int(v) = right {
        Rc::new(Object::Int(v.wrapping_neg()))
    } else {
        Object::error(format!("unknown operator: -{}", right.type_as_str()))
    }
}
