use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::ast::{BlockStatement, Identifier};
use crate::builtins::BuiltinFunction;

#[derive(Debug)]
pub enum Object {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Vec<Rc<Object>>),
    Hash(HashMap<HashKey, HashPair>),
    Function(Function),
    Builtin(BuiltinFunction),
    Return(Rc<Object>),
    Error(String),
}

impl Object {
    pub fn null() -> Rc<Object> {
        Rc::new(Object::Null)
    }

    pub fn bool(b: bool) -> Rc<Object> {
        Rc::new(Object::Bool(b))
    }

    pub fn error(msg: impl Into<String>) -> Rc<Object> {
        Rc::new(Object::Error(msg.into()))
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// A `return` or an error, both of which must unwind untouched to the
    /// nearest function call or the program.
    pub fn is_signal(&self) -> bool {
        matches!(self, Object::Return(_) | Object::Error(_))
    }

    /// `false` and `null` are falsy, everything else (including `0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Bool(false))
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Int(v) => *v as u64,
            Object::Bool(b) => *b as u64,
            Object::Str(s) => {
                let mut hasher = DefaultHasher::new();
                s.hash(&mut hasher);
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            object_type: self.type_as_str(),
            value,
        })
    }

    pub fn inspect(&self) -> String {
        use Object::*;
        match self {
            Int(v) => v.to_string(),
            Bool(v) => v.to_string(),
            Null => "null".to_string(),
            Str(s) => s.clone(),
            Array(items) => {
                let items = items.iter().map(|v| v.inspect()).collect::<Vec<_>>();
                format!("[{}]", items.join(", "))
            }
            Hash(pairs) => {
                let mut pairs = pairs
                    .values()
                    .map(|p| format!("{}: {}", p.key.inspect(), p.value.inspect()))
                    .collect::<Vec<_>>();
                pairs.sort();
                format!("{{{}}}", pairs.join(", "))
            }
            Return(v) => v.inspect(),
            Error(msg) => format!("ERROR: {}", msg),
            Function(f) => f.inspect(),
            Builtin(_) => "builtin function".to_string(),
        }
    }

    pub fn type_as_str(&self) -> &'static str {
        use Object::*;
        match self {
            Int(_) => "INTEGER",
            Bool(_) => "BOOLEAN",
            Null => "NULL",
            Str(_) => "STRING",
            Array(_) => "ARRAY",
            Hash(_) => "HASH",
            Return(_) => "RETURN_VALUE",
            Error(_) => "ERROR",
            Function { .. } => "FUNCTION",
            Builtin(_) => "BUILTIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    object_type: &'static str,
    value: u64,
}

#[derive(Debug)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Rc<RefCell<Environment>>,
}

impl Function {
    fn inspect(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|v| v.value.as_str())
            .collect::<Vec<_>>();
        format!("fn({}) {}", parameters.join(", "), self.body)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

pub struct Environment {
    outer: Option<Rc<RefCell<Environment>>>,
    curr: HashMap<String, Rc<Object>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            outer: None,
            curr: HashMap::new(),
        }))
    }

    pub fn with_outer(outer: &Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            outer: Some(Rc::clone(outer)),
            curr: HashMap::new(),
        }))
    }

    fn do_set(&mut self, name: &str, val: &Rc<Object>) {
        self.curr.insert(name.into(), Rc::clone(val));
    }

    fn do_get(&self, name: &str) -> Option<Rc<Object>> {
        if let Some(val) = self.curr.get(name) {
            Some(Rc::clone(val))
        } else if let Some(outer) = &self.outer {
            outer.borrow().do_get(name)
        } else {
            None
        }
    }

    /// Binds `name` in the innermost scope of `env`.
    pub fn set(env: &RefCell<Environment>, name: &str, val: &Rc<Object>) {
        let mut inner = env.borrow_mut();
        inner.do_set(name, val);
    }

    /// Looks `name` up from the innermost scope outwards.
    pub fn get(env: &RefCell<Environment>, name: &str) -> Option<Rc<Object>> {
        env.borrow().do_get(name)
    }
}
