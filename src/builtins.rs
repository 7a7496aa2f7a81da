use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

pub struct BuiltinFunction(pub Box<dyn Fn(Vec<Rc<Object>>) -> Rc<Object>>);

impl BuiltinFunction {
    pub fn call(&self, args: Vec<Rc<Object>>) -> Rc<Object> {
        (self.0)(args)
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin-function")
    }
}

fn wrong_arg_count(got: usize, want: usize) -> Rc<Object> {
    Object::error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn must_be_array(name: &str, arg: &Object) -> Rc<Object> {
    Object::error(format!(
        "argument to `{}` must be ARRAY, got {}",
        name,
        arg.type_as_str()
    ))
}

/// The fixed table of native functions visible from every scope.
pub struct Builtins {
    table: HashMap<&'static str, Rc<Object>>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let entries = [
            ("len", Self::len()),
            ("first", Self::first()),
            ("last", Self::last()),
            ("rest", Self::rest()),
            ("push", Self::push()),
            ("puts", Self::puts()),
        ];
        let table = entries
            .into_iter()
            .map(|(name, f)| (name, Rc::new(Object::Builtin(f))))
            .collect();
        Self { table }
    }

    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        self.table.get(name).map(Rc::clone)
    }

    pub fn puts() -> BuiltinFunction {
        let puts_fn = |items: Vec<Rc<Object>>| -> Rc<Object> {
            for item in items {
                println!("{}", item.inspect());
            }
            Object::null()
        };
        BuiltinFunction(Box::new(puts_fn))
    }

    pub fn len() -> BuiltinFunction {
        let len_fn = |items: Vec<Rc<Object>>| -> Rc<Object> {
            if items.len() != 1 {
                return wrong_arg_count(items.len(), 1);
            }
            match &*items[0] {
                Object::Str(s) => Rc::new(Object::Int(s.len() as i64)),
                Object::Array(vs) => Rc::new(Object::Int(vs.len() as i64)),
                arg => Object::error(format!(
                    "argument to `len` not supported, got {}",
                    arg.type_as_str()
                )),
            }
        };
        BuiltinFunction(Box::new(len_fn))
    }

    pub fn first() -> BuiltinFunction {
        let first_fn = |items: Vec<Rc<Object>>| -> Rc<Object> {
            if items.len() != 1 {
                return wrong_arg_count(items.len(), 1);
            }
            match &*items[0] {
                Object::Array(vs) => vs.first().map(Rc::clone).unwrap_or_else(Object::null),
                arg => must_be_array("first", arg),
            }
        };
        BuiltinFunction(Box::new(first_fn))
    }

    pub fn last() -> BuiltinFunction {
        let last_fn = |items: Vec<Rc<Object>>| -> Rc<Object> {
            if items.len() != 1 {
                return wrong_arg_count(items.len(), 1);
            }
            match &*items[0] {
                Object::Array(vs) => vs.last().map(Rc::clone).unwrap_or_else(Object::null),
                arg => must_be_array("last", arg),
            }
        };
        BuiltinFunction(Box::new(last_fn))
    }

    pub fn rest() -> BuiltinFunction {
        let rest_fn = |items: Vec<Rc<Object>>| -> Rc<Object> {
            if items.len() != 1 {
                return wrong_arg_count(items.len(), 1);
            }
            match &*items[0] {
                Object::Array(vs) if vs.is_empty() => Object::null(),
                Object::Array(vs) => Rc::new(Object::Array(vs[1..].to_vec())),
                arg => must_be_array("rest", arg),
            }
        };
        BuiltinFunction(Box::new(rest_fn))
    }

    pub fn push() -> BuiltinFunction {
        let push_fn = |items: Vec<Rc<Object>>| -> Rc<Object> {
            if items.len() != 2 {
                return wrong_arg_count(items.len(), 2);
            }
            match &*items[0] {
                Object::Array(vs) => {
                    let mut new_vs = Vec::with_capacity(vs.len() + 1);
                    new_vs.extend(vs.iter().map(Rc::clone));
                    new_vs.push(Rc::clone(&items[1]));
                    Rc::new(Object::Array(new_vs))
                }
                arg => must_be_array("push", arg),
            }
        };
        BuiltinFunction(Box::new(push_fn))
    }
}

#[cfg(test)]
mod builtins_tests {
    use super::*;

    fn int(v: i64) -> Rc<Object> {
        Rc::new(Object::Int(v))
    }

    fn array(vs: &[i64]) -> Rc<Object> {
        Rc::new(Object::Array(vs.iter().map(|v| int(*v)).collect()))
    }

    fn call(name: &str, args: Vec<Rc<Object>>) -> Rc<Object> {
        let builtins = Builtins::new();
        match &*builtins.get(name).expect("builtin should exist") {
            Object::Builtin(f) => f.call(args),
            other => panic!("expected builtin, got {:?}", other),
        }
    }

    #[test]
    fn test_registry() {
        let builtins = Builtins::new();
        for name in ["len", "first", "last", "rest", "push", "puts"] {
            assert!(builtins.get(name).is_some(), "missing builtin {}", name);
        }
        assert!(builtins.get("to_str").is_none());
    }

    #[test]
    fn test_array_builtins() {
        let test_cases = [
            ("first", vec![array(&[1, 2, 3])], "1"),
            ("first", vec![array(&[])], "null"),
            ("last", vec![array(&[1, 2, 3])], "3"),
            ("last", vec![array(&[])], "null"),
            ("rest", vec![array(&[1, 2, 3])], "[2, 3]"),
            ("rest", vec![array(&[1])], "[]"),
            ("rest", vec![array(&[])], "null"),
            ("push", vec![array(&[1]), int(2)], "[1, 2]"),
            ("len", vec![array(&[1, 2])], "2"),
            ("len", vec![Rc::new(Object::Str("four".into()))], "4"),
        ];
        for (name, args, expected) in test_cases {
            assert_eq!(expected, call(name, args).inspect(), "{}", name);
        }
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let original = array(&[1, 2]);
        let pushed = call("push", vec![Rc::clone(&original), int(3)]);
        assert_eq!("[1, 2]", original.inspect());
        assert_eq!("[1, 2, 3]", pushed.inspect());
    }

    #[test]
    fn test_builtin_errors() {
        let test_cases = [
            ("len", vec![int(1)], "argument to `len` not supported, got INTEGER"),
            ("len", vec![], "wrong number of arguments. got=0, want=1"),
            (
                "len",
                vec![array(&[]), array(&[])],
                "wrong number of arguments. got=2, want=1",
            ),
            ("first", vec![int(1)], "argument to `first` must be ARRAY, got INTEGER"),
            ("last", vec![int(1)], "argument to `last` must be ARRAY, got INTEGER"),
            ("rest", vec![int(1)], "argument to `rest` must be ARRAY, got INTEGER"),
            ("push", vec![int(1), int(1)], "argument to `push` must be ARRAY, got INTEGER"),
            ("push", vec![array(&[])], "wrong number of arguments. got=1, want=2"),
        ];
        for (name, args, expected) in test_cases {
            match &*call(name, args) {
                Object::Error(msg) => assert_eq!(expected, msg),
                other => panic!("expected error from {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_puts_returns_null() {
        let got = call("puts", vec![int(1), Rc::new(Object::Str("hi".into()))]);
        assert!(matches!(*got, Object::Null));
    }
}
