//! Object model: classes, instances and method registration.
//!
//! Method tables are explicit registration tables built once at startup
//! (name -> callable descriptor); there is no runtime reflection. Constant
//! tables and instance-variable tables are ordered tables, so constant and
//! ivar listings come back in definition order.

use std::rc::Rc;

use indexmap::IndexMap;
use nacre_core::{DictKey, ObjectId, Value};

use crate::core::RtTable;
use crate::errors::messages::UNKNOWN_METHOD;
use crate::runtime::Runtime;

/// A method callable on a receiver.
pub type MethodFn = fn(&mut Runtime, Value, &[Value]) -> Result<Value, String>;

/// A free function value (installed into the global table).
pub type BuiltinFn = fn(&mut Runtime, &[Value]) -> Result<Value, String>;

pub enum Function {
    Builtin(BuiltinFn),
}

pub struct ClassDef {
    pub name: String,
    pub methods: IndexMap<&'static str, MethodFn>,
    pub constants: Rc<RtTable>,
}

impl ClassDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: IndexMap::new(),
            constants: Rc::new(RtTable::new()),
        }
    }

    pub fn define_method(&mut self, name: &'static str, f: MethodFn) {
        self.methods.insert(name, f);
    }

    pub fn lookup(&self, name: &str) -> Option<MethodFn> {
        self.methods.get(name).copied()
    }
}

pub struct ObjectInstance {
    pub class: ObjectId,
    pub ivars: Rc<RtTable>,
}

impl ObjectInstance {
    pub fn new(class: ObjectId) -> Self {
        Self {
            class,
            ivars: Rc::new(RtTable::new()),
        }
    }

    pub fn ivar_get(&self, name: &str) -> Option<Value> {
        self.ivars.get(&DictKey::from_str(name))
    }

    pub fn ivar_set(&self, name: &str, value: Value) {
        self.ivars.insert(DictKey::from_str(name), value);
    }

    /// Instance variable names in definition order.
    pub fn ivar_names(&self) -> Vec<String> {
        self.ivars
            .keys()
            .map(|k| k.as_str().to_string())
            .collect()
    }
}

/// Dispatch a method on a user-defined object via its class table.
pub fn send_object(
    rt: &mut Runtime,
    recv: Value,
    method: &str,
    args: &[Value],
) -> Result<Value, String> {
    let class_id = {
        let inst = crate::methods::common::expect_object(rt, recv)?;
        inst.class
    };
    let f = {
        let class = crate::methods::common::expect_class(rt, Value::class(class_id))?;
        class.lookup(method)
    };
    match f {
        Some(f) => f(rt, recv, args),
        None => Err(format!("{}: {}", UNKNOWN_METHOD, method)),
    }
}
