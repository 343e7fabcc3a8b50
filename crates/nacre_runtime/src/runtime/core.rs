use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use nacre_core::value::{FastHashMap, fast_map_new};
use nacre_core::{DictKey, ObjectId, Text, Value};

use crate::builtins_registry::{BuiltinRegistry, StdBuiltinProvider};
use crate::builtins_registry::BuiltinProvider;
use crate::core::RtTable;
use crate::core::heap::{Heap, ManagedObject};
use crate::errors::messages::{NOT_A_CLASS, RUNTIME_SHUT_DOWN, UNKNOWN_GLOBAL};
use crate::io::IoRegistry;
use crate::methods;
use crate::numeric::{BigInt, Decimal};
use crate::object::{BuiltinFn, ClassDef, Function, ObjectInstance};
use crate::util::capabilities::Capabilities;

use super::config::{RuntimeConfig, ShutdownReport};

/// Teardown hook, run once during [`Runtime::shutdown`].
pub type FinalizerFn = fn(&mut Runtime);

/// The per-process runtime context.
///
/// Lifecycle: construct (core tables and builtins are installed), use, then
/// [`Runtime::shutdown`] runs registered finalizers and closes any stream
/// still in the I/O registry. Dropping without shutdown is safe but skips
/// the finalizers.
pub struct Runtime {
    pub(crate) heap: Heap,
    globals: Rc<RtTable>,
    classes: FastHashMap<String, ObjectId>,
    string_pool: FastHashMap<String, Rc<String>>,
    caps: Capabilities,
    pub(crate) io: IoRegistry,
    rng_state: u64,
    pub(crate) config: RuntimeConfig,
    pub(crate) output: String,
    finalizers: Vec<FinalizerFn>,
    gc_roots: Vec<Value>,
    shut_down: bool,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1);
        let mut rt = Self {
            heap: Heap::new(),
            globals: Rc::new(RtTable::new()),
            classes: fast_map_new(),
            string_pool: fast_map_new(),
            caps: Capabilities::default(),
            io: IoRegistry::new(),
            rng_state: seed,
            config,
            output: String::new(),
            finalizers: Vec::new(),
            gc_roots: Vec::new(),
            shut_down: false,
        };
        rt.bootstrap();
        rt
    }

    pub fn with_capabilities(config: RuntimeConfig, caps: Capabilities) -> Self {
        let mut rt = Self::with_config(config);
        rt.caps = caps;
        rt
    }

    fn bootstrap(&mut self) {
        let object_class = self.define_class("Object");
        self.class_define_method(object_class, "to_string", |rt, recv, _args| {
            let rendered = crate::util::helpers::value_to_string(recv, rt);
            Ok(rt.new_str(&rendered))
        });
        self.class_define_method(object_class, "get", |rt, recv, args| {
            methods::common::validate_arity("get", args.len(), 1, 1)?;
            let name = methods::common::expect_str(rt, args[0])?.as_str().to_string();
            let inst = methods::common::expect_object(rt, recv)?;
            Ok(inst.ivar_get(&name).unwrap_or(Value::NIL))
        });
        self.class_define_method(object_class, "set", |rt, recv, args| {
            methods::common::validate_arity("set", args.len(), 2, 2)?;
            let name = methods::common::expect_str(rt, args[0])?.as_str().to_string();
            let inst = methods::common::expect_object(rt, recv)?;
            inst.ivar_set(&name, args[1]);
            Ok(Value::NIL)
        });

        let mut registry = BuiltinRegistry::new();
        StdBuiltinProvider.install(&mut registry);
        registry.install_into(self);
        log::debug!(
            "runtime bootstrapped: {} globals, {} classes",
            self.globals.len(),
            self.classes.len()
        );
    }

    // ---- strings & interning ----

    pub(crate) fn intern_rc(&mut self, s: &str) -> Rc<String> {
        if let Some(rc) = self.string_pool.get(s) {
            return rc.clone();
        }
        let rc = Rc::new(s.to_string());
        self.string_pool.insert(s.to_string(), rc.clone());
        rc
    }

    // ---- allocation ----

    fn maybe_gc(&mut self, pending: &[Value]) {
        if self.config.auto_gc && self.heap.should_gc() {
            self.gc_roots.extend_from_slice(pending);
            self.run_gc();
            self.gc_roots.truncate(self.gc_roots.len() - pending.len());
        }
    }

    pub fn new_str(&mut self, s: &str) -> Value {
        self.maybe_gc(&[]);
        Value::str(self.heap.alloc(ManagedObject::Str(Text::from_str(s))))
    }

    pub fn new_str_text(&mut self, t: Text) -> Value {
        self.maybe_gc(&[]);
        Value::str(self.heap.alloc(ManagedObject::Str(t)))
    }

    pub fn new_list(&mut self, items: Vec<Value>) -> Value {
        self.maybe_gc(&items);
        Value::list(self.heap.alloc(ManagedObject::List(items)))
    }

    pub fn new_dict(&mut self) -> Value {
        self.maybe_gc(&[]);
        Value::dict(self.heap.alloc(ManagedObject::Dict(Rc::new(RtTable::new()))))
    }

    pub fn new_dict_from(&mut self, table: RtTable) -> Value {
        self.maybe_gc(&[]);
        Value::dict(self.heap.alloc(ManagedObject::Dict(Rc::new(table))))
    }

    pub fn new_bigint(&mut self, b: BigInt) -> Value {
        self.maybe_gc(&[]);
        Value::bigint(self.heap.alloc(ManagedObject::BigInt(Box::new(b))))
    }

    pub fn new_decimal(&mut self, d: Decimal) -> Value {
        self.maybe_gc(&[]);
        Value::decimal(self.heap.alloc(ManagedObject::Decimal(Box::new(d))))
    }

    pub fn new_function(&mut self, f: BuiltinFn) -> Value {
        self.maybe_gc(&[]);
        Value::function(self.heap.alloc(ManagedObject::Function(Function::Builtin(f))))
    }

    // ---- globals ----

    pub fn global_set(&mut self, name: &str, value: Value) {
        let rc = self.intern_rc(name);
        self.globals.insert(DictKey::from_rc(rc), value);
    }

    pub fn global_get(&self, name: &str) -> Option<Value> {
        self.globals.get(&DictKey::from_str(name))
    }

    /// The global-variable table itself (an ordered table: iteration yields
    /// globals in definition order).
    pub fn globals_table(&self) -> Rc<RtTable> {
        self.globals.clone()
    }

    // ---- classes & objects ----

    pub fn define_class(&mut self, name: &str) -> ObjectId {
        let id = self.heap.alloc(ManagedObject::Class(Box::new(ClassDef::new(name))));
        self.classes.insert(name.to_string(), id);
        id
    }

    pub fn class_id(&self, name: &str) -> Option<ObjectId> {
        self.classes.get(name).copied()
    }

    pub fn class_define_method(
        &mut self,
        class: ObjectId,
        name: &'static str,
        f: crate::object::MethodFn,
    ) {
        if let ManagedObject::Class(def) = self.heap.get_mut(class) {
            def.define_method(name, f);
        }
    }

    pub fn class_const_set(&mut self, class: ObjectId, name: &str, value: Value) -> Result<(), String> {
        let constants = match self.heap.get(class) {
            ManagedObject::Class(def) => def.constants.clone(),
            _ => return Err(NOT_A_CLASS.to_string()),
        };
        let rc = self.intern_rc(name);
        constants.insert(DictKey::from_rc(rc), value);
        Ok(())
    }

    pub fn class_const_get(&self, class: ObjectId, name: &str) -> Result<Option<Value>, String> {
        match self.heap.get(class) {
            ManagedObject::Class(def) => Ok(def.constants.get(&DictKey::from_str(name))),
            _ => Err(NOT_A_CLASS.to_string()),
        }
    }

    pub fn object_new(&mut self, class: ObjectId) -> Value {
        self.maybe_gc(&[]);
        Value::object(
            self.heap
                .alloc(ManagedObject::Object(Box::new(ObjectInstance::new(class)))),
        )
    }

    /// The ordered table behind a dict value (shared handle, not a copy).
    pub fn dict_table(&self, dict: Value) -> Result<Rc<RtTable>, String> {
        methods::common::expect_dict_rc(self, dict)
    }

    /// The contents of a string value.
    pub fn str_content(&self, s: Value) -> Result<String, String> {
        Ok(methods::common::expect_str(self, s)?.as_str().to_string())
    }

    /// The elements of a list value.
    pub fn list_items(&self, list: Value) -> Result<Vec<Value>, String> {
        Ok(methods::common::expect_list(self, list)?.clone())
    }

    // ---- calls & dispatch ----

    pub fn call_function(&mut self, f: Value, args: &[Value]) -> Result<Value, String> {
        let func = match methods::common::expect_function(self, f)? {
            Function::Builtin(func) => *func,
        };
        func(self, args)
    }

    /// Dispatch a method call on any receiver (builtin kinds first, class
    /// tables for user objects).
    pub fn send(&mut self, recv: Value, method: &str, args: &[Value]) -> Result<Value, String> {
        if self.shut_down {
            return Err(RUNTIME_SHUT_DOWN.to_string());
        }
        methods::dispatch(self, recv, method, args)
    }

    /// Call a global function value by name.
    pub fn invoke_global(&mut self, name: &str, args: &[Value]) -> Result<Value, String> {
        let f = self
            .global_get(name)
            .ok_or_else(|| format!("{}: {}", UNKNOWN_GLOBAL, name))?;
        self.call_function(f, args)
    }

    // ---- capabilities ----

    pub fn now_unix_secs(&self) -> i64 {
        self.caps.clock.unix_secs()
    }

    pub fn now_unix_millis(&self) -> i64 {
        self.caps.clock.unix_millis()
    }

    pub fn rand_u64(&mut self) -> u64 {
        self.caps.rng.next_u64(&mut self.rng_state)
    }

    // ---- output ----

    pub(crate) fn print_str(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    // ---- gc ----

    pub fn run_gc(&mut self) {
        let mut roots: Vec<Value> = self.globals.values().collect();
        roots.extend(self.gc_roots.iter().copied());
        roots.extend(self.classes.values().map(|id| Value::class(*id)));
        self.heap.mark_all(&roots);
        self.heap.sweep();
    }

    pub fn live_objects(&self) -> usize {
        self.heap.live_objects()
    }

    pub fn open_streams(&self) -> usize {
        self.io.len()
    }

    // ---- lifecycle ----

    pub fn add_finalizer(&mut self, f: FinalizerFn) {
        self.finalizers.push(f);
    }

    /// Teardown: run finalizers once, then close every registered stream.
    /// Idempotent; later calls report zero work.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.shut_down {
            return ShutdownReport::default();
        }
        self.shut_down = true;
        let finalizers = std::mem::take(&mut self.finalizers);
        let finalizers_run = finalizers.len();
        for f in finalizers {
            f(self);
        }
        let streams_closed = self.io.close_all();
        self.globals.clear();
        log::debug!(
            "runtime shut down: {} finalizers, {} streams closed",
            finalizers_run,
            streams_closed
        );
        ShutdownReport {
            finalizers_run,
            streams_closed,
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
