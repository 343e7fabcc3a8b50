use crate::builtins;
use crate::runtime::Runtime;

pub use crate::object::BuiltinFn;

pub struct BuiltinRegistry {
    entries: Vec<(String, BuiltinFn)>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, fun: BuiltinFn) {
        self.entries.push((name.to_string(), fun));
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Wrap each builtin in a function value and bind it in the global table.
    pub fn install_into(self, rt: &mut Runtime) {
        for (name, fun) in self.entries {
            let f = rt.new_function(fun);
            rt.global_set(&name, f);
        }
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub trait BuiltinProvider {
    fn install(&self, registry: &mut BuiltinRegistry);
}

pub struct StdBuiltinProvider;

impl BuiltinProvider for StdBuiltinProvider {
    fn install(&self, registry: &mut BuiltinRegistry) {
        registry.register("print", builtins::builtin_print);
        registry.register("println", builtins::builtin_print);
        registry.register("len", builtins::builtin_len);
        registry.register("type_of", builtins::builtin_type_of);
        registry.register("to_text", builtins::builtin_to_text);
        registry.register("dict", builtins::builtin_dict_new);
        registry.register("list", builtins::builtin_list_new);
        registry.register("time_unix", builtins::builtin_time_unix);
        registry.register("time_millis", builtins::builtin_time_millis);
        registry.register("rand", builtins::builtin_rand);
        registry.register("gc", builtins::builtin_gc);
        registry.register("open", builtins::builtin_open);
        registry.register("mem_stream", builtins::builtin_mem_stream);
    }
}
