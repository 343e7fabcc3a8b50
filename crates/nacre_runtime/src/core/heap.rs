//! Garbage collection and heap management.

use std::rc::Rc;

use nacre_core::{ObjectId, Text, Value};

use super::RtTable;
use crate::numeric::{BigInt, Decimal};
use crate::object::{ClassDef, Function, ObjectInstance};

pub enum ManagedObject {
    Str(Text),
    List(Vec<Value>),
    Dict(Rc<RtTable>),
    BigInt(Box<BigInt>),
    Decimal(Box<Decimal>),
    Object(Box<ObjectInstance>),
    Class(Box<ClassDef>),
    Function(Function),
}

impl ManagedObject {
    pub fn size(&self) -> usize {
        let base = std::mem::size_of::<ManagedObject>();
        let deep = match self {
            ManagedObject::Str(s) => s.len() + 32,
            ManagedObject::List(v) => v.capacity() * std::mem::size_of::<Value>(),
            ManagedObject::Dict(d) => {
                d.len() * 96 + d.bucket_count() * std::mem::size_of::<usize>()
            }
            ManagedObject::BigInt(b) => b.limb_count() * 8 + 32,
            ManagedObject::Decimal(_) => 32,
            ManagedObject::Object(o) => o.ivars.len() * 96 + 64,
            ManagedObject::Class(c) => c.constants.len() * 96 + c.methods.len() * 24 + 128,
            ManagedObject::Function(_) => 64,
        };
        base + deep
    }
}

pub struct Heap {
    pub(crate) objects: Vec<Option<ManagedObject>>,
    free_list: Vec<usize>,
    marks: Vec<u64>,
    pub(crate) alloc_count: usize,
    pub(crate) gc_threshold: usize,
    pub(crate) alloc_bytes: usize,
    pub(crate) gc_threshold_bytes: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            objects: Vec::with_capacity(1024),
            free_list: Vec::new(),
            marks: Vec::new(),
            alloc_count: 0,
            gc_threshold: 100000,
            alloc_bytes: 0,
            gc_threshold_bytes: 32 * 1024 * 1024,
        }
    }

    /// Allocate a managed object on the heap.
    pub fn alloc(&mut self, obj: ManagedObject) -> ObjectId {
        self.alloc_count += 1;
        self.alloc_bytes += obj.size();

        if let Some(id) = self.free_list.pop() {
            self.objects[id] = Some(obj);
            ObjectId(id)
        } else {
            let id = self.objects.len();
            self.objects.push(Some(obj));
            ObjectId(id)
        }
    }

    #[inline]
    pub fn should_gc(&self) -> bool {
        self.alloc_count >= self.gc_threshold || self.alloc_bytes >= self.gc_threshold_bytes
    }

    pub fn get(&self, id: ObjectId) -> &ManagedObject {
        self.objects[id.0]
            .as_ref()
            .expect("Object was garbage collected")
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut ManagedObject {
        self.objects[id.0]
            .as_mut()
            .expect("Object was garbage collected")
    }

    pub fn is_marked(&self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        self.marks
            .get(word)
            .is_some_and(|w| (w & (1 << bit)) != 0)
    }

    fn set_mark(&mut self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        if word >= self.marks.len() {
            self.marks.resize(word + 1, 0);
        }
        let w = &mut self.marks[word];
        let mask = 1 << bit;
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        true
    }

    /// Mark all objects reachable from the given roots.
    pub(crate) fn mark_all(&mut self, roots: &[Value]) {
        self.marks.clear();

        let mut pending: Vec<Value> = roots.to_vec();
        while let Some(val) = pending.pop() {
            if !val.is_obj() {
                continue;
            }
            // Streams carry a registry descriptor, not a heap id.
            if val.get_tag() == nacre_core::value::TAG_STREAM {
                continue;
            }
            let id = val.as_obj_id();
            if id.0 >= self.objects.len() || self.objects[id.0].is_none() {
                continue;
            }
            if !self.set_mark(id) {
                continue;
            }
            if let Some(obj) = &self.objects[id.0] {
                match obj {
                    ManagedObject::List(items) => pending.extend(items.iter().copied()),
                    ManagedObject::Dict(dict) => pending.extend(dict.values()),
                    ManagedObject::Object(inst) => {
                        pending.push(Value::class(inst.class));
                        pending.extend(inst.ivars.values());
                    }
                    ManagedObject::Class(class) => pending.extend(class.constants.values()),
                    ManagedObject::Str(_)
                    | ManagedObject::BigInt(_)
                    | ManagedObject::Decimal(_)
                    | ManagedObject::Function(_) => {}
                }
            }
        }
    }

    /// Sweep unreachable objects and update thresholds.
    pub(crate) fn sweep(&mut self) {
        let mut live_bytes = 0;
        let mut live_count = 0;

        self.free_list.clear();

        for i in 0..self.objects.len() {
            if let Some(obj) = &self.objects[i] {
                if !self.is_marked(ObjectId(i)) {
                    self.objects[i] = None;
                    self.free_list.push(i);
                } else {
                    live_bytes += obj.size();
                    live_count += 1;
                }
            } else {
                self.free_list.push(i);
            }
        }

        // Truncate trailing empty slots to reduce memory usage
        while self.objects.last().is_some_and(|o| o.is_none()) {
            self.objects.pop();
        }
        let new_len = self.objects.len();
        self.free_list.retain(|&i| i < new_len);

        self.marks.clear();
        self.alloc_count = 0;
        self.alloc_bytes = live_bytes;

        // Grow fast while small, slower once large to bound pause times.
        let growth_factor = if live_bytes > 10 * 1024 * 1024 { 1.5 } else { 2.0 };
        self.gc_threshold = ((live_count as f64 * growth_factor) as usize).max(32768);
        self.gc_threshold_bytes = ((live_bytes as f64 * growth_factor) as usize).max(1024 * 1024);

        log::debug!("gc sweep: {} live objects, {} bytes", live_count, live_bytes);
    }

    pub fn live_objects(&self) -> usize {
        self.objects.iter().filter(|o| o.is_some()).count()
    }
}
