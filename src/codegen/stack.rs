use crate::ir::Value;
use std::collections::HashMap;

pub const SLOT_SIZE: i64 = 8;

/// Key for a stack slot: a temporary or a named local.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum Home {
    Temp(u32),
    Var(String),
}

impl Home {
    pub fn of(value: &Value) -> Option<Home> {
        match value {
            Value::Temp(t) => Some(Home::Temp(*t)),
            Value::Var(name) => Some(Home::Var(name.clone())),
            Value::Const(_) => None,
        }
    }
}

/// Assigns each operand a positive byte offset below `%rbp`, first come
/// first served. Offsets are memoized, so re-storing to a name reuses its
/// slot.
pub struct StackAllocator {
    offset: i64,
    map: HashMap<Home, i64>,
}

impl StackAllocator {
    pub fn new() -> Self {
        Self {
            offset: 0,
            map: HashMap::new(),
        }
    }

    pub fn get(&self, home: &Home) -> Option<i64> {
        self.map.get(home).copied()
    }

    pub fn slot_of(&self, value: &Value) -> Option<i64> {
        Home::of(value).and_then(|home| self.get(&home))
    }

    pub fn allocate(&mut self, home: Home) -> i64 {
        self.allocate_sized(home, SLOT_SIZE)
    }

    /// Reserves `size` bytes rounded up to a whole slot.
    pub fn allocate_sized(&mut self, home: Home, size: i64) -> i64 {
        if let Some(offset) = self.map.get(&home) {
            return *offset;
        }
        let size = size.max(SLOT_SIZE);
        let size = (size + SLOT_SIZE - 1) / SLOT_SIZE * SLOT_SIZE;
        self.offset += size;
        self.map.insert(home, self.offset);
        self.offset
    }

    pub fn used_bytes(&self) -> i64 {
        self.offset
    }
}
