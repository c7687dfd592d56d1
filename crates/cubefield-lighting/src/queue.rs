use std::fmt;

/// Slots allocated on the first push.
pub const LIGHT_QUEUE_INITIAL_CAPACITY: usize = 1024;
/// Hard ceiling; a 16^3 chunk can enqueue at most 15 * 4096 nodes per relight.
pub const LIGHT_QUEUE_CAPACITY: usize = 65536;

/// A propagation work item in world-space coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightNode {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub light: u8,
}

impl LightNode {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32, light: u8) -> Self {
        Self { x, y, z, light }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightQueueFull {
    pub capacity: usize,
}

impl fmt::Display for LightQueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "light queue full at {} nodes", self.capacity)
    }
}

impl std::error::Error for LightQueueFull {}

/// Power-of-two ring buffer of light nodes.
///
/// Storage is allocated lazily and doubles when full until it reaches
/// [`LIGHT_QUEUE_CAPACITY`]; past that, pushes fail instead of overwriting.
/// One slot is always kept free so `head == tail` means empty.
#[derive(Clone, Debug)]
pub struct LightQueue {
    data: Vec<LightNode>,
    head: usize,
    tail: usize,
    max_capacity: usize,
}

impl Default for LightQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LightQueue {
    pub fn new() -> Self {
        Self::with_max_capacity(LIGHT_QUEUE_CAPACITY)
    }

    /// Queue that never grows past `max_capacity` slots (rounded up to a power of two).
    pub fn with_max_capacity(max_capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            head: 0,
            tail: 0,
            max_capacity: max_capacity.max(2).next_power_of_two(),
        }
    }

    #[inline]
    fn mask(&self) -> usize {
        self.data.len().wrapping_sub(1)
    }

    /// Allocated slots (0 until the first push).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.tail.wrapping_sub(self.head) & self.mask()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// True when the next push would fail.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.max_capacity && self.len() + 1 == self.data.len()
    }

    pub fn push(&mut self, node: LightNode) -> Result<(), LightQueueFull> {
        if self.data.is_empty() || self.len() + 1 == self.data.len() {
            self.grow()?;
        }
        self.data[self.tail] = node;
        self.tail = (self.tail + 1) & self.mask();
        Ok(())
    }

    pub fn pop(&mut self) -> Option<LightNode> {
        if self.is_empty() {
            return None;
        }
        let node = self.data[self.head];
        self.head = (self.head + 1) & self.mask();
        Some(node)
    }

    /// Drops all queued nodes, keeping storage.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Moves every node of `other` onto the back of `self`, preserving order.
    /// Nodes that do not fit stay in `other`.
    pub fn append(&mut self, other: &mut LightQueue) -> Result<(), LightQueueFull> {
        while let Some(node) = other.peek() {
            self.push(node)?;
            other.pop();
        }
        Ok(())
    }

    #[inline]
    fn peek(&self) -> Option<LightNode> {
        if self.is_empty() {
            None
        } else {
            Some(self.data[self.head])
        }
    }

    fn grow(&mut self) -> Result<(), LightQueueFull> {
        let old_cap = self.data.len();
        if old_cap >= self.max_capacity {
            return Err(LightQueueFull { capacity: old_cap });
        }
        let new_cap = if old_cap == 0 {
            LIGHT_QUEUE_INITIAL_CAPACITY.min(self.max_capacity)
        } else {
            old_cap * 2
        };
        let mut data = Vec::with_capacity(new_cap);
        while let Some(node) = self.pop() {
            data.push(node);
        }
        let len = data.len();
        data.resize(new_cap, LightNode::default());
        self.data = data;
        self.head = 0;
        self.tail = len;
        Ok(())
    }
}
