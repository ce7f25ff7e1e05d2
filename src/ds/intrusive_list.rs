//! Intrusive doubly linked list over an external `SlotArena`.
//!
//! The list owns only its head, tail, and length. Nodes live in a
//! [`SlotArena`] that the caller owns, and carry their own [`Links`]. Several
//! lists can therefore share one arena, with a handle (`SlotId`) moving between
//! them in O(1) and without touching the allocator.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node>)                       lists over the arena
//!   ┌────────┬───────────────────────────────┐
//!   │ SlotId │ links { prev, next, owner }   │     evict: head ─► [0] ◄──► [2] ◄── tail
//!   ├────────┼───────────────────────────────┤
//!   │ id_0   │ { None,    Some(2), EVICT }   │     pool:  head ─► [1] ◄──► [3] ◄── tail
//!   │ id_1   │ { None,    Some(3), POOL  }   │
//!   │ id_2   │ { Some(0), None,    EVICT }   │
//!   │ id_3   │ { Some(1), None,    POOL  }   │
//!   └────────┴───────────────────────────────┘
//! ```
//!
//! ## Membership guard
//!
//! Every list carries a [`ListTag`]. Linking a node stamps the tag into its
//! `owner` field and unlinking clears it. Operations that take a handle refuse
//! (and return `false`) when the handle is missing from the arena, belongs to
//! another list, or is already detached, so a stray handle can never corrupt
//! the ring.
//!
//! ## Performance
//! - `push_front` / `push_handle_front` / `pop_front`: O(1)
//! - `remove` / `move_to_front`: O(1)
//! - `front` / `back` / `len`: O(1)
//! - `iter` / `iter_back`: O(n)

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

/// Identifies which list a node is currently linked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListTag(u8);

impl ListTag {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }
}

/// Per-node linkage. Embedded in every node stored in the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    owner: Option<ListTag>,
}

impl Links {
    /// Tag of the list this node is linked into, or `None` if detached.
    pub fn owner(&self) -> Option<ListTag> {
        self.owner
    }

    pub fn is_detached(&self) -> bool {
        self.owner.is_none()
    }
}

/// Arena element that can be threaded onto an [`IntrusiveList`].
pub trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// Doubly linked list of `SlotId`s whose nodes live in a caller-owned arena.
#[derive(Debug)]
pub struct IntrusiveList {
    tag: ListTag,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl IntrusiveList {
    /// Creates an empty list that stamps `tag` on its members.
    pub fn new(tag: ListTag) -> Self {
        Self {
            tag,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn tag(&self) -> ListTag {
        self.tag
    }

    /// Resets to an empty list.
    ///
    /// Nodes that were linked keep their stale links; the caller is expected to
    /// discard or rebuild them (see `TtlLruCache::purge`).
    pub fn init(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle at the front, or `None` when empty.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Handle at the back, or `None` when empty.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns `true` if `id` is currently linked into this list.
    pub fn contains<T: Linked>(&self, arena: &SlotArena<T>, id: SlotId) -> bool {
        arena
            .get(id)
            .is_some_and(|node| node.links().owner == Some(self.tag))
    }

    /// Allocates `value` in the arena and links it at the front.
    pub fn push_front<T: Linked>(&mut self, arena: &mut SlotArena<T>, mut value: T) -> SlotId {
        *value.links_mut() = Links::default();
        let id = arena.insert(value);
        self.attach_front(arena, id);
        id
    }

    /// Re-links an existing, detached node at the front.
    ///
    /// Returns `false` (and leaves everything untouched) if `id` is not in the
    /// arena or is still linked into some list.
    pub fn push_handle_front<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        match arena.get(id) {
            Some(node) if node.links().is_detached() => {
                self.attach_front(arena, id);
                true
            },
            _ => false,
        }
    }

    /// Detaches and returns the front handle. The node stays in the arena.
    pub fn pop_front<T: Linked>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let id = self.head?;
        self.detach(arena, id);
        Some(id)
    }

    /// Detaches `id` from this list. The node stays in the arena.
    ///
    /// Returns `false` if `id` is not a member of this list.
    pub fn remove<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        if !self.contains(arena, id) {
            return false;
        }
        self.detach(arena, id);
        true
    }

    /// Moves a member to the front; returns `false` if `id` is not a member.
    pub fn move_to_front<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        if !self.contains(arena, id) {
            return false;
        }
        if Some(id) == self.head {
            return true;
        }
        self.detach(arena, id);
        self.attach_front(arena, id);
        true
    }

    /// Iterates `(SlotId, &T)` from front to back.
    pub fn iter<'a, T: Linked>(&self, arena: &'a SlotArena<T>) -> ListIter<'a, T> {
        ListIter {
            arena,
            current: self.head,
            remaining: self.len,
            forward: true,
        }
    }

    /// Iterates `(SlotId, &T)` from back to front.
    pub fn iter_back<'a, T: Linked>(&self, arena: &'a SlotArena<T>) -> ListIter<'a, T> {
        ListIter {
            arena,
            current: self.tail,
            remaining: self.len,
            forward: false,
        }
    }

    /// Walks the ring and verifies links, ownership and the length counter.
    pub fn check_invariants<T: Linked>(&self, arena: &SlotArena<T>) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || self.len != 0 {
                return Err(InvariantError::new(format!(
                    "list {:?}: empty ring with head={:?} tail={:?} len={}",
                    self.tag, self.head, self.tail, self.len
                )));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = arena.get(id).ok_or_else(|| {
                InvariantError::new(format!("list {:?}: {:?} missing from arena", self.tag, id))
            })?;
            let links = node.links();
            if links.owner != Some(self.tag) {
                return Err(InvariantError::new(format!(
                    "list {:?}: {:?} owned by {:?}",
                    self.tag, id, links.owner
                )));
            }
            if links.prev != prev {
                return Err(InvariantError::new(format!(
                    "list {:?}: {:?} has prev {:?}, expected {:?}",
                    self.tag, id, links.prev, prev
                )));
            }
            count += 1;
            if count > self.len {
                return Err(InvariantError::new(format!(
                    "list {:?}: ring longer than len {}",
                    self.tag, self.len
                )));
            }
            prev = Some(id);
            current = links.next;
        }

        if prev != self.tail {
            return Err(InvariantError::new(format!(
                "list {:?}: walk ended at {:?}, tail is {:?}",
                self.tag, prev, self.tail
            )));
        }
        if count != self.len {
            return Err(InvariantError::new(format!(
                "list {:?}: walked {} nodes, len is {}",
                self.tag, count, self.len
            )));
        }
        Ok(())
    }

    fn detach<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let (prev, next) = match arena.get(id) {
            Some(node) => (node.links().prev, node.links().next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = arena.get_mut(prev_id) {
                    prev_node.links_mut().next = next;
                }
            },
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = arena.get_mut(next_id) {
                    next_node.links_mut().prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(node) = arena.get_mut(id) {
            *node.links_mut() = Links::default();
        }
        self.len -= 1;
    }

    fn attach_front<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let old_head = self.head;
        match arena.get_mut(id) {
            Some(node) => {
                *node.links_mut() = Links {
                    prev: None,
                    next: old_head,
                    owner: Some(self.tag),
                };
            },
            None => return,
        }
        match old_head {
            Some(old_head) => {
                if let Some(head_node) = arena.get_mut(old_head) {
                    head_node.links_mut().prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }
}

/// Iterator over `(SlotId, &T)` in either direction.
pub struct ListIter<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
    remaining: usize,
    forward: bool,
}

impl<'a, T: Linked> Iterator for ListIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.current?;
        let node = self.arena.get(id)?;
        self.current = if self.forward {
            node.links().next
        } else {
            node.links().prev
        };
        self.remaining -= 1;
        Some((id, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ListTag = ListTag::new(0);
    const B: ListTag = ListTag::new(1);

    #[derive(Debug, Default)]
    struct Item {
        value: u32,
        links: Links,
    }

    impl Linked for Item {
        fn links(&self) -> &Links {
            &self.links
        }

        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    fn item(value: u32) -> Item {
        Item {
            value,
            links: Links::default(),
        }
    }

    fn values(list: &IntrusiveList, arena: &SlotArena<Item>) -> Vec<u32> {
        list.iter(arena).map(|(_, node)| node.value).collect()
    }

    #[test]
    fn intrusive_list_basic_ops() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new(A);
        let a = list.push_front(&mut arena, item(1));
        let b = list.push_front(&mut arena, item(2));
        let c = list.push_front(&mut arena, item(3));

        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(c));
        assert_eq!(list.back(), Some(a));
        assert_eq!(values(&list, &arena), vec![3, 2, 1]);

        assert!(list.move_to_front(&mut arena, a));
        assert_eq!(values(&list, &arena), vec![1, 3, 2]);

        assert!(list.remove(&mut arena, b));
        assert_eq!(list.len(), 2);
        assert!(!list.contains(&arena, b));
        assert!(arena.contains(b));
        list.check_invariants(&arena).unwrap();
    }

    #[test]
    fn intrusive_list_peek_on_empty_is_none() {
        let mut arena: SlotArena<Item> = SlotArena::new();
        let mut list = IntrusiveList::new(A);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_front(&mut arena), None);
        list.check_invariants(&arena).unwrap();
    }

    #[test]
    fn intrusive_list_move_to_front_edges() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new(A);
        let a = list.push_front(&mut arena, item(1));
        let b = list.push_front(&mut arena, item(2));
        let c = list.push_front(&mut arena, item(3));

        assert!(list.move_to_front(&mut arena, c));
        assert_eq!(values(&list, &arena), vec![3, 2, 1]);

        assert!(list.move_to_front(&mut arena, b));
        assert_eq!(values(&list, &arena), vec![2, 3, 1]);
        assert_eq!(list.back(), Some(a));

        assert!(list.move_to_front(&mut arena, a));
        assert_eq!(values(&list, &arena), vec![1, 2, 3]);
        assert_eq!(list.back(), Some(c));
        list.check_invariants(&arena).unwrap();
    }

    #[test]
    fn handles_transfer_between_lists_sharing_an_arena() {
        let mut arena = SlotArena::new();
        let mut pool = IntrusiveList::new(A);
        let mut live = IntrusiveList::new(B);
        for _ in 0..3 {
            pool.push_front(&mut arena, item(0));
        }

        let id = pool.pop_front(&mut arena).unwrap();
        assert!(arena.get(id).unwrap().links().is_detached());
        arena.get_mut(id).unwrap().value = 9;
        assert!(live.push_handle_front(&mut arena, id));

        assert_eq!(pool.len(), 2);
        assert_eq!(live.len(), 1);
        assert_eq!(arena.len(), 3);
        assert!(live.contains(&arena, id));
        assert!(!pool.contains(&arena, id));
        assert_eq!(arena.get(id).unwrap().links().owner(), Some(B));

        assert!(live.remove(&mut arena, id));
        assert!(pool.push_handle_front(&mut arena, id));
        assert_eq!(pool.len(), 3);
        assert!(live.is_empty());
        pool.check_invariants(&arena).unwrap();
        live.check_invariants(&arena).unwrap();
    }

    #[test]
    fn foreign_and_detached_handles_are_refused() {
        let mut arena = SlotArena::new();
        let mut a = IntrusiveList::new(A);
        let mut b = IntrusiveList::new(B);
        let x = a.push_front(&mut arena, item(1));
        let y = b.push_front(&mut arena, item(2));

        assert!(!a.remove(&mut arena, y));
        assert!(!a.move_to_front(&mut arena, y));
        assert!(!a.push_handle_front(&mut arena, y));
        assert_eq!(b.len(), 1);

        assert!(a.remove(&mut arena, x));
        assert!(!a.remove(&mut arena, x));
        assert!(!a.move_to_front(&mut arena, x));
        assert!(a.is_empty());

        assert!(!a.push_handle_front(&mut arena, SlotId(99)));
        a.check_invariants(&arena).unwrap();
        b.check_invariants(&arena).unwrap();
    }

    #[test]
    fn iter_back_walks_tail_to_head() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new(A);
        for v in 1..=4 {
            list.push_front(&mut arena, item(v));
        }
        let back: Vec<_> = list.iter_back(&arena).map(|(_, n)| n.value).collect();
        assert_eq!(back, vec![1, 2, 3, 4]);
    }

    #[test]
    fn init_forgets_members() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new(A);
        list.push_front(&mut arena, item(1));
        list.push_front(&mut arena, item(2));
        list.init();
        assert_eq!(list.len(), 0);
        assert_eq!(list.front(), None);
        assert_eq!(list.iter(&arena).count(), 0);
    }

    #[test]
    fn check_invariants_reports_foreign_member() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new(A);
        let id = list.push_front(&mut arena, item(1));
        arena.get_mut(id).unwrap().links_mut().owner = Some(B);
        let err = list.check_invariants(&arena).unwrap_err();
        assert!(err.message().contains("owned by"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default)]
    struct Item {
        links: Links,
    }

    impl Linked for Item {
        fn links(&self) -> &Links {
            &self.links
        }

        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Transfer(bool),
        Promote(usize),
        Remove(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Transfer),
            (0usize..64).prop_map(Op::Promote),
            (0usize..64).prop_map(Op::Remove),
        ]
    }

    proptest! {
        /// Node count is conserved while handles shuttle between two lists.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_two_lists_conserve_nodes(
            nodes in 1usize..32,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let mut arena = SlotArena::new();
            let mut pool = IntrusiveList::new(ListTag::new(0));
            let mut live = IntrusiveList::new(ListTag::new(1));
            let ids: Vec<_> = (0..nodes)
                .map(|_| pool.push_front(&mut arena, Item::default()))
                .collect();

            for op in ops {
                match op {
                    Op::Transfer(to_live) => {
                        let (from, to) = if to_live {
                            (&mut pool, &mut live)
                        } else {
                            (&mut live, &mut pool)
                        };
                        if let Some(id) = from.pop_front(&mut arena) {
                            prop_assert!(to.push_handle_front(&mut arena, id));
                        }
                    },
                    Op::Promote(i) => {
                        let id = ids[i % ids.len()];
                        let expected = live.contains(&arena, id);
                        prop_assert_eq!(live.move_to_front(&mut arena, id), expected);
                        if expected {
                            prop_assert_eq!(live.front(), Some(id));
                        }
                    },
                    Op::Remove(i) => {
                        let id = ids[i % ids.len()];
                        if live.remove(&mut arena, id) {
                            prop_assert!(pool.push_handle_front(&mut arena, id));
                        }
                    },
                }
                prop_assert_eq!(pool.len() + live.len(), nodes);
                prop_assert!(pool.check_invariants(&arena).is_ok());
                prop_assert!(live.check_invariants(&arena).is_ok());
            }
        }
    }
}
