#![no_main]

use libfuzzer_sys::fuzz_target;
use lrupool::ds::{IntrusiveList, Linked, Links, ListTag, SlotArena};

#[derive(Default)]
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

// Fuzz arbitrary operation sequences on two IntrusiveLists sharing an arena
//
// Tests random sequences of push_front, pop_front, push_handle_front,
// move_to_front, remove and init, including foreign and detached handles.
fuzz_target!(|data: &[u8]| {
    let mut arena: SlotArena<Item> = SlotArena::new();
    let mut lists = [
        IntrusiveList::new(ListTag::new(0)),
        IntrusiveList::new(ListTag::new(1)),
    ];
    let mut ids = Vec::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 6;
        let arg = data[idx + 1];
        idx += 2;
        let which = usize::from(arg & 1);
        let list = &mut lists[which];

        match op {
            0 => {
                // push_front
                if ids.len() < 256 {
                    let id = list.push_front(&mut arena, Item::default());
                    ids.push(id);
                    assert_eq!(list.front(), Some(id));
                }
            },
            1 => {
                // pop_front then re-home onto the other list
                let old_len = list.len();
                if let Some(id) = list.pop_front(&mut arena) {
                    assert_eq!(list.len(), old_len - 1);
                    assert!(lists[1 - which].push_handle_front(&mut arena, id));
                }
            },
            2 => {
                // move_to_front with any handle
                if !ids.is_empty() {
                    let id = ids[usize::from(arg) % ids.len()];
                    let member = list.contains(&arena, id);
                    assert_eq!(list.move_to_front(&mut arena, id), member);
                    if member {
                        assert_eq!(list.front(), Some(id));
                    }
                }
            },
            3 => {
                // remove, then the handle must be detached
                if !ids.is_empty() {
                    let id = ids[usize::from(arg) % ids.len()];
                    if list.remove(&mut arena, id) {
                        assert!(arena.get(id).unwrap().links().is_detached());
                        assert!(list.push_handle_front(&mut arena, id));
                    }
                }
            },
            4 => {
                // push_handle_front of a linked handle must be refused
                if !ids.is_empty() {
                    let id = ids[usize::from(arg) % ids.len()];
                    let linked = !arena.get(id).unwrap().links().is_detached();
                    if linked {
                        assert!(!list.push_handle_front(&mut arena, id));
                    }
                }
            },
            5 => {
                // reset everything
                arena.clear();
                for list in lists.iter_mut() {
                    list.init();
                }
                ids.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(lists[0].len() + lists[1].len(), arena.len());
        lists[0].check_invariants(&arena).unwrap();
        lists[1].check_invariants(&arena).unwrap();
    }
});
