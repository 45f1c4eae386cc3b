// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

/// Drawn between the digits of a number reveal. Whitespace draws nothing.
pub const SPACER: char = ' ';

/// Glyphs waiting to be drawn in one column, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphQueue {
    pending: VecDeque<char>,
}

impl GlyphQueue {
    pub fn enqueue<I>(&mut self, glyphs: I)
    where
        I: IntoIterator<Item = char>,
    {
        self.pending.extend(glyphs);
    }

    /// Pops the next pending glyph, or asks `fallback` when nothing is queued.
    pub fn dequeue_or_else<F>(&mut self, fallback: F) -> char
    where
        F: FnOnce() -> char,
    {
        match self.pending.pop_front() {
            Some(ch) => ch,
            None => fallback(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// `icon`, then a spacer before every decimal digit of `count`, then a
/// closing spacer.
pub fn number_reveal(icon: char, count: u64) -> Vec<char> {
    let digits = count.to_string();
    let mut out = Vec::with_capacity(digits.len() * 2 + 2);
    out.push(icon);
    for d in digits.chars() {
        out.push(SPACER);
        out.push(d);
    }
    out.push(SPACER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeues_in_order_then_falls_back() {
        let mut q = GlyphQueue::default();
        q.enqueue(['a', 'b']);
        q.enqueue(['c']);

        let mut got = Vec::new();
        for _ in 0..5 {
            got.push(q.dequeue_or_else(|| '#'));
        }
        assert_eq!(got, vec!['a', 'b', 'c', '#', '#']);
    }

    #[test]
    fn fallback_not_called_while_pending() {
        let mut q = GlyphQueue::default();
        q.enqueue(['x']);
        let ch = q.dequeue_or_else(|| panic!("fallback called with a pending glyph"));
        assert_eq!(ch, 'x');
        assert!(q.is_empty());
    }

    #[test]
    fn reveal_digits_reconstruct_count() {
        let seq = number_reveal('X', 12345);
        assert_eq!(seq.first(), Some(&'X'));
        assert_eq!(seq.last(), Some(&SPACER));
        let digits: String = seq[1..].iter().filter(|c| **c != SPACER).collect();
        assert_eq!(digits, "12345");
        assert_eq!(seq.len(), 1 + 5 * 2 + 1);
    }

    #[test]
    fn reveal_of_zero_has_single_digit() {
        assert_eq!(number_reveal('X', 0), vec!['X', SPACER, '0', SPACER]);
    }
}
