use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

const WORD_BITS: usize = u64::BITS as usize;

/// Growable bitmap, bit `i` stored at `words[i / 64] & (1 << (i % 64))`.
///
/// Trailing zero words carry no meaning: equality and hashing ignore them, so two bitmaps that
/// grew to different lengths still compare equal when they hold the same bits.
#[derive(Clone, Default)]
pub struct Bits {
	words: Vec<u64>,
}

impl Bits {
	/// Creates a bitmap able to hold `bits` positions without reallocating.
	pub fn with_capacity(bits: usize) -> Self {
		Self {
			words: vec![0; bits.div_ceil(WORD_BITS)],
		}
	}

	#[inline]
	pub fn get(&self, pos: usize) -> bool {
		self.words
			.get(pos / WORD_BITS)
			.is_some_and(|w| w & (1u64 << (pos % WORD_BITS)) != 0)
	}

	/// Sets `pos`, growing as needed. Returns whether the bit changed.
	#[inline]
	pub(crate) fn set(&mut self, pos: usize) -> bool {
		let word = pos / WORD_BITS;
		if word >= self.words.len() {
			self.words.resize(word + 1, 0);
		}
		let mask = 1u64 << (pos % WORD_BITS);
		let was_clear = self.words[word] & mask == 0;
		self.words[word] |= mask;
		was_clear
	}

	/// Clears `pos`. Returns whether the bit changed.
	#[inline]
	pub(crate) fn unset(&mut self, pos: usize) -> bool {
		let Some(word) = self.words.get_mut(pos / WORD_BITS) else {
			return false;
		};
		let mask = 1u64 << (pos % WORD_BITS);
		let was_set = *word & mask != 0;
		*word &= !mask;
		was_set
	}

	pub(crate) fn clear(&mut self) {
		self.words.fill(0);
	}

	/// Number of set bits.
	pub fn count(&self) -> usize {
		self.words.iter().map(|w| w.count_ones() as usize).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.words.iter().all(|&w| w == 0)
	}

	/// Position of the first set bit at or after `from`.
	pub fn next_set_bit(&self, from: usize) -> Option<usize> {
		let mut word_idx = from / WORD_BITS;
		let first = self.words.get(word_idx)?;
		let mut word = first & (u64::MAX << (from % WORD_BITS));
		loop {
			if word != 0 {
				return Some(word_idx * WORD_BITS + word.trailing_zeros() as usize);
			}
			word_idx += 1;
			word = *self.words.get(word_idx)?;
		}
	}

	/// True when every bit set in `self` is also set in `other`.
	///
	/// Equivalent to `(self AND NOT other).is_empty()` without materializing the difference.
	pub fn is_subset_of(&self, other: &Bits) -> bool {
		self.words.iter().enumerate().all(|(i, &w)| {
			let theirs = other.words.get(i).copied().unwrap_or(0);
			w & !theirs == 0
		})
	}

	/// Hash of the significant words, identical for equal bitmaps.
	pub fn fingerprint(&self) -> u64 {
		let mut hasher = FxHasher::default();
		self.significant().hash(&mut hasher);
		hasher.finish()
	}

	fn significant(&self) -> &[u64] {
		let len = self.words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
		&self.words[..len]
	}
}

impl PartialEq for Bits {
	fn eq(&self, other: &Self) -> bool {
		self.significant() == other.significant()
	}
}

impl Eq for Bits {}

impl Hash for Bits {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.fingerprint());
	}
}

impl std::fmt::Debug for Bits {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut ones = Vec::new();
		let mut next = self.next_set_bit(0);
		while let Some(pos) = next {
			ones.push(pos);
			next = self.next_set_bit(pos + 1);
		}
		f.debug_tuple("Bits").field(&ones).finish()
	}
}
