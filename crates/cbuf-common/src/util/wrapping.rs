/// Moves a cursor one position forward inside `[0, len)`, going back
/// to zero after `len - 1`.
#[inline(always)]
pub const fn advance_wrapped(pos: usize, len: usize) -> usize {
    let next = pos + 1;
    if next >= len { 0 } else { next }
}
