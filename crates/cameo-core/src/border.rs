//! Out-of-bounds pixel addressing for neighbourhood operations.

/// How a neighbourhood read past the image edge is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// `aaa|abcd|ddd`
    Replicate,
    /// `dcb|abcd|cba`
    Reflect101,
}

/// Map a possibly out-of-range coordinate onto `0..len`.
///
/// `len` must be non-zero.
pub fn map_index(i: isize, len: usize, mode: BorderMode) -> usize {
    debug_assert!(len > 0);
    match mode {
        BorderMode::Replicate => i.clamp(0, len as isize - 1) as usize,
        BorderMode::Reflect101 => {
            if len == 1 {
                return 0;
            }
            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len { r } else { (2 * len - 2) - r }
        }
    }
}
