//! Lexical scope resolution over static links.
//!
//! Every activation record stores, in its base cell, the base of the frame
//! that lexically encloses it. Following that chain `l` times reaches the
//! frame `l` levels up. The global scope is not a frame: a chain ends when it
//! reaches `GP`.

/// Why a static-link walk failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    /// Tried to read a link outside the address space.
    OutOfBounds { address: i32 },
    /// A link did not point at an enclosing frame or at `GP`.
    MalformedLink { address: i32, link: i32 },
}

fn read(pas: &[i32], address: i32) -> Result<i32, ScopeError> {
    usize::try_from(address)
        .ok()
        .and_then(|idx| pas.get(idx).copied())
        .ok_or(ScopeError::OutOfBounds { address })
}

/// Follow the static-link chain `l` times starting from `bp`.
///
/// `l <= 0` returns `bp` unchanged. Links are trusted; only reads outside
/// the address space fail.
pub fn base(pas: &[i32], bp: i32, l: i32) -> Result<i32, ScopeError> {
    let mut arb = bp;
    for _ in 0..l.max(0) {
        arb = read(pas, arb)?;
    }
    Ok(arb)
}

/// Like [`base`], but every hop must move strictly upward to an enclosing
/// frame below `pas.len()`, or land exactly on `gp`. Walking further from
/// `gp` is an error since the global scope has no static link.
pub fn base_checked(pas: &[i32], bp: i32, l: i32, gp: i32) -> Result<i32, ScopeError> {
    let capacity = i32::try_from(pas.len()).unwrap_or(i32::MAX);
    let mut arb = bp;
    for _ in 0..l.max(0) {
        if arb == gp {
            return Err(ScopeError::MalformedLink {
                address: arb,
                link: read(pas, arb)?,
            });
        }
        let link = read(pas, arb)?;
        if link != gp && !(link > arb && link < capacity) {
            return Err(ScopeError::MalformedLink { address: arb, link });
        }
        arb = link;
    }
    Ok(arb)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Address space of 20 cells, GP = 6, frames at 19 (parent GP),
    /// 15 (parent 19) and 11 (parent 15).
    fn nested() -> Vec<i32> {
        let mut pas = vec![0; 20];
        pas[19] = 6;
        pas[15] = 19;
        pas[11] = 15;
        pas
    }

    #[test]
    fn level_zero_is_identity() {
        assert_eq!(base(&nested(), 11, 0), Ok(11));
        assert_eq!(base_checked(&nested(), 11, 0, 6), Ok(11));
    }

    #[test]
    fn walks_static_chain() {
        let pas = nested();
        assert_eq!(base(&pas, 11, 1), Ok(15));
        assert_eq!(base(&pas, 11, 2), Ok(19));
        assert_eq!(base(&pas, 11, 3), Ok(6));
        assert_eq!(base_checked(&pas, 11, 3, 6), Ok(6));
    }

    #[test]
    fn unchecked_walk_keeps_going_past_gp() {
        // Cell 6 holds whatever global lives there; the raw walk follows it.
        assert_eq!(base(&nested(), 11, 4), Ok(0));
    }

    #[test]
    fn checked_walk_stops_at_global_scope() {
        assert_eq!(
            base_checked(&nested(), 11, 4, 6),
            Err(ScopeError::MalformedLink { address: 6, link: 0 })
        );
    }

    #[test]
    fn checked_walk_rejects_downward_link() {
        let mut pas = nested();
        pas[15] = 12;
        assert_eq!(
            base_checked(&pas, 11, 2, 6),
            Err(ScopeError::MalformedLink { address: 15, link: 12 })
        );
    }

    #[test]
    fn out_of_range_read() {
        let mut pas = nested();
        pas[11] = 400;
        assert_eq!(
            base(&pas, 11, 2),
            Err(ScopeError::OutOfBounds { address: 400 })
        );
    }
}
