/// A simplified and const generic version of arrayref
#[inline]
pub(crate) fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    if data.len() < N {
        return None;
    }

    let (head, rest) = data.split_at(N);
    let mut out = [0u8; N];
    out.copy_from_slice(head);
    Some((out, rest))
}

/// Lowercase hex rendering used in diagnostics
pub(crate) fn hex(data: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(data.len() * 2);
    for b in data {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
