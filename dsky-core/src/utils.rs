use heapless::String;

///
/// `pad_field` converts a keyed-in or computed value into a fixed width
/// display field. Short values are left padded with `0` and long values keep
/// their right-most characters, the same way the display drops the digits
/// that scroll off its left edge.
///
/// # Arguments
///
///  - `value` - ASCII characters to place into the field.
///
/// # Results
///
///  - `String<N>` holding exactly `N` characters.
///
pub fn pad_field<const N: usize>(value: &str) -> String<N> {
    let len = value.chars().count();
    let mut out: String<N> = String::new();
    for _ in len..N {
        let _ = out.push('0');
    }
    for c in value.chars().skip(len.saturating_sub(N)) {
        let _ = out.push(c);
    }
    out
}

///
/// `push_window` appends `c` to `buf` and keeps only the last `width`
/// characters. The buffer is always ASCII, so byte length equals the number
/// of characters.
///
pub fn push_window<const N: usize>(buf: &String<N>, c: char, width: usize) -> String<N> {
    let width = width.min(N);
    let skip = (buf.len() + 1).saturating_sub(width);

    let mut out: String<N> = String::new();
    for ch in buf.chars().chain(core::iter::once(c)).skip(skip) {
        let _ = out.push(ch);
    }
    out
}

/// Copies `value` into a bounded string, dropping whatever does not fit.
pub fn truncate<const N: usize>(value: &str) -> String<N> {
    let mut out: String<N> = String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
