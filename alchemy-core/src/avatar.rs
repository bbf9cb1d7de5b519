/// Index of the default image for a player without an account.
///
/// The decimal character codes of `name` are concatenated into one big number
/// and reduced modulo `size`. The reduction runs digit by digit so arbitrarily
/// long names never overflow.
pub fn default_image_index(name: &str, size: usize) -> Option<usize> {
    if size == 0 {
        return None;
    }
    let size = size as u64;
    let mut hash = 0u64;
    for code in name.chars().map(u32::from) {
        for digit in code.to_string().bytes() {
            hash = (hash * 10 + u64::from(digit - b'0')) % size;
        }
    }
    Some(hash as usize)
}

/// Picks the default image out of `images`, which must be in a stable order.
pub fn default_image<'a>(name: &str, images: &'a [String]) -> Option<&'a str> {
    default_image_index(name, images.len()).map(|index| images[index].as_str())
}
