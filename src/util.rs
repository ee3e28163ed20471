use rand::Rng;

/// Lowercase, strip everything but word characters, collapse separators to '-'
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_sep = true;
        }
        // anything else is dropped without acting as a separator
    }

    slug
}

/// Slugify `title`, appending -1, -2, ... until it does not collide
pub fn unique_slug(title: &str, existing: &[String]) -> String {
    let base = slugify(title);
    let mut slug = base.clone();
    let mut counter = 1;

    while existing.iter().any(|s| *s == slug) {
        slug = format!("{base}-{counter}");
        counter += 1;
    }

    slug
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

/// 16 lowercase hex characters, used for ids of imported content
pub fn random_id() -> String {
    let mut rng = rand::thread_rng();
    (0..16)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect()
}
