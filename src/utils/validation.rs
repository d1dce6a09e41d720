/// A value counts as entered once it has something other than whitespace.
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn all_filled(values: &[&str]) -> bool {
    values.iter().all(|v| is_filled(v))
}
