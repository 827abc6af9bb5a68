pub mod dates;

#[cfg(test)]
pub mod test_helpers;
