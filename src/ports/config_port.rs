//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `None` when the key is absent or blank; `Some(Err(raw))` when present
    /// but not an integer.
    fn get_int_opt(&self, section: &str, key: &str) -> Option<Result<i64, String>> {
        let raw = self.get_string(section, key)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.parse::<i64>().map_err(|_| raw.clone()))
    }

    /// Same contract as [`ConfigPort::get_int_opt`] for floating point values.
    fn get_double_opt(&self, section: &str, key: &str) -> Option<Result<f64, String>> {
        let raw = self.get_string(section, key)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.parse::<f64>().map_err(|_| raw.clone()))
    }
}
