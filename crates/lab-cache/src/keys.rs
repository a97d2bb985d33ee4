//! Cache key builders.
//!
//! Centralising key construction prevents typos and makes it easy to find
//! every key the pool uses.

/// Cache key for one lab account's persisted state.
pub fn account(username: &str) -> String {
    format!("user:{username}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_shape() {
        assert_eq!(account("player01"), "user:player01");
    }
}
