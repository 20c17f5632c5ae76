//! Opaque record identifiers: a random component concatenated with the
//! current Unix-epoch milliseconds, both base-36 encoded. Unique with
//! overwhelming probability within one process run; not cryptographic.

use chrono::Utc;
use rand::Rng;

pub fn generate_id() -> String {
    let noise: u64 = rand::thread_rng().gen();
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}{}", base36(noise), base36(millis))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn ids_are_lowercase_alphanumeric() {
        let id = generate_id();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn ids_do_not_collide_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
