//! Host file name cleaning for extracted paths

/// Turn one decoded path component into a safe host name
///
/// Trailing spaces are dropped and the result is lowercased. Separators and
/// NUL become `_`, and a component that would be empty or refer to a
/// directory (`.`, `..`) becomes `_`.
pub fn clean_name(component: &str) -> String {
    let cleaned: String = component
        .trim_end_matches(' ')
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_trim() {
        assert_eq!(clean_name("SPACEW"), "spacew");
        assert_eq!(clean_name("TXT   "), "txt");
    }

    #[test]
    fn test_separators_replaced() {
        assert_eq!(clean_name("A/B"), "a_b");
        assert_eq!(clean_name("A\\B"), "a_b");
        assert_eq!(clean_name("A\0"), "a_");
    }

    #[test]
    fn test_dot_names() {
        assert_eq!(clean_name(""), "_");
        assert_eq!(clean_name("   "), "_");
        assert_eq!(clean_name("."), "_");
        assert_eq!(clean_name(".."), "_");
        assert_eq!(clean_name("..."), "...");
    }

    #[test]
    fn test_ppn_directory() {
        assert_eq!(clean_name("DMP,SYS"), "dmp,sys");
    }
}
