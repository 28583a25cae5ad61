pub trait CaseInsensitiveStringExt {
    fn strip_prefix_ignore_ascii_case<'a>(&'a self, prefix: &str) -> Option<&'a str>;

    fn starts_with_ignore_ascii_case(&self, prefix: &str) -> bool {
        self.strip_prefix_ignore_ascii_case(prefix).is_some()
    }
}

impl CaseInsensitiveStringExt for str {
    fn strip_prefix_ignore_ascii_case<'a>(&'a self, prefix: &str) -> Option<&'a str> {
        // `get` returns None when the cut would land inside a multi-byte char
        let my_prefix = self.get(..prefix.len())?;

        if my_prefix.eq_ignore_ascii_case(prefix) {
            self.get(prefix.len()..)
        } else {
            None
        }
    }
}

impl CaseInsensitiveStringExt for String {
    fn strip_prefix_ignore_ascii_case<'a>(&'a self, prefix: &str) -> Option<&'a str> {
        self.as_str().strip_prefix_ignore_ascii_case(prefix)
    }
}
