use std::fmt;

/// Renders a slice as a markdown-style bullet list on its own lines.
///
/// Used for multiline logs of extension names, formats, and verdicts. An
/// empty slice renders as a single `- (none)` entry so the log line never
/// ends on a dangling colon.
pub struct PrettyList<'data, T>(pub &'data [T]);

impl<T> PrettyList<'_, T> {
    fn write_entries(
        &self,
        f: &mut fmt::Formatter<'_>,
        mut entry: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
    ) -> fmt::Result {
        f.write_str("\n")?;
        if self.0.is_empty() {
            return f.write_str("- (none)\n");
        }
        for item in self.0 {
            f.write_str("- ")?;
            entry(f, item)?;
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for PrettyList<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternate = f.alternate();
        self.write_entries(f, |f, item| {
            if alternate {
                write!(f, "{:#?}", item)
            } else {
                write!(f, "{:?}", item)
            }
        })
    }
}

impl<T: fmt::Display> fmt::Display for PrettyList<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_entries(f, |f, item| write!(f, "{}", item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_one_bullet_per_entry() {
        let names = ["VK_KHR_surface", "VK_KHR_xcb_surface"];
        assert_eq!(
            format!("{}", PrettyList(&names)),
            "\n- VK_KHR_surface\n- VK_KHR_xcb_surface\n"
        );
    }

    #[test]
    fn empty_lists_say_so() {
        let names: [&str; 0] = [];
        assert_eq!(format!("{:?}", PrettyList(&names)), "\n- (none)\n");
    }
}
