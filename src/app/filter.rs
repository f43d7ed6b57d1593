use crate::app::models::{AllowList, ExclusionRules};

/// Name-based predicates applied during the walk.
#[derive(Debug, Clone)]
pub struct TreeFilter {
    rules: ExclusionRules,
}

impl TreeFilter {
    pub fn new(rules: ExclusionRules) -> Self {
        Self { rules }
    }

    /// Whether the walk should enter a directory with this name. Checked
    /// before descending, so a pruned directory's subtree is never read.
    pub fn should_descend(&self, dir_name: &str) -> bool {
        !self.rules.ignored_dir_names().contains(dir_name)
    }

    /// Whether a file with this name belongs in the output.
    ///
    /// An exact ignored name always wins over the allow-list, so
    /// `package-lock.json` stays out even though `.json` is allowed.
    pub fn is_included(&self, file_name: &str) -> bool {
        if self.rules.ignored_file_names().contains(file_name) {
            return false;
        }
        if self
            .rules
            .denied_suffixes()
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
        {
            return false;
        }

        match self.rules.allowed() {
            AllowList::Any => true,
            AllowList::Suffixes(allowed) => {
                allowed.contains(file_name)
                    || allowed
                        .iter()
                        .filter(|suffix| suffix.starts_with('.'))
                        .any(|suffix| file_name.ends_with(suffix.as_str()))
            }
        }
    }
}
